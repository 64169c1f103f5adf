//! ### 输出编码识别
//!
//! svn 的普通输出跟随系统 locale，老系统上常见 GBK 之类的编码；
//! `--xml` 输出始终是 UTF-8。

use encoding_rs::{Encoding, UTF_8};

/// Flag that makes svn print machine-readable, always UTF-8 output.
pub const XML_FLAG: &str = "--xml";

/// Detector guesses at or below this confidence are ignored.
pub const CONFIDENCE_THRESHOLD: f32 = 0.8;

#[derive(Debug, Clone, Copy)]
pub struct Guess {
    pub encoding: &'static Encoding,
    pub confidence: f32,
}

/// Statistical guess over the raw bytes.
///
/// chardetng only reports whether it is sure about its answer, so a sure
/// guess scores 1.0 and anything else 0.5.
pub fn detect(bytes: &[u8]) -> Guess {
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    let (encoding, sure) = detector.guess_assess(None, true);

    Guess {
        encoding,
        confidence: if sure { 1.0 } else { 0.5 },
    }
}

impl Guess {
    /// The guessed encoding, if the detector is confident enough to use it.
    pub fn accepted(self) -> Option<&'static Encoding> {
        (self.confidence > CONFIDENCE_THRESHOLD).then_some(self.encoding)
    }
}

/// Looks up an encoding by its WHATWG label (`gbk`, `shift_jis`, `latin1`...).
pub fn lookup(name: &str) -> Option<&'static Encoding> {
    Encoding::for_label(name.trim().as_bytes())
}

/// ### resolve
/// 选择 stdout 的解码方式
pub fn resolve<S: AsRef<str>>(stdout: &[u8], args: &[S], configured: Option<&str>) -> &'static Encoding {
    if args.iter().any(|arg| arg.as_ref() == XML_FLAG) {
        return UTF_8;
    }

    if let Some(name) = configured.map(str::trim).filter(|name| !name.is_empty()) {
        match lookup(name) {
            Some(_) if std::str::from_utf8(stdout).is_ok() => return UTF_8,
            Some(encoding) => return encoding,
            None => tracing::warn!("Invalid encoding \"{}\" configured in [default] encoding, detecting instead", name),
        }
    }

    detect(stdout).accepted().unwrap_or(UTF_8)
}

/// Malformed sequences become U+FFFD.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}
