//! ### SVN 错误分类
//!
//! 把 svn 的 stderr 映射为固定的错误码集合

use std::{fmt, io, sync::LazyLock};

use regex::Regex;

/// Error codes callers branch on. The string forms are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SvnErrorCode {
    AuthorizationFailed,
    RepositoryIsLocked,
    NotASvnRepository,
    NotShareCommonAncestry,
    WorkingCopyIsTooOld,
}

impl SvnErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SvnErrorCode::AuthorizationFailed => "AuthorizationFailed",
            SvnErrorCode::RepositoryIsLocked => "RepositoryIsLocked",
            SvnErrorCode::NotASvnRepository => "NotASvnRepository",
            SvnErrorCode::NotShareCommonAncestry => "NotShareCommonAncestry",
            SvnErrorCode::WorkingCopyIsTooOld => "WorkingCopyIsTooOld",
        }
    }
}

impl fmt::Display for SvnErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scanned in order, first hit wins.
const ERROR_TOKENS: [(SvnErrorCode, &str); 5] = [
    (SvnErrorCode::AuthorizationFailed, "E170001"),
    (SvnErrorCode::RepositoryIsLocked, "E155004"),
    (SvnErrorCode::NotASvnRepository, "E155007"),
    (SvnErrorCode::NotShareCommonAncestry, "E195012"),
    (SvnErrorCode::WorkingCopyIsTooOld, "E155036"),
];

/// svn gives up with this after looping over cached/prompted credentials.
const CREDENTIALS_EXHAUSTED: &str = "No more credentials or we tried too many times";

static CODE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[\w.-]+: E\d+: *").expect("valid prefix pattern"));

/// ### classify
/// 根据 stderr 内容返回错误码，没有匹配返回 None
pub fn classify(stderr: &str) -> Option<SvnErrorCode> {
    for (code, token) in ERROR_TOKENS {
        if stderr.contains(token) {
            return Some(code);
        }
    }

    if stderr.contains(CREDENTIALS_EXHAUSTED) {
        return Some(SvnErrorCode::AuthorizationFailed);
    }

    None
}

/// Removes the `svn: E123456: ` prefix from every line.
pub fn strip_code_prefixes(stderr: &str) -> String {
    CODE_PREFIX.replace_all(stderr, "").trim().to_string()
}

/// A failed svn invocation: either it never started, or it exited non-zero.
#[derive(Debug, Clone)]
pub struct SvnError {
    pub message: String,
    /// The svn subcommand, e.g. `commit`.
    pub command: String,
    /// `None` when the process could not be launched or was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub stderr_display: Option<String>,
    pub code: Option<SvnErrorCode>,
}

impl SvnError {
    /// The executable is missing or could not be spawned.
    pub fn launch_failure(command: &str, err: &io::Error) -> Self {
        SvnError {
            message: format!("Failed to execute svn {}: {}", command, err),
            command: command.to_string(),
            exit_code: None,
            stdout: None,
            stderr: None,
            stderr_display: None,
            code: Some(SvnErrorCode::NotASvnRepository),
        }
    }

    pub fn from_exit(command: &str, exit_code: Option<i32>, stdout: String, stderr: String) -> Self {
        let code = classify(&stderr);
        let display = strip_code_prefixes(&stderr);

        SvnError {
            message: "Failed to execute svn".to_string(),
            command: command.to_string(),
            exit_code,
            stdout: Some(stdout),
            stderr_display: (!display.is_empty()).then_some(display),
            stderr: Some(stderr),
            code,
        }
    }

    pub fn is(&self, code: SvnErrorCode) -> bool {
        self.code == Some(code)
    }
}

impl fmt::Display for SvnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.command)?;
        if let Some(code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(display) = &self.stderr_display {
            write!(f, ": {}", display)?;
        }
        Ok(())
    }
}

impl std::error::Error for SvnError {}
