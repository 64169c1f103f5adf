use std::{fmt, path::PathBuf, string::FromUtf8Error};

use crate::core::svn_error::{SvnError, SvnErrorCode};

/// The error type for this application.
#[derive(Debug)]
pub enum AppError {
    /// An I/O error occurred.
    Io(std::io::Error),
    /// An svn invocation failed to launch or exited non-zero.
    Svn(SvnError),
    /// The user cancelled the operation from a UI prompt.
    OperationCancelled,
    /// A business logic validation error occurred.
    Validation(String),
    /// An XML parsing error occurred.
    XmlParse(roxmltree::Error),
    /// A URL decoding error occurred.
    UrlDecode(FromUtf8Error),
    /// The settings file could not be read.
    Config(String),
    /// No registered working copy owns the path.
    NoRepository(PathBuf),
}

impl AppError {
    pub fn svn_code(&self) -> Option<SvnErrorCode> {
        match self {
            AppError::Svn(err) => err.code,
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::OperationCancelled)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io(err) => write!(f, "I/O Error: {}", err),
            AppError::Svn(err) => write!(f, "{}", err),
            AppError::OperationCancelled => write!(f, "Operation cancelled"),
            AppError::Validation(msg) => write!(f, "Error: {}", msg),
            AppError::XmlParse(err) => write!(f, "XML Parsing Error: {}", err),
            AppError::UrlDecode(err) => write!(f, "URL/Path Decoding Error: {}", err),
            AppError::Config(msg) => write!(f, "Config Error: {}", msg),
            AppError::NoRepository(path) => write!(f, "No working copy found for {}", path.display()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<SvnError> for AppError {
    fn from(err: SvnError) -> Self {
        AppError::Svn(err)
    }
}

impl From<roxmltree::Error> for AppError {
    fn from(err: roxmltree::Error) -> Self {
        AppError::XmlParse(err)
    }
}

impl From<FromUtf8Error> for AppError {
    fn from(err: FromUtf8Error) -> Self {
        AppError::UrlDecode(err)
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

/// Text shown to the user for a failed operation.
pub fn user_message(err: &AppError) -> String {
    let AppError::Svn(svn_err) = err else {
        return err.to_string();
    };

    match svn_err.code {
        Some(SvnErrorCode::AuthorizationFailed) => "Authorization failed. Check your username and password.".to_string(),
        Some(SvnErrorCode::RepositoryIsLocked) => "The working copy is locked. Run 'svn cleanup' and try again.".to_string(),
        Some(SvnErrorCode::WorkingCopyIsTooOld) => "The working copy format is too old. Run 'svn upgrade' and try again.".to_string(),
        Some(SvnErrorCode::NotShareCommonAncestry) => {
            let target = svn_err
                .stderr
                .as_deref()
                .and_then(quoted_path)
                .unwrap_or_else(|| "the target".to_string());
            format!("Path '{}' does not share common version control ancestry with the requested switch location.", target)
        }
        Some(SvnErrorCode::NotASvnRepository) if svn_err.exit_code.is_none() => {
            "svn executable not found. Install Subversion or set [svn] path in the settings.".to_string()
        }
        _ => svn_err
            .stderr_display
            .clone()
            .unwrap_or_else(|| format!("svn {} operation failed", svn_err.command)),
    }
}

fn quoted_path(stderr: &str) -> Option<String> {
    let start = stderr.find('\'')? + 1;
    let len = stderr[start..].find('\'')?;
    Some(stderr[start..start + len].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestry_message_names_the_path() {
        let err = AppError::Svn(SvnError::from_exit(
            "switch",
            Some(1),
            String::new(),
            "svn: E195012: Path '/wc/project' does not share common version control ancestry with the requested switch location.".into(),
        ));
        assert!(user_message(&err).contains("'/wc/project'"));
    }

    #[test]
    fn unclassified_falls_back_to_sanitized_stderr() {
        let err = AppError::Svn(SvnError::from_exit("add", Some(1), String::new(), "svn: E200009: something odd\n".into()));
        assert_eq!(user_message(&err), "something odd");

        let silent = AppError::Svn(SvnError::from_exit("add", Some(1), String::new(), String::new()));
        assert_eq!(user_message(&silent), "svn add operation failed");
    }
}
