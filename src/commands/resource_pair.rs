//! ### diff / show 的左右两端
//!
//! 纯函数：由 (状态, 对比版本) 决定左右两端和标题

use std::path::{Path, PathBuf};

use crate::core::{
    error::{AppError, AppResult},
    repository::Repository,
    status::{Resource, Status},
};

/// Comparison baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Against {
    /// The revision last checked out.
    Base,
    /// The newest revision in the repository.
    Head,
    /// No explicit revision; svn reads the pristine copy.
    WorkingCopy,
}

impl Against {
    pub fn parse(value: &str) -> AppResult<Against> {
        match value.trim() {
            "" => Ok(Against::WorkingCopy),
            v if v.eq_ignore_ascii_case("BASE") => Ok(Against::Base),
            v if v.eq_ignore_ascii_case("HEAD") => Ok(Against::Head),
            other => Err(AppError::Validation(format!("Unknown comparison target: {}", other))),
        }
    }

    pub fn revision(&self) -> Option<&'static str> {
        match self {
            Against::Base => Some("BASE"),
            Against::Head => Some("HEAD"),
            Against::WorkingCopy => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Against::Base => "BASE",
            Against::Head => "HEAD",
            Against::WorkingCopy => "Working Copy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// The file on disk.
    Working(PathBuf),
    /// File content read back from svn (`svn cat`).
    Show { path: PathBuf, revision: Option<&'static str> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePair {
    pub left: Option<Endpoint>,
    pub right: Option<Endpoint>,
    pub title: String,
}

/// Left side, right side and title for comparing `resource` against `against`.
pub fn resource_pair(resource: &Resource, against: Against) -> ResourcePair {
    let path = &resource.path;
    let name = file_name(path);
    let show = |p: &Path| Endpoint::Show { path: p.to_path_buf(), revision: against.revision() };
    let working = || Endpoint::Working(path.clone());
    let labelled = format!("{} ({})", name, against.label());

    match resource.status {
        Status::Added => match &resource.rename_source {
            Some(source) => ResourcePair {
                left: Some(show(source)),
                right: Some(working()),
                title: format!("{} → {} ({})", file_name(source), name, against.label()),
            },
            None => ResourcePair { left: None, right: Some(working()), title: name },
        },
        Status::Modified | Status::Conflicted | Status::Replaced | Status::Merged | Status::Normal => ResourcePair {
            left: Some(show(path)),
            right: Some(working()),
            title: labelled,
        },
        Status::Deleted | Status::Missing => ResourcePair {
            left: Some(show(path)),
            right: Some(show(path)),
            title: labelled,
        },
        Status::Ignored
        | Status::Unversioned
        | Status::External
        | Status::Incomplete
        | Status::Obstructed
        | Status::None => ResourcePair { left: None, right: Some(working()), title: name },
    }
}

/// Reads the content an endpoint points at.
pub fn load_endpoint(repository: &Repository, endpoint: &Endpoint) -> AppResult<String> {
    match endpoint {
        Endpoint::Working(path) => {
            let bytes = std::fs::read(path)?;
            Ok(String::from_utf8_lossy(&bytes).to_string())
        }
        Endpoint::Show { path, revision } => repository.show(path, *revision),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(path: &str, status: Status, rename_source: Option<&str>) -> Resource {
        Resource {
            path: PathBuf::from(path),
            status,
            props: Status::None,
            rename_source: rename_source.map(PathBuf::from),
            changelist: None,
            tree_conflicted: false,
        }
    }

    fn show(path: &str, revision: Option<&'static str>) -> Option<Endpoint> {
        Some(Endpoint::Show { path: PathBuf::from(path), revision })
    }

    fn working(path: &str) -> Option<Endpoint> {
        Some(Endpoint::Working(PathBuf::from(path)))
    }

    #[test]
    fn deleted_against_base_reads_both_sides_from_svn() {
        let pair = resource_pair(&resource("/wc/gone.txt", Status::Deleted, None), Against::Base);
        assert_eq!(pair.left, show("/wc/gone.txt", Some("BASE")));
        assert_eq!(pair.right, show("/wc/gone.txt", Some("BASE")));
        assert!(pair.title.contains("(BASE)"));
    }

    #[test]
    fn renamed_file_compares_against_its_source() {
        let pair = resource_pair(&resource("/wc/new.rs", Status::Added, Some("/wc/old.rs")), Against::Head);
        assert_eq!(pair.left, show("/wc/old.rs", Some("HEAD")));
        assert_eq!(pair.right, working("/wc/new.rs"));
        assert_eq!(pair.title, "old.rs → new.rs (HEAD)");
    }

    #[test]
    fn full_status_table() {
        use Status::*;
        let cases: [(Status, bool, bool); 14] = [
            // (status, left is svn read, right is svn read)
            (Added, false, false),
            (Conflicted, true, false),
            (Deleted, true, true),
            (External, false, false),
            (Ignored, false, false),
            (Incomplete, false, false),
            (Merged, true, false),
            (Missing, true, true),
            (Modified, true, false),
            (None, false, false),
            (Normal, true, false),
            (Obstructed, false, false),
            (Replaced, true, false),
            (Unversioned, false, false),
        ];

        for (status, left_is_show, right_is_show) in cases {
            let pair = resource_pair(&resource("/wc/f.txt", status, Option::None), Against::WorkingCopy);
            let expected_left = if left_is_show { show("/wc/f.txt", Option::None) } else { Option::None };
            let expected_right = if right_is_show { show("/wc/f.txt", Option::None) } else { working("/wc/f.txt") };
            assert_eq!(pair.left, expected_left, "{:?}", status);
            assert_eq!(pair.right, expected_right, "{:?}", status);
        }
    }

    #[test]
    fn against_parses_tags() {
        assert_eq!(Against::parse("").unwrap(), Against::WorkingCopy);
        assert_eq!(Against::parse("base").unwrap(), Against::Base);
        assert_eq!(Against::parse("HEAD").unwrap(), Against::Head);
        assert!(Against::parse("PREV").is_err());
    }
}
