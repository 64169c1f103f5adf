//! ### svn status --xml 解析

use std::path::{Path, PathBuf};

use crate::core::error::AppResult;

/// `wc-status` item states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Added,
    Conflicted,
    Deleted,
    External,
    Ignored,
    Incomplete,
    Merged,
    Missing,
    Modified,
    None,
    Normal,
    Obstructed,
    Replaced,
    Unversioned,
}

impl Status {
    pub fn parse(item: &str) -> Status {
        match item {
            "added" => Status::Added,
            "conflicted" => Status::Conflicted,
            "deleted" => Status::Deleted,
            "external" => Status::External,
            "ignored" => Status::Ignored,
            "incomplete" => Status::Incomplete,
            "merged" => Status::Merged,
            "missing" => Status::Missing,
            "modified" => Status::Modified,
            "normal" => Status::Normal,
            "obstructed" => Status::Obstructed,
            "replaced" => Status::Replaced,
            "unversioned" => Status::Unversioned,
            _ => Status::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Added => "added",
            Status::Conflicted => "conflicted",
            Status::Deleted => "deleted",
            Status::External => "external",
            Status::Ignored => "ignored",
            Status::Incomplete => "incomplete",
            Status::Merged => "merged",
            Status::Missing => "missing",
            Status::Modified => "modified",
            Status::None => "none",
            Status::Normal => "normal",
            Status::Obstructed => "obstructed",
            Status::Replaced => "replaced",
            Status::Unversioned => "unversioned",
        }
    }

    /// Whether `svn commit` has something to send for this state.
    pub fn is_committable(&self) -> bool {
        matches!(
            self,
            Status::Added | Status::Deleted | Status::Modified | Status::Replaced | Status::Merged | Status::Conflicted
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Absolute path inside the working copy.
    pub path: PathBuf,
    pub status: Status,
    pub props: Status,
    /// For a moved/renamed file, the path it was moved from.
    pub rename_source: Option<PathBuf>,
    pub changelist: Option<String>,
    pub tree_conflicted: bool,
}

impl Resource {
    pub fn is_conflicted(&self) -> bool {
        self.status == Status::Conflicted || self.props == Status::Conflicted || self.tree_conflicted
    }

    pub fn has_changes(&self) -> bool {
        self.status.is_committable() || self.props.is_committable()
    }
}

/// Parses `svn status --xml` output. Relative entry paths are joined to `root`.
pub fn parse_status(xml: &str, root: &Path) -> AppResult<Vec<Resource>> {
    let doc = roxmltree::Document::parse(xml)?;
    let mut resources = Vec::new();

    for entry in doc.descendants().filter(|n| n.has_tag_name("entry")) {
        let path = entry.attribute("path").unwrap_or("");
        let Some(wc_status) = entry.children().find(|n| n.has_tag_name("wc-status")) else {
            continue;
        };

        let changelist = entry
            .parent()
            .filter(|p| p.has_tag_name("changelist"))
            .and_then(|p| p.attribute("name"))
            .map(str::to_string);

        resources.push(Resource {
            path: absolutize(root, path),
            status: Status::parse(wc_status.attribute("item").unwrap_or("")),
            props: Status::parse(wc_status.attribute("props").unwrap_or("")),
            rename_source: wc_status.attribute("moved-from").map(|from| absolutize(root, from)),
            changelist,
            tree_conflicted: wc_status.attribute("tree-conflicted") == Some("true"),
        });
    }

    Ok(resources)
}

/// Paths to hand to `svn commit`: every resource, plus the source of each
/// added-by-move resource so both halves of the move go in one revision.
pub fn commit_paths(resources: &[Resource]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::with_capacity(resources.len());

    for resource in resources {
        if !paths.contains(&resource.path) {
            paths.push(resource.path.clone());
        }
        if resource.status != Status::Added {
            continue;
        }
        if let Some(source) = &resource.rename_source {
            if !paths.contains(source) {
                paths.push(source.clone());
            }
        }
    }

    paths
}

/// Distinct changelist names in first-seen order.
pub fn changelists(resources: &[Resource]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in resources.iter().filter_map(|r| r.changelist.as_ref()) {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    names
}

fn absolutize(root: &Path, path: &str) -> PathBuf {
    root.join(path).components().collect()
}
