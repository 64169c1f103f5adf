//! ### svn info / log / list 的 xml 解析

use std::path::PathBuf;

use crate::core::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoEntry {
    pub url: String,
    pub repository_root: String,
    pub relative_url: String,
    pub wc_root: Option<PathBuf>,
    pub revision: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub revision: u64,
    pub author: String,
    pub date: String,
    pub message: String,
}

/// Parses the first `<entry>` of `svn info --xml`. URLs come back decoded.
pub fn parse_info(xml: &str) -> AppResult<InfoEntry> {
    let doc = roxmltree::Document::parse(xml)?;
    let entry = doc
        .descendants()
        .find(|n| n.has_tag_name("entry"))
        .ok_or_else(|| AppError::Validation("svn info returned no entry".to_string()))?;

    let text_of = |tag: &str| -> String {
        entry
            .descendants()
            .find(|n| n.has_tag_name(tag))
            .and_then(|n| n.text())
            .unwrap_or("")
            .trim()
            .to_string()
    };

    let wc_root = text_of("wcroot-abspath");

    Ok(InfoEntry {
        url: urlencoding::decode(&text_of("url"))?.to_string(),
        repository_root: urlencoding::decode(&text_of("root"))?.to_string(),
        relative_url: urlencoding::decode(&text_of("relative-url"))?.to_string(),
        wc_root: (!wc_root.is_empty()).then(|| PathBuf::from(wc_root)),
        revision: entry.attribute("revision").and_then(|r| r.parse().ok()),
    })
}

/// Parses `svn log --xml`, newest first as svn prints it.
pub fn parse_log(xml: &str) -> AppResult<Vec<LogEntry>> {
    let doc = roxmltree::Document::parse(xml)?;
    let mut entries = Vec::new();

    for node in doc.descendants().filter(|n| n.has_tag_name("logentry")) {
        // merged revisions (-g) nest logentry inside logentry
        if node.parent().map(|p| p.has_tag_name("logentry")).unwrap_or(false) {
            continue;
        }

        let child_text = |tag: &str| {
            node.children()
                .find(|n| n.has_tag_name(tag))
                .and_then(|n| n.text())
                .unwrap_or("")
                .to_string()
        };

        entries.push(LogEntry {
            revision: node.attribute("revision").and_then(|r| r.parse().ok()).unwrap_or(0),
            author: child_text("author"),
            date: child_text("date"),
            message: child_text("msg"),
        });
    }

    Ok(entries)
}

/// Directory names from `svn list --xml`.
pub fn parse_list_dirs(xml: &str) -> AppResult<Vec<String>> {
    let doc = roxmltree::Document::parse(xml)?;

    let names = doc
        .descendants()
        .filter(|n| n.has_tag_name("entry") && n.attribute("kind") == Some("dir"))
        .filter_map(|n| n.children().find(|c| c.has_tag_name("name")).and_then(|c| c.text()))
        .map(str::to_string)
        .collect();

    Ok(names)
}
