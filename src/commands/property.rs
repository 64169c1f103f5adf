//! 属性设置和忽略

use std::{path::PathBuf, sync::Arc};

use crate::{
    commands::prompt::Prompt,
    core::{
        error::{AppError, AppResult},
        registry::Registry,
        repository::Repository,
    },
};

pub const KNOWN_PROPERTIES: [&str; 5] = [
    "svn:mime-type",
    "svn:eol-style",
    "svn:executable",
    "svn:needs-lock",
    "svn:keywords",
];

const CUSTOM_PROPERTY: &str = "Other...";

/// ### 选择属性并设置
/// 选属性名 → 输入值 → 每个工作副本执行一次 propset
pub fn set_property_flow(
    registry: &Registry,
    paths: &[PathBuf],
    prompt: &dyn Prompt,
) -> AppResult<Vec<(Arc<Repository>, AppResult<String>)>> {
    if paths.is_empty() {
        return Err(AppError::Validation("No files selected".to_string()));
    }

    let mut items: Vec<String> = KNOWN_PROPERTIES.iter().map(|s| s.to_string()).collect();
    items.push(CUSTOM_PROPERTY.to_string());

    let name = match prompt.pick("Select a property", &items)? {
        Some(index) if index < KNOWN_PROPERTIES.len() => KNOWN_PROPERTIES[index].to_string(),
        Some(index) if index == KNOWN_PROPERTIES.len() => prompt
            .input("Property name", false)?
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or(AppError::OperationCancelled)?,
        _ => return Err(AppError::OperationCancelled),
    };

    let value = match name.as_str() {
        // svn stores these as a marker; the value is ignored
        "svn:executable" | "svn:needs-lock" => "*".to_string(),
        _ => prompt
            .input(&format!("Value for {}", name), false)?
            .ok_or(AppError::OperationCancelled)?,
    };

    Ok(registry.dispatch(paths, |repository, group| {
        repository.set_property(&name, &value, group, false)
    }))
}

/// ### 忽略文件
/// `by_extension` 为 true 时忽略 `*.ext`，否则忽略文件名
pub fn ignore_paths(
    registry: &Registry,
    paths: &[PathBuf],
    by_extension: bool,
) -> Vec<(Arc<Repository>, AppResult<()>)> {
    registry.dispatch(paths, |repository, group| {
        for path in group {
            let pattern = if by_extension {
                let ext = path
                    .extension()
                    .ok_or_else(|| AppError::Validation(format!("{} has no extension", path.display())))?;
                Some(format!("*.{}", ext.to_string_lossy()))
            } else {
                None
            };
            repository.ignore(path, pattern.as_deref())?;
        }
        Ok(())
    })
}
