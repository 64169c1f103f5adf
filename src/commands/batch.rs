//! 多个工作副本上的批量操作
//!
//! 每个工作副本的结果单独汇报，一个失败不影响其他

use std::{path::PathBuf, sync::Arc};

use crate::{
    commands::prompt::Prompt,
    core::{
        error::{AppResult, user_message},
        registry::Registry,
        repository::{ConflictChoice, Repository},
    },
};

pub type BatchResults<T> = Vec<(Arc<Repository>, AppResult<T>)>;

pub fn add(registry: &Registry, paths: &[PathBuf]) -> BatchResults<String> {
    registry.dispatch(paths, |repository, group| repository.add(group))
}

pub fn remove(registry: &Registry, paths: &[PathBuf], keep_local: bool) -> BatchResults<String> {
    registry.dispatch(paths, |repository, group| repository.remove(group, keep_local))
}

pub fn revert(registry: &Registry, paths: &[PathBuf], recursive: bool) -> BatchResults<String> {
    registry.dispatch(paths, |repository, group| repository.revert(group, recursive))
}

pub fn resolve(registry: &Registry, paths: &[PathBuf], choice: ConflictChoice) -> BatchResults<String> {
    registry.dispatch(paths, |repository, group| repository.resolve(group, choice))
}

pub fn changelist(registry: &Registry, paths: &[PathBuf], name: Option<&str>) -> BatchResults<String> {
    registry.dispatch(paths, |repository, group| match name {
        Some(name) => repository.add_changelist(name, group),
        None => repository.remove_changelist(group),
    })
}

/// ### 生成补丁
/// 按分组顺序拼接每个工作副本的 diff；失败的工作副本单独汇报
pub fn patch(registry: &Registry, paths: &[PathBuf]) -> (String, BatchResults<String>) {
    let results = registry.dispatch(paths, |repository, group| repository.patch(group));

    let combined = results
        .iter()
        .filter_map(|(_, r)| r.as_ref().ok())
        .filter(|diff| !diff.trim().is_empty())
        .map(|diff| diff.trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n");

    (combined, results)
}

/// Shows one line per failed working copy. Returns the number of failures.
pub fn report<T>(results: &BatchResults<T>, prompt: &dyn Prompt) -> usize {
    let mut failures = 0;
    for (repository, result) in results {
        if let Err(err) = result {
            failures += 1;
            prompt.error(&format!("{}: {}", repository.root().display(), user_message(err)));
        }
    }
    failures
}
