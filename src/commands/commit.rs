//! 提交相关的工作流

use std::{path::PathBuf, sync::Arc};

use crate::{
    commands::prompt::Prompt,
    core::{
        error::{AppError, AppResult},
        registry::Registry,
        repository::{CommitResult, Repository},
        status::{Resource, changelists},
    },
};

/// Label for changes that are not in any changelist.
pub const DEFAULT_CHANGES: &str = "Changes";

/// The pending commit message. Cleared only after a successful commit so a
/// failed commit can be retried without retyping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitInput {
    message: String,
}

impl CommitInput {
    pub fn new(message: impl Into<String>) -> Self {
        CommitInput { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn clear(&mut self) {
        self.message.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.message.trim().is_empty()
    }
}

fn require_message(input: &CommitInput) -> AppResult<()> {
    if input.is_blank() {
        return Err(AppError::Validation("Commit message is empty".to_string()));
    }
    Ok(())
}

/// ### 按 changelist 提交
/// 有 changelist 时让用户选择提交哪一组
pub fn commit_with_changelist(repository: &Repository, input: &mut CommitInput, prompt: &dyn Prompt) -> AppResult<CommitResult> {
    require_message(input)?;

    let resources = repository.status()?;
    let names = changelists(&resources);

    let selected: Option<String> = if names.is_empty() {
        None
    } else {
        let mut items = vec![DEFAULT_CHANGES.to_string()];
        items.extend(names.iter().cloned());
        match prompt.pick("Select a changelist to commit", &items)? {
            Some(0) => None,
            Some(index) if index < items.len() => Some(items[index].clone()),
            _ => return Err(AppError::OperationCancelled),
        }
    };

    let chosen: Vec<Resource> = resources
        .into_iter()
        .filter(|r| r.changelist == selected && r.has_changes())
        .collect();

    if chosen.is_empty() {
        return Err(AppError::Validation("There are no changes to commit".to_string()));
    }

    let result = repository.commit(input.message(), &chosen)?;
    input.clear();
    Ok(result)
}

/// ### 提交选中的文件
/// 按工作副本分组，每组各提交一次
pub fn commit_selected(
    registry: &Registry,
    paths: &[PathBuf],
    input: &mut CommitInput,
) -> AppResult<Vec<(Arc<Repository>, AppResult<CommitResult>)>> {
    require_message(input)?;
    let message = input.message().to_string();

    let results = registry.dispatch(paths, |repository, group| {
        let resources: Vec<Resource> = repository
            .status()?
            .into_iter()
            .filter(|r| r.has_changes() && group.iter().any(|p| r.path.starts_with(p)))
            .collect();

        if resources.is_empty() {
            return Err(AppError::Validation(format!(
                "There are no changes to commit in {}",
                repository.root().display()
            )));
        }

        repository.commit(&message, &resources)
    });

    if !results.is_empty() && results.iter().all(|(_, r)| r.is_ok()) {
        input.clear();
    }

    Ok(results)
}
