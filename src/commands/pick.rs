//! 选择目标工作副本

use std::{path::Path, sync::Arc};

use crate::{
    commands::prompt::Prompt,
    core::{
        error::{AppError, AppResult},
        registry::Registry,
        repository::Repository,
    },
};

/// Finds the working copy for a command: the one owning `path`, else the
/// only registered one, else whatever the user picks.
pub fn pick_repository(registry: &Registry, path: Option<&Path>, prompt: &dyn Prompt) -> AppResult<Arc<Repository>> {
    if let Some(path) = path {
        if let Some(repository) = registry.resolve(path) {
            return Ok(repository);
        }
    }

    let mut repositories = registry.repositories();
    match repositories.len() {
        0 => Err(AppError::NoRepository(
            path.map(Path::to_path_buf).unwrap_or_default(),
        )),
        1 => Ok(repositories.remove(0)),
        _ => {
            let labels: Vec<String> = repositories.iter().map(|r| r.root().display().to_string()).collect();
            match prompt.pick("Select a working copy", &labels)? {
                Some(index) if index < repositories.len() => Ok(repositories.remove(index)),
                _ => Err(AppError::OperationCancelled),
            }
        }
    }
}
