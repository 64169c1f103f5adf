//! 冲突解决

use std::path::Path;

use crate::{
    commands::prompt::Prompt,
    core::{
        error::AppResult,
        repository::{ConflictChoice, Repository},
    },
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub resolved: usize,
    /// Conflicts left untouched because the prompt was dismissed.
    pub skipped: usize,
}

/// ### 逐个解决冲突
/// 每个冲突单独选择策略、单独执行 svn resolve；取消选择时停止，剩余的不处理
pub fn resolve_all(repository: &Repository, prompt: &dyn Prompt) -> AppResult<ResolveSummary> {
    let conflicted: Vec<_> = repository
        .status()?
        .into_iter()
        .filter(|r| r.is_conflicted())
        .collect();

    let labels: Vec<String> = ConflictChoice::ALL
        .iter()
        .map(|c| format!("{} ({})", c.description(), c.as_arg()))
        .collect();

    let mut summary = ResolveSummary::default();
    for (index, resource) in conflicted.iter().enumerate() {
        let title = format!("Select conflict resolution for {}", display_name(&resource.path));
        let Some(choice) = prompt.pick(&title, &labels)?.and_then(|i| ConflictChoice::ALL.get(i).copied()) else {
            summary.skipped = conflicted.len() - index;
            break;
        };

        repository.resolve(std::slice::from_ref(&resource.path), choice)?;
        summary.resolved += 1;
    }

    Ok(summary)
}

/// ### 标记单个文件冲突已解决
/// 使用工作副本中的内容；未开启 autoResolve 时需要用户确认。返回是否执行了 resolve
pub fn resolve_path(repository: &Repository, path: &Path, auto_resolve: bool, prompt: &dyn Prompt) -> AppResult<bool> {
    if !auto_resolve {
        let title = format!("Mark the conflict as resolved for \"{}\"?", display_name(path));
        if !prompt.confirm(&title)? {
            return Ok(false);
        }
    }

    repository.resolve(&[path.to_path_buf()], ConflictChoice::Working)?;
    Ok(true)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
