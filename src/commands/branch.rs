//! ### 分支相关的工作流
//!

use crate::{
    commands::prompt::Prompt,
    core::{
        error::{AppError, AppResult, user_message},
        repository::Repository,
        svn_error::SvnErrorCode,
    },
};

/// ### 创建并切换到新分支
/// 返回新分支的 URL
pub fn create_and_switch_to_branch(repository: &Repository, name: &str, prompt: &dyn Prompt) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Branch name cannot be empty".to_string()));
    }

    let url = repository.create_branch(name, &format!("Created new branch {}", name))?;
    prompt.info(&format!("Created branch {}", name));

    switch_to_url(repository, &url, prompt)?;
    Ok(url)
}

/// ### 切换到已有分支
pub fn switch_to_branch(repository: &Repository, name: &str, prompt: &dyn Prompt) -> AppResult<String> {
    let info = repository.info(None)?;
    let url = repository.branch_url(&info.repository_root, name.trim());
    switch_to_url(repository, &url, prompt)?;
    Ok(url)
}

/// Branch names with the trunk first, for the picker.
pub fn pick_branch(repository: &Repository, prompt: &dyn Prompt) -> AppResult<String> {
    let branches = repository.branches()?;
    match prompt.pick("Select a branch", &branches)? {
        Some(index) if index < branches.len() => Ok(branches[index].clone()),
        _ => Err(AppError::OperationCancelled),
    }
}

/// A switch across unrelated histories fails with NotShareCommonAncestry;
/// the user may retry with `--ignore-ancestry`.
fn switch_to_url(repository: &Repository, url: &str, prompt: &dyn Prompt) -> AppResult<()> {
    match repository.switch_branch(url, false) {
        Ok(_) => Ok(()),
        Err(err) if err.svn_code() == Some(SvnErrorCode::NotShareCommonAncestry) => {
            prompt.warn(&user_message(&err));
            if !prompt.confirm("Switch anyway, ignoring ancestry?")? {
                return Err(err);
            }
            repository.switch_branch(url, true)?;
            Ok(())
        }
        Err(err) => Err(err),
    }
}
