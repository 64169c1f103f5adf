//! 认证失败时询问用户名密码并重试一次

use crate::{
    commands::prompt::Prompt,
    core::{
        error::AppResult,
        repository::{Credentials, Repository},
        svn_error::SvnErrorCode,
    },
};

/// Runs `op`; on AuthorizationFailed asks for credentials, stores them on the
/// repository and runs `op` one more time. Dismissing either prompt returns
/// the original error.
pub fn with_auth_retry<T, F>(repository: &Repository, prompt: &dyn Prompt, mut op: F) -> AppResult<T>
where
    F: FnMut(&Repository) -> AppResult<T>,
{
    let err = match op(repository) {
        Err(err) if err.svn_code() == Some(SvnErrorCode::AuthorizationFailed) => err,
        other => return other,
    };

    let Some(credentials) = ask_credentials(repository, prompt)? else {
        return Err(err);
    };
    repository.set_credentials(Some(credentials));

    op(repository)
}

fn ask_credentials(repository: &Repository, prompt: &dyn Prompt) -> AppResult<Option<Credentials>> {
    let title = format!("Username for {}", repository.root().display());
    let Some(username) = prompt.input(&title, false)?.filter(|u| !u.trim().is_empty()) else {
        return Ok(None);
    };

    let Some(password) = prompt.input("Password", true)? else {
        return Ok(None);
    };

    Ok(Some(Credentials {
        username: username.trim().to_string(),
        password,
    }))
}

