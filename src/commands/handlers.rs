//! ### 命令处理函数
//!
//! 每个函数对应命令表中的一项，负责把参数交给工作流并显示结果

use std::path::PathBuf;

use crate::{
    commands::{
        batch::{self, BatchResults},
        branch::{create_and_switch_to_branch, pick_branch, switch_to_branch},
        commit::{CommitInput, commit_selected, commit_with_changelist},
        conflicts::{resolve_all, resolve_path},
        credentials::with_auth_retry,
        pick::pick_repository,
        prompt::Prompt,
        property::{ignore_paths, set_property_flow},
        resource_pair::{Against, load_endpoint, resource_pair},
    },
    core::{
        app::App,
        error::{AppError, AppResult},
        repository::ConflictChoice,
        utils::parse_revision_arg,
    },
};

/// Arguments collected by the CLI for any command.
#[derive(Debug, Clone, Default)]
pub struct CommandArgs {
    pub paths: Vec<PathBuf>,
    pub message: Option<String>,
    pub name: Option<String>,
    pub revision: Option<String>,
    pub against: Option<String>,
    pub accept: Option<String>,
    /// keep-local / recursive / by-extension / remove, depending on the command
    pub flag: bool,
    pub limit: usize,
}

impl CommandArgs {
    fn first_path(&self) -> Option<&std::path::Path> {
        self.paths.first().map(PathBuf::as_path)
    }
}

fn finish_batch<T>(app: &App, results: &BatchResults<T>, done: &str) -> AppResult<()> {
    if results.is_empty() {
        return Err(AppError::Validation("None of the given paths are inside a working copy".to_string()));
    }

    let failures = batch::report(results, &app.ui);
    let succeeded = results.len() - failures;
    if succeeded > 0 {
        app.ui.success(&format!("{} in {} working cop{}", done, succeeded, if succeeded == 1 { "y" } else { "ies" }));
    }
    if failures > 0 {
        return Err(AppError::Validation(format!("{} working cop{} failed", failures, if failures == 1 { "y" } else { "ies" })));
    }
    Ok(())
}

fn require_paths(args: &CommandArgs) -> AppResult<()> {
    if args.paths.is_empty() {
        return Err(AppError::Validation("No files selected".to_string()));
    }
    Ok(())
}

pub fn handle_status(app: &App, args: &CommandArgs) -> AppResult<()> {
    let repository = pick_repository(&app.registry, args.first_path(), &app.ui)?;
    app.ui.update_step("Fetching status");
    let resources = repository.status()?;
    app.ui.show_status(repository.root(), &resources);
    Ok(())
}

pub fn handle_add(app: &App, args: &CommandArgs) -> AppResult<()> {
    require_paths(args)?;
    finish_batch(app, &batch::add(&app.registry, &args.paths), "Added")
}

pub fn handle_remove(app: &App, args: &CommandArgs) -> AppResult<()> {
    require_paths(args)?;
    finish_batch(app, &batch::remove(&app.registry, &args.paths, args.flag), "Removed")
}

pub fn handle_revert(app: &App, args: &CommandArgs) -> AppResult<()> {
    require_paths(args)?;
    if !app.ui.confirm(&format!("Revert {} path(s)? Local changes will be lost.", args.paths.len()))? {
        return Err(AppError::OperationCancelled);
    }
    finish_batch(app, &batch::revert(&app.registry, &args.paths, args.flag), "Reverted")
}

pub fn handle_changelist(app: &App, args: &CommandArgs) -> AppResult<()> {
    require_paths(args)?;
    let name = if args.flag { None } else { args.name.as_deref() };
    if name.is_none() && !args.flag {
        return Err(AppError::Validation("Changelist name is required".to_string()));
    }
    finish_batch(app, &batch::changelist(&app.registry, &args.paths, name), "Changelist updated")
}

pub fn handle_commit(app: &App, args: &CommandArgs) -> AppResult<()> {
    let message = match &args.message {
        Some(message) => message.clone(),
        None => app.ui.input("Commit message", false)?.unwrap_or_default(),
    };
    let mut input = CommitInput::new(message);

    if !args.paths.is_empty() {
        let results = commit_selected(&app.registry, &args.paths, &mut input)?;
        for (repository, result) in &results {
            if let Ok(commit) = result {
                let revision = commit.revision.map(|r| format!("r{}", r)).unwrap_or_else(|| "?".to_string());
                app.ui.info(&format!("{}: committed revision {}", repository.root().display(), revision));
            }
        }
        return finish_batch(app, &results, "Committed");
    }

    let repository = pick_repository(&app.registry, None, &app.ui)?;
    let result = with_auth_retry(&repository, &app.ui, |repository| {
        commit_with_changelist(repository, &mut input, &app.ui)
    })?;

    match result.revision {
        Some(revision) => app.ui.success(&format!("Committed revision r{}", revision)),
        None => app.ui.success("Nothing was committed"),
    }
    Ok(())
}

pub fn handle_update(app: &App, args: &CommandArgs) -> AppResult<()> {
    let revision = match &args.revision {
        Some(rev) => Some(parse_revision_arg(rev)?.to_string()),
        None => None,
    };

    let repository = pick_repository(&app.registry, args.first_path(), &app.ui)?;
    app.ui.update_step("Updating");
    let line = with_auth_retry(&repository, &app.ui, |repository| repository.update(revision.as_deref(), args.flag))?;
    app.ui.success(&line);
    Ok(())
}

pub fn handle_switch(app: &App, args: &CommandArgs) -> AppResult<()> {
    let repository = pick_repository(&app.registry, args.first_path(), &app.ui)?;
    let name = match &args.name {
        Some(name) => name.clone(),
        None => pick_branch(&repository, &app.ui)?,
    };
    let url = switch_to_branch(&repository, &name, &app.ui)?;
    app.ui.success(&format!("Switched to {}", url));
    Ok(())
}

pub fn handle_branch(app: &App, args: &CommandArgs) -> AppResult<()> {
    let repository = pick_repository(&app.registry, args.first_path(), &app.ui)?;
    let name = match &args.name {
        Some(name) => name.clone(),
        None => app.ui.input("New branch name", false)?.ok_or(AppError::OperationCancelled)?,
    };
    let url = create_and_switch_to_branch(&repository, &name, &app.ui)?;
    app.ui.success(&format!("Now on {}", url));
    Ok(())
}

pub fn handle_branches(app: &App, args: &CommandArgs) -> AppResult<()> {
    let repository = pick_repository(&app.registry, args.first_path(), &app.ui)?;
    let info = repository.info(None)?;
    let branches = with_auth_retry(&repository, &app.ui, |repository| repository.branches())?;
    let current = branches
        .iter()
        .position(|name| info.url == repository.branch_url(&info.repository_root, name));
    app.ui.show_branches(&branches, current);
    Ok(())
}

pub fn handle_log(app: &App, args: &CommandArgs) -> AppResult<()> {
    let repository = pick_repository(&app.registry, args.first_path(), &app.ui)?;
    let limit = if args.limit == 0 { 50 } else { args.limit };
    app.ui.update_step("Fetching log");
    let entries = with_auth_retry(&repository, &app.ui, |repository| repository.log(limit, args.first_path()))?;
    app.ui.show_log(&entries);
    Ok(())
}

pub fn handle_resolve(app: &App, args: &CommandArgs) -> AppResult<()> {
    if let Some(accept) = &args.accept {
        require_paths(args)?;
        let choice = ConflictChoice::ALL
            .into_iter()
            .find(|c| c.as_arg() == accept.as_str())
            .ok_or_else(|| AppError::Validation(format!("Unknown --accept value: {}", accept)))?;
        return finish_batch(app, &batch::resolve(&app.registry, &args.paths, choice), "Resolved");
    }

    match args.paths.as_slice() {
        [] => handle_resolve_all(app, args),
        [path] => {
            let repository = app.registry.resolve(path).ok_or_else(|| AppError::NoRepository(path.clone()))?;
            if resolve_path(&repository, path, app.settings.conflict.auto_resolve, &app.ui)? {
                app.ui.success(&format!("Resolved {}", path.display()));
            }
            Ok(())
        }
        _ => Err(AppError::Validation("Pass --accept to resolve several paths at once".to_string())),
    }
}

pub fn handle_resolve_all(app: &App, args: &CommandArgs) -> AppResult<()> {
    let repository = pick_repository(&app.registry, args.first_path(), &app.ui)?;
    let summary = resolve_all(&repository, &app.ui)?;
    if summary.skipped > 0 {
        app.ui.warn(&format!("{} conflict(s) left unresolved", summary.skipped));
    }
    app.ui.success(&format!("Resolved {} conflict(s)", summary.resolved));
    Ok(())
}

pub fn handle_propset(app: &App, args: &CommandArgs) -> AppResult<()> {
    let results = set_property_flow(&app.registry, &args.paths, &app.ui)?;
    finish_batch(app, &results, "Property set")
}

pub fn handle_ignore(app: &App, args: &CommandArgs) -> AppResult<()> {
    require_paths(args)?;
    finish_batch(app, &ignore_paths(&app.registry, &args.paths, args.flag), "Ignored")
}

pub fn handle_patch(app: &App, args: &CommandArgs) -> AppResult<()> {
    require_paths(args)?;
    let (patch, results) = batch::patch(&app.registry, &args.paths);
    batch::report(&results, &app.ui);
    if patch.is_empty() {
        app.ui.warn("No changes to put in a patch");
    } else {
        app.ui.print_raw(&patch);
    }
    Ok(())
}

pub fn handle_show(app: &App, args: &CommandArgs) -> AppResult<()> {
    let path = args.first_path().ok_or_else(|| AppError::Validation("No file selected".to_string()))?;
    let repository = app.registry.resolve(path).ok_or_else(|| AppError::NoRepository(path.to_path_buf()))?;
    let against = Against::parse(args.against.as_deref().unwrap_or(""))?;

    let resource = repository
        .status()?
        .into_iter()
        .find(|r| r.path == crate::core::registry::normalize(path))
        .ok_or_else(|| AppError::Validation(format!("{} has no local changes", path.display())))?;

    let pair = resource_pair(&resource, against);
    app.ui.info(&pair.title);
    match &pair.left {
        Some(endpoint) => app.ui.print_raw(&load_endpoint(&repository, endpoint)?),
        None => app.ui.warn("Nothing to compare against"),
    }
    Ok(())
}

pub fn handle_cleanup(app: &App, args: &CommandArgs) -> AppResult<()> {
    let repository = pick_repository(&app.registry, args.first_path(), &app.ui)?;
    repository.cleanup()?;
    app.ui.success("Cleanup finished");
    Ok(())
}

pub fn handle_repositories(app: &App, _args: &CommandArgs) -> AppResult<()> {
    app.ui.show_repositories(&app.registry.repositories());
    Ok(())
}
