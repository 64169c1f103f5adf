//! ### 命令表
//!
//! 所有命令按固定顺序登记在 `COMMANDS` 中，CLI 通过标识符查找并执行

use crate::{
    commands::handlers::{self, CommandArgs},
    core::{
        app::App,
        error::{AppError, AppResult},
    },
};

pub type Handler = fn(&App, &CommandArgs) -> AppResult<()>;

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandOptions {
    /// Fails up front when no working copy is open.
    pub requires_repository: bool,
    /// The command changes the working copy or the repository.
    pub modifies: bool,
}

pub struct CommandEntry {
    pub id: &'static str,
    pub handler: Handler,
    pub options: CommandOptions,
}

const READ: CommandOptions = CommandOptions { requires_repository: true, modifies: false };
const WRITE: CommandOptions = CommandOptions { requires_repository: true, modifies: true };

pub static COMMANDS: &[CommandEntry] = &[
    CommandEntry { id: "svn.status", handler: handlers::handle_status, options: READ },
    CommandEntry { id: "svn.add", handler: handlers::handle_add, options: WRITE },
    CommandEntry { id: "svn.remove", handler: handlers::handle_remove, options: WRITE },
    CommandEntry { id: "svn.revert", handler: handlers::handle_revert, options: WRITE },
    CommandEntry { id: "svn.changelist", handler: handlers::handle_changelist, options: WRITE },
    CommandEntry { id: "svn.commit", handler: handlers::handle_commit, options: WRITE },
    CommandEntry { id: "svn.update", handler: handlers::handle_update, options: WRITE },
    CommandEntry { id: "svn.switchBranch", handler: handlers::handle_switch, options: WRITE },
    CommandEntry { id: "svn.branch", handler: handlers::handle_branch, options: WRITE },
    CommandEntry { id: "svn.branches", handler: handlers::handle_branches, options: READ },
    CommandEntry { id: "svn.log", handler: handlers::handle_log, options: READ },
    CommandEntry { id: "svn.resolve", handler: handlers::handle_resolve, options: WRITE },
    CommandEntry { id: "svn.resolveAll", handler: handlers::handle_resolve_all, options: WRITE },
    CommandEntry { id: "svn.propset", handler: handlers::handle_propset, options: WRITE },
    CommandEntry { id: "svn.addToIgnore", handler: handlers::handle_ignore, options: WRITE },
    CommandEntry { id: "svn.patch", handler: handlers::handle_patch, options: READ },
    CommandEntry { id: "svn.show", handler: handlers::handle_show, options: READ },
    CommandEntry { id: "svn.cleanup", handler: handlers::handle_cleanup, options: WRITE },
    CommandEntry {
        id: "svn.repositories",
        handler: handlers::handle_repositories,
        options: CommandOptions { requires_repository: false, modifies: false },
    },
];

pub fn find(id: &str) -> Option<&'static CommandEntry> {
    COMMANDS.iter().find(|entry| entry.id == id)
}

/// Looks up `id` and runs its handler.
pub fn execute(app: &App, id: &str, args: &CommandArgs) -> AppResult<()> {
    let entry = find(id).ok_or_else(|| AppError::Validation(format!("Unknown command: {}", id)))?;

    if entry.options.requires_repository && app.registry.repositories().is_empty() {
        return Err(AppError::NoRepository(
            args.paths.first().cloned().unwrap_or_default(),
        ));
    }

    tracing::debug!(command = entry.id, modifies = entry.options.modifies, "running command");
    (entry.handler)(app, args)
}
