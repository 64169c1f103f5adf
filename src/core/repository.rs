//! ### 工作副本
//!
//! 每个工作副本根目录对应一个 `Repository`。每个操作只负责拼参数并调用
//! `Svn::exec`，失败原样返回。
//!
//! 同一个工作副本上的并发操作不做串行化，由调用方负责；svn 自己的
//! 工作副本锁是唯一的保护（冲突时返回 RepositoryIsLocked）。

use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use crate::core::{
    error::{AppError, AppResult},
    info::{InfoEntry, LogEntry, parse_info, parse_list_dirs, parse_log},
    settings::BranchLayout,
    status::{Resource, commit_paths, parse_status},
    svn::{ExecOptions, ExecResult, Svn},
    svn_error::SvnError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// `--accept` values for `svn resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    Base,
    Working,
    MineConflict,
    TheirsConflict,
    MineFull,
    TheirsFull,
}

impl ConflictChoice {
    pub const ALL: [ConflictChoice; 6] = [
        ConflictChoice::Base,
        ConflictChoice::Working,
        ConflictChoice::MineConflict,
        ConflictChoice::TheirsConflict,
        ConflictChoice::MineFull,
        ConflictChoice::TheirsFull,
    ];

    pub fn as_arg(&self) -> &'static str {
        match self {
            ConflictChoice::Base => "base",
            ConflictChoice::Working => "working",
            ConflictChoice::MineConflict => "mine-conflict",
            ConflictChoice::TheirsConflict => "theirs-conflict",
            ConflictChoice::MineFull => "mine-full",
            ConflictChoice::TheirsFull => "theirs-full",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConflictChoice::Base => "Use the base version (discard both sides)",
            ConflictChoice::Working => "Use the working copy version as is",
            ConflictChoice::MineConflict => "Keep my side for conflicting hunks",
            ConflictChoice::TheirsConflict => "Take their side for conflicting hunks",
            ConflictChoice::MineFull => "Keep my whole file",
            ConflictChoice::TheirsFull => "Take their whole file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub revision: Option<u64>,
    pub output: String,
}

pub struct Repository {
    root: PathBuf,
    workspace_root: PathBuf,
    svn: Arc<Svn>,
    layout: BranchLayout,
    credentials: RwLock<Option<Credentials>>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .field("workspace_root", &self.workspace_root)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Repository {
    pub fn new(root: PathBuf, workspace_root: PathBuf, svn: Arc<Svn>, layout: BranchLayout) -> Self {
        Repository {
            root,
            workspace_root,
            svn,
            layout,
            credentials: RwLock::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn svn(&self) -> &Svn {
        &self.svn
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials.read().ok().and_then(|c| c.clone())
    }

    pub fn set_credentials(&self, credentials: Option<Credentials>) {
        if let Ok(mut slot) = self.credentials.write() {
            *slot = credentials;
        }
    }

    /// Runs svn in the working copy root with the stored credentials.
    pub fn exec(&self, args: Vec<String>) -> Result<ExecResult, SvnError> {
        self.exec_with(args, ExecOptions::default())
    }

    pub fn exec_with(&self, args: Vec<String>, mut options: ExecOptions) -> Result<ExecResult, SvnError> {
        if let Some(credentials) = self.credentials() {
            options.username.get_or_insert(credentials.username);
            options.password.get_or_insert(credentials.password);
        }
        self.svn.exec(&self.root, args, options)
    }

    /// ### svn status --xml
    pub fn status(&self) -> AppResult<Vec<Resource>> {
        let result = self.exec_with(args(&["status", "--xml"]), ExecOptions::quiet())?;
        parse_status(&result.stdout, &self.root)
    }

    /// ### svn info --xml
    pub fn info(&self, target: Option<&str>) -> AppResult<InfoEntry> {
        let mut argv = args(&["info", "--xml"]);
        argv.extend(target.map(str::to_string));
        let result = self.exec_with(argv, ExecOptions::quiet())?;
        parse_info(&result.stdout)
    }

    /// ### svn add
    pub fn add(&self, paths: &[PathBuf]) -> AppResult<String> {
        let mut argv = args(&["add", "--parents"]);
        argv.extend(path_args(paths));
        Ok(self.exec(argv)?.stdout)
    }

    /// ### svn remove
    pub fn remove(&self, paths: &[PathBuf], keep_local: bool) -> AppResult<String> {
        let mut argv = args(&["remove"]);
        if keep_local {
            argv.push("--keep-local".to_string());
        }
        argv.extend(path_args(paths));
        Ok(self.exec(argv)?.stdout)
    }

    /// ### svn revert
    pub fn revert(&self, paths: &[PathBuf], recursive: bool) -> AppResult<String> {
        let depth = if recursive { "infinity" } else { "empty" };
        let mut argv = args(&["revert", "--depth", depth]);
        argv.extend(path_args(paths));
        Ok(self.exec(argv)?.stdout)
    }

    /// ### svn commit
    /// 提交指定的资源，移动过来的文件会带上它的来源路径
    pub fn commit(&self, message: &str, resources: &[Resource]) -> AppResult<CommitResult> {
        let mut argv = args(&["commit", "-m", message]);
        argv.extend(path_args(&commit_paths(resources)));
        let output = self.exec(argv)?.stdout;

        Ok(CommitResult {
            revision: parse_committed_revision(&output),
            output,
        })
    }

    /// ### svn update
    /// 返回最后一行，例如 "At revision 12."
    pub fn update(&self, revision: Option<&str>, ignore_externals: bool) -> AppResult<String> {
        let mut argv = args(&["update"]);
        if let Some(rev) = revision {
            argv.push("-r".to_string());
            argv.push(rev.to_string());
        }
        if ignore_externals {
            argv.push("--ignore-externals".to_string());
        }
        let output = self.exec(argv)?.stdout;
        Ok(output.trim().lines().last().unwrap_or("").to_string())
    }

    /// ### svn switch
    pub fn switch_branch(&self, url: &str, ignore_ancestry: bool) -> AppResult<String> {
        let mut argv = args(&["switch", url]);
        if ignore_ancestry {
            argv.push("--ignore-ancestry".to_string());
        }
        Ok(self.exec(argv)?.stdout)
    }

    /// ### svn copy
    /// 从当前 URL 创建分支，返回新分支的 URL
    pub fn create_branch(&self, name: &str, message: &str) -> AppResult<String> {
        let info = self.info(None)?;
        let target = format!("{}/{}/{}", info.repository_root, self.layout.branches, name);
        self.exec(args(&["copy", info.url.as_str(), target.as_str(), "-m", message, "--parents"]))?;
        Ok(target)
    }

    /// URL of a branch by name; the trunk name maps to the trunk folder.
    pub fn branch_url(&self, repository_root: &str, name: &str) -> String {
        if name == self.layout.trunk {
            format!("{}/{}", repository_root, self.layout.trunk)
        } else {
            format!("{}/{}/{}", repository_root, self.layout.branches, name)
        }
    }

    /// ### svn list --xml
    /// trunk 放在第一位
    pub fn branches(&self) -> AppResult<Vec<String>> {
        let info = self.info(None)?;
        let url = format!("{}/{}", info.repository_root, self.layout.branches);
        let result = self.exec_with(args(&["list", "--xml", url.as_str()]), ExecOptions::quiet())?;

        let mut names = vec![self.layout.trunk.clone()];
        names.extend(parse_list_dirs(&result.stdout)?);
        Ok(names)
    }

    /// ### svn resolve
    pub fn resolve(&self, paths: &[PathBuf], choice: ConflictChoice) -> AppResult<String> {
        let mut argv = args(&["resolve", "--accept", choice.as_arg()]);
        argv.extend(path_args(paths));
        Ok(self.exec(argv)?.stdout)
    }

    /// ### svn propset
    pub fn set_property(&self, name: &str, value: &str, paths: &[PathBuf], recursive: bool) -> AppResult<String> {
        let mut argv = args(&["propset", name, value]);
        if recursive {
            argv.push("-R".to_string());
        }
        argv.extend(path_args(paths));
        Ok(self.exec(argv)?.stdout)
    }

    /// ### svn propget
    pub fn get_property(&self, name: &str, path: &Path) -> AppResult<String> {
        let target = path.to_string_lossy().to_string();
        let argv = args(&["propget", name, target.as_str()]);
        Ok(self.exec_with(argv, ExecOptions::quiet())?.stdout)
    }

    /// ### svn:ignore
    /// 把文件名（或 pattern）追加到父目录的 svn:ignore
    pub fn ignore(&self, path: &Path, pattern: Option<&str>) -> AppResult<()> {
        let parent = path
            .parent()
            .ok_or_else(|| AppError::Validation(format!("{} has no parent directory", path.display())))?;
        let entry = match pattern {
            Some(p) => p.to_string(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .ok_or_else(|| AppError::Validation(format!("{} has no file name", path.display())))?,
        };

        let current = match self.get_property("svn:ignore", parent) {
            Ok(current) => current,
            Err(AppError::Svn(err)) if is_property_not_found(&err) => String::new(),
            Err(err) => return Err(err),
        };
        let mut patterns: Vec<String> = current
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        if patterns.contains(&entry) {
            return Ok(());
        }
        patterns.push(entry);

        self.set_property("svn:ignore", &patterns.join("\n"), &[parent.to_path_buf()], false)?;
        Ok(())
    }

    /// ### svn diff
    pub fn patch(&self, paths: &[PathBuf]) -> AppResult<String> {
        let mut argv = args(&["diff", "--internal-diff"]);
        argv.extend(path_args(paths));
        Ok(self.exec_with(argv, ExecOptions::quiet())?.stdout)
    }

    /// ### svn log --xml
    pub fn log(&self, limit: usize, target: Option<&Path>) -> AppResult<Vec<LogEntry>> {
        let limit = limit.to_string();
        let mut argv = args(&["log", "--xml", "--limit", limit.as_str()]);
        argv.extend(target.map(|t| t.to_string_lossy().to_string()));
        let result = self.exec_with(argv, ExecOptions::quiet())?;
        parse_log(&result.stdout)
    }

    /// ### svn cat
    /// 读取某个版本的文件内容，revision 为空时读取 BASE
    pub fn show(&self, path: &Path, revision: Option<&str>) -> AppResult<String> {
        let mut argv = args(&["cat"]);
        if let Some(rev) = revision {
            argv.push("-r".to_string());
            argv.push(rev.to_string());
        }
        argv.push(path.to_string_lossy().to_string());
        Ok(self.exec_with(argv, ExecOptions::quiet())?.stdout)
    }

    /// ### svn changelist
    pub fn add_changelist(&self, name: &str, paths: &[PathBuf]) -> AppResult<String> {
        let mut argv = args(&["changelist", name]);
        argv.extend(path_args(paths));
        Ok(self.exec(argv)?.stdout)
    }

    pub fn remove_changelist(&self, paths: &[PathBuf]) -> AppResult<String> {
        let mut argv = args(&["changelist", "--remove"]);
        argv.extend(path_args(paths));
        Ok(self.exec(argv)?.stdout)
    }

    /// ### svn cleanup
    pub fn cleanup(&self) -> AppResult<()> {
        self.exec(args(&["cleanup"]))?;
        Ok(())
    }
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn path_args(paths: &[PathBuf]) -> impl Iterator<Item = String> + '_ {
    paths.iter().map(|p| p.to_string_lossy().to_string())
}

/// `svn propget` on a path without the property fails with W200017.
fn is_property_not_found(err: &SvnError) -> bool {
    err.stderr.as_deref().is_some_and(|stderr| stderr.contains("W200017"))
}

fn parse_committed_revision(output: &str) -> Option<u64> {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("Committed revision "))
        .and_then(|rest| rest.trim_end_matches('.').parse().ok())
}
