//! ### 执行 svn 命令
//!
//! 每次调用只启动一个子进程，不重试、不超时。stdout 和 stderr 并发读取，
//! 两个流都关闭且进程退出之后才返回。

use std::{
    io::{self, Read},
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
    sync::Arc,
    thread,
};

use crate::core::{
    encoding,
    output::OutputChannel,
    svn_error::SvnError,
};

/// Per-call knobs for [`Svn::exec`].
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Overrides the working directory passed to `exec`.
    pub cwd: Option<PathBuf>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Echo the command line and stderr to the output channel.
    pub log: bool,
    /// Encoding name used for stdout instead of the configured default.
    pub encoding: Option<String>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        ExecOptions {
            cwd: None,
            username: None,
            password: None,
            log: true,
            encoding: None,
        }
    }
}

impl ExecOptions {
    pub fn quiet() -> Self {
        ExecOptions { log: false, ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// The svn executable together with its diagnostic channel.
pub struct Svn {
    path: PathBuf,
    version: String,
    output: Arc<OutputChannel>,
    default_encoding: Option<String>,
}

impl Svn {
    pub fn new(path: PathBuf, version: String, output: Arc<OutputChannel>, default_encoding: Option<String>) -> Self {
        Svn { path, version, output, default_encoding }
    }

    /// ### svn --version --quiet
    /// 找到可用的 svn 并记录版本号
    pub fn find(hint: Option<&Path>, output: Arc<OutputChannel>, default_encoding: Option<String>) -> Result<Self, SvnError> {
        let path = hint.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("svn"));

        let result = Command::new(&path)
            .args(["--version", "--quiet"])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SvnError::launch_failure("--version", &e))?;

        if !result.status.success() {
            return Err(SvnError::from_exit(
                "--version",
                result.status.code(),
                String::from_utf8_lossy(&result.stdout).to_string(),
                String::from_utf8_lossy(&result.stderr).to_string(),
            ));
        }

        let version = String::from_utf8_lossy(&result.stdout).trim().to_string();
        tracing::debug!("Using svn {} from {}", version, path.display());

        Ok(Svn::new(path, version, output, default_encoding))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn output(&self) -> &Arc<OutputChannel> {
        &self.output
    }

    /// ### exec
    /// 执行 `svn <args> [--username U] [--password P]`
    pub fn exec(&self, cwd: &Path, mut args: Vec<String>, options: ExecOptions) -> Result<ExecResult, SvnError> {
        let ExecOptions { cwd: cwd_override, username, password, log, encoding } = options;
        let cwd = cwd_override.unwrap_or_else(|| cwd.to_path_buf());
        let subcommand = args.first().cloned().unwrap_or_default();

        if let Some(username) = username {
            args.push("--username".to_string());
            args.push(username);
        }
        if let Some(password) = password {
            args.push("--password".to_string());
            args.push(password);
        }

        if log {
            self.output.emit(&format_command_line(&cwd, &self.tool_name(), &args));
        }

        let mut command = Command::new(&self.path);
        command
            .args(&args)
            .current_dir(&cwd)
            .env("LC_MESSAGES", "en_US.UTF-8")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .map_err(|e| SvnError::launch_failure(&subcommand, &e))?;

        let (stdout_bytes, stderr_bytes) = collect_output(&mut child)
            .map_err(|e| SvnError::launch_failure(&subcommand, &e))?;
        let status = child
            .wait()
            .map_err(|e| SvnError::launch_failure(&subcommand, &e))?;

        let configured = encoding.as_deref().or(self.default_encoding.as_deref());
        let stdout_encoding = encoding::resolve(&stdout_bytes, &args, configured);
        let stdout = encoding::decode(&stdout_bytes, stdout_encoding);
        let stderr = String::from_utf8_lossy(&stderr_bytes).to_string();

        if log && !stderr.is_empty() {
            self.output.emit(&stderr);
        }

        match status.code() {
            Some(0) => Ok(ExecResult { exit_code: 0, stdout, stderr }),
            code => Err(SvnError::from_exit(&subcommand, code, stdout, stderr)),
        }
    }

    fn tool_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "svn".to_string())
    }
}

/// Reads both pipes to EOF. The stderr reader is a scoped thread, so it is
/// joined on every return path.
fn collect_output(child: &mut Child) -> io::Result<(Vec<u8>, Vec<u8>)> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    thread::scope(|scope| {
        let stderr_reader = scope.spawn(move || -> io::Result<Vec<u8>> {
            let mut buf = Vec::new();
            if let Some(mut stream) = stderr {
                stream.read_to_end(&mut buf)?;
            }
            Ok(buf)
        });

        let mut stdout_buf = Vec::new();
        if let Some(mut stream) = stdout {
            stream.read_to_end(&mut stdout_buf)?;
        }

        let stderr_buf = stderr_reader
            .join()
            .map_err(|_| io::Error::other("stderr reader panicked"))??;

        Ok((stdout_buf, stderr_buf))
    })
}

/// `[<cwd basename>]$ svn <args>`, quoting empty or spaced arguments and
/// hiding the password.
pub fn format_command_line(cwd: &Path, tool: &str, args: &[String]) -> String {
    let folder = cwd
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| cwd.display().to_string());

    let mut rendered = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        if hide_next {
            rendered.push("******".to_string());
            hide_next = false;
            continue;
        }
        hide_next = arg == "--password";

        if arg.is_empty() || arg.contains(' ') {
            rendered.push(format!("\"{}\"", arg));
        } else {
            rendered.push(arg.clone());
        }
    }

    format!("[{}]$ {} {}", folder, tool, rendered.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn command_line_uses_last_path_segment() {
        let line = format_command_line(Path::new("/home/me/checkout"), "svn", &args(&["status", "--xml"]));
        assert_eq!(line, "[checkout]$ svn status --xml");
    }

    #[test]
    fn command_line_quotes_empty_and_spaced_args() {
        let line = format_command_line(Path::new("/wc"), "svn", &args(&["commit", "-m", "fix the bug", "", "a.txt"]));
        assert_eq!(line, "[wc]$ svn commit -m \"fix the bug\" \"\" a.txt");
    }

    #[test]
    fn command_line_hides_password() {
        let line = format_command_line(
            Path::new("/wc"),
            "svn",
            &args(&["update", "--username", "alice", "--password", "s3cret"]),
        );
        assert_eq!(line, "[wc]$ svn update --username alice --password ******");
    }

    #[test]
    fn missing_executable_is_a_launch_failure() {
        let svn = Svn::new(
            PathBuf::from("/definitely/not/here/svn"),
            String::new(),
            OutputChannel::new(),
            None,
        );
        let err = svn.exec(Path::new("."), args(&["status"]), ExecOptions::quiet()).unwrap_err();
        assert_eq!(err.code, Some(crate::core::svn_error::SvnErrorCode::NotASvnRepository));
        assert_eq!(err.exit_code, None);
        assert_eq!(err.command, "status");
    }
}
