#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::VecDeque,
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process::Command,
    sync::Arc,
    thread,
    time::Duration,
};

use svn_scm::{
    commands::prompt::Prompt,
    core::{
        error::AppResult,
        output::OutputChannel,
        registry::Registry,
        settings::BranchLayout,
        svn::Svn,
    },
};
use tempfile::TempDir;

const SEPARATOR: char = '\u{1f}';
/// Terminates each logged call; not a newline so arguments may contain one.
const RECORD_END: char = '\u{1e}';

/// A shell script standing in for `svn`. Every call appends its argv to a
/// log file; `cases` are `case "$1"` arms keyed by subcommand. `$HERE` in a
/// body is the temp dir holding the script and its fixtures.
pub struct FakeSvn {
    pub dir: TempDir,
    pub bin: PathBuf,
    log: PathBuf,
}

impl FakeSvn {
    pub fn new(cases: &[(&str, &str)]) -> FakeSvn {
        let dir = tempfile::tempdir().expect("tempdir");
        let bin = dir.path().join("svn");
        let log = dir.path().join("calls.log");

        let arms: String = cases
            .iter()
            .map(|(subcommand, body)| format!("  {})\n    {}\n    ;;\n", subcommand, body))
            .collect();

        let script = format!(
            "#!/bin/sh\nHERE='{here}'\nprintf '%s\\037' \"$@\" >> '{log}'\nprintf '\\036' >> '{log}'\ncase \"$1\" in\n{arms}esac\nexit 0\n",
            here = dir.path().display(),
            log = log.display(),
            arms = arms,
        );
        fs::write(&bin, script).expect("write fake svn");
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).expect("chmod fake svn");

        wait_until_runnable(&bin);
        let _ = fs::remove_file(&log);

        FakeSvn { dir, bin, log }
    }

    /// Writes `content` next to the script and returns its path.
    pub fn fixture(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    /// A working copy folder inside the temp dir.
    pub fn working_copy(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::create_dir_all(&path).expect("create working copy");
        path
    }

    pub fn svn(&self, output: Arc<OutputChannel>) -> Arc<Svn> {
        Arc::new(Svn::new(self.bin.clone(), "1.14.3".to_string(), output, None))
    }

    pub fn registry(&self) -> Registry {
        Registry::new(self.svn(OutputChannel::new()), BranchLayout::default())
    }

    /// argv of every call so far, oldest first.
    pub fn calls(&self) -> Vec<Vec<String>> {
        let Ok(text) = fs::read_to_string(&self.log) else {
            return Vec::new();
        };
        text.split(RECORD_END)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.split(SEPARATOR)
                    .filter(|arg| !arg.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }

    pub fn calls_to(&self, subcommand: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|argv| argv.first().map(String::as_str) == Some(subcommand))
            .collect()
    }
}

/// A freshly written script can briefly fail with ETXTBSY while another test
/// thread forks.
fn wait_until_runnable(bin: &Path) {
    for _ in 0..50 {
        match Command::new(bin).arg("--version").output() {
            Ok(_) => return,
            Err(err) if err.raw_os_error() == Some(26) => thread::sleep(Duration::from_millis(20)),
            Err(err) => panic!("fake svn not runnable: {}", err),
        }
    }
    panic!("fake svn stayed busy");
}

/// One scripted answer per prompt call, in order.
#[derive(Debug, Clone)]
pub enum Answer {
    Pick(Option<usize>),
    Input(Option<String>),
    Confirm(bool),
}

#[derive(Default)]
pub struct ScriptedPrompt {
    answers: RefCell<VecDeque<Answer>>,
    pub titles: RefCell<Vec<String>>,
    pub messages: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        ScriptedPrompt {
            answers: RefCell::new(answers.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next(&self, title: &str) -> Answer {
        self.titles.borrow_mut().push(title.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted answer for prompt {:?}", title))
    }
}

impl Prompt for ScriptedPrompt {
    fn pick(&self, title: &str, _items: &[String]) -> AppResult<Option<usize>> {
        match self.next(title) {
            Answer::Pick(choice) => Ok(choice),
            other => panic!("expected a pick for {:?}, got {:?}", title, other),
        }
    }

    fn input(&self, title: &str, _secret: bool) -> AppResult<Option<String>> {
        match self.next(title) {
            Answer::Input(value) => Ok(value),
            other => panic!("expected an input for {:?}, got {:?}", title, other),
        }
    }

    fn confirm(&self, title: &str) -> AppResult<bool> {
        match self.next(title) {
            Answer::Confirm(value) => Ok(value),
            other => panic!("expected a confirm for {:?}, got {:?}", title, other),
        }
    }

    fn info(&self, msg: &str) {
        self.messages.borrow_mut().push(msg.to_string());
    }

    fn warn(&self, msg: &str) {
        self.messages.borrow_mut().push(msg.to_string());
    }

    fn error(&self, msg: &str) {
        self.messages.borrow_mut().push(msg.to_string());
    }
}

pub fn status_xml(entries: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<status>\n<target path=\".\">\n{}\n</target>\n</status>\n",
        entries.join("\n")
    )
}

pub fn entry(path: &str, wc_status: &str) -> String {
    format!("<entry path=\"{}\"><wc-status {}/></entry>", path, wc_status)
}
