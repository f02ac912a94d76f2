//! Fake host implementations for testing.
//!
//! `RecordingRunner` records every command without spawning anything and answers
//! from a script of canned results. `FakePaths` answers existence checks from an
//! in-memory set. Together they let the whole menu run in CI without root or disks.

use crate::error::CommandError;
use crate::paths::PathProbe;
use crate::runner::{CommandOutput, CommandRunner, CommandSpec};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Canned behaviour for one program.
#[derive(Debug, Clone)]
enum Scripted {
    Stdout(String),
    ExitCode(i32),
    NotFound,
}

/// Runner that records commands instead of executing them.
#[derive(Debug)]
pub struct RecordingRunner {
    elevated: bool,
    dry_run: bool,
    calls: RefCell<Vec<CommandSpec>>,
    scripted: HashMap<String, Scripted>,
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRunner {
    /// A runner with root privileges where every command succeeds.
    pub fn new() -> Self {
        Self {
            elevated: true,
            dry_run: false,
            calls: RefCell::new(Vec::new()),
            scripted: HashMap::new(),
        }
    }

    /// Refuse elevated commands like the real runner does without root.
    pub fn without_privilege(mut self) -> Self {
        self.elevated = false;
        self
    }

    /// Skip what `SystemRunner` skips under `--dry-run`; skipped commands are not recorded.
    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// `program` succeeds and prints `stdout` when captured.
    pub fn with_stdout(mut self, program: &str, stdout: &str) -> Self {
        self.scripted
            .insert(program.to_string(), Scripted::Stdout(stdout.to_string()));
        self
    }

    /// `program` exits with `code`.
    pub fn with_exit_code(mut self, program: &str, code: i32) -> Self {
        self.scripted
            .insert(program.to_string(), Scripted::ExitCode(code));
        self
    }

    /// `program` is not installed.
    pub fn with_missing(mut self, program: &str) -> Self {
        self.scripted.insert(program.to_string(), Scripted::NotFound);
        self
    }

    /// Every command that reached the runner, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Command lines of every recorded call.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.to_string()).collect()
    }

    /// Recorded calls of one program.
    pub fn calls_to(&self, program: &str) -> Vec<CommandSpec> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program == program)
            .cloned()
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        if self.dry_run && spec.skipped_in_dry_run() {
            return Ok(CommandOutput::skipped());
        }
        if spec.elevated && !self.elevated {
            return Err(CommandError::MissingPrivilege {
                command: spec.to_string(),
            });
        }
        self.calls.borrow_mut().push(spec.clone());

        let captured = spec.captures_output();
        let (stdout, code) = match self.scripted.get(&spec.program) {
            None => (String::new(), 0),
            Some(Scripted::Stdout(text)) => (text.clone(), 0),
            Some(Scripted::ExitCode(code)) => (String::new(), *code),
            Some(Scripted::NotFound) => {
                return Err(CommandError::NotFound {
                    program: spec.program.clone(),
                });
            }
        };

        if code != 0 && spec.check {
            return Err(CommandError::Failed {
                command: spec.to_string(),
                exit_code: Some(code),
                stderr: format!("{}: scripted failure", spec.program),
            });
        }

        Ok(CommandOutput {
            stdout: if captured { stdout } else { String::new() },
            stderr: String::new(),
            exit_code: Some(code),
            success: code == 0,
            captured,
            dry_run: false,
        })
    }
}

/// In-memory filesystem view.
#[derive(Debug, Clone, Default)]
pub struct FakePaths {
    files: HashSet<PathBuf>,
    dirs: HashSet<PathBuf>,
}

impl FakePaths {
    /// Only `.` exists.
    pub fn new() -> Self {
        Self::default().with_dir(".")
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into());
        self
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs.insert(path.into());
        self
    }
}

impl PathProbe for FakePaths {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains(path) || self.dirs.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }
}
