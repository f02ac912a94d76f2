//! External command execution.
//!
//! Handlers describe what to run with a `CommandSpec` and hand it to a
//! `CommandRunner`. `SystemRunner` spawns real processes; `crate::fake` has a
//! recording runner for tests.

mod system;

pub use system::SystemRunner;

use crate::error::CommandError;
use std::fmt;

/// dd argument that makes it print live progress.
pub const PROGRESS_FLAG: &str = "status=progress";

/// One external command and how to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Needs root; refused without it.
    pub elevated: bool,
    /// Capture stdout/stderr instead of attaching the terminal.
    pub capture: bool,
    /// Treat a non-zero exit as an error.
    pub check: bool,
    /// Changes the host even though it runs without root.
    pub writes: bool,
}

impl CommandSpec {
    /// Defaults match the common case: elevated, captured and checked.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            elevated: true,
            capture: true,
            check: true,
            writes: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Runs without root.
    pub fn unprivileged(mut self) -> Self {
        self.elevated = false;
        self
    }

    /// Attach the terminal (interactive tools, long reports).
    pub fn attached(mut self) -> Self {
        self.capture = false;
        self
    }

    /// A non-zero exit is returned as a normal result.
    pub fn unchecked(mut self) -> Self {
        self.check = false;
        self
    }

    /// Unprivileged, but still modifies files (scratch data, cleanup).
    pub fn writes_files(mut self) -> Self {
        self.writes = true;
        self
    }

    /// Dry-run mode reports these instead of running them.
    pub fn skipped_in_dry_run(&self) -> bool {
        self.elevated || self.writes
    }

    /// Whether the command reports live progress on the terminal.
    pub fn streams_progress(&self) -> bool {
        self.args.iter().any(|a| a == PROGRESS_FLAG)
    }

    /// Progress-reporting commands are never captured, whatever `capture` says.
    pub fn captures_output(&self) -> bool {
        self.capture && !self.streams_progress()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of a command that ran (or was skipped in dry-run mode).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Empty when output went straight to the terminal.
    pub stdout: String,
    pub stderr: String,
    /// None if terminated by signal.
    pub exit_code: Option<i32>,
    pub success: bool,
    pub captured: bool,
    /// Skipped because of `--dry-run`.
    pub dry_run: bool,
}

impl CommandOutput {
    /// Placeholder result for a command skipped by dry-run mode.
    pub fn skipped() -> Self {
        Self {
            exit_code: Some(0),
            success: true,
            dry_run: true,
            ..Self::default()
        }
    }
}

/// Runs external commands.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        (**self).run(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let spec = CommandSpec::new("cp").args(["-av", "/a", "/b"]);
        assert!(spec.elevated);
        assert!(spec.capture);
        assert!(spec.check);
        assert_eq!(spec.to_string(), "cp -av /a /b");
    }

    #[test]
    fn test_progress_flag_disables_capture() {
        let spec = CommandSpec::new("dd")
            .args(["if=/dev/zero", "of=/dev/sdb", "bs=4M", PROGRESS_FLAG])
            .unchecked();
        assert!(spec.capture, "flag is left alone");
        assert!(spec.streams_progress());
        assert!(!spec.captures_output());
    }

    #[test]
    fn test_progress_flag_must_be_whole_argument() {
        let spec = CommandSpec::new("echo").arg("status=progressive");
        assert!(!spec.streams_progress());
        assert!(spec.captures_output());
    }

    #[test]
    fn test_attached_and_unprivileged() {
        let spec = CommandSpec::new("df").arg("-h").unprivileged();
        assert!(!spec.elevated);
        assert!(spec.captures_output());

        let spec = CommandSpec::new("fdisk").arg("/dev/sdb").attached();
        assert!(!spec.captures_output());
    }

    #[test]
    fn test_dry_run_skips_elevated_and_writing_commands() {
        assert!(CommandSpec::new("mkfs.ext4").skipped_in_dry_run());
        assert!(!CommandSpec::new("lsblk").unprivileged().skipped_in_dry_run());

        let scratch = CommandSpec::new("dd")
            .args(["if=/dev/zero", "of=/tmp/scratch.bin"])
            .unprivileged()
            .writes_files();
        assert!(!scratch.elevated);
        assert!(scratch.skipped_in_dry_run());
    }

    #[test]
    fn test_skipped_output() {
        let out = CommandOutput::skipped();
        assert!(out.success);
        assert!(out.dry_run);
        assert!(!out.captured);
    }
}
