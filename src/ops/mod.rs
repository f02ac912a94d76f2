//! Menu operation handlers.
//!
//! Each handler is a short linear script: gather input (the cancel keyword works at
//! every step), confirm anything irreversible, run the external command and report.
//! Handlers only return `Err` for terminal I/O failures and the fatal missing
//! privilege; every other failure is printed and the handler returns normally.

mod benchmark;
mod devices;
mod files;
mod format;
mod imaging;

pub use benchmark::throughput_mib_per_sec;

use crate::config::ToolConfig;
use crate::console::Console;
use crate::error::Result;
use crate::paths::{self, PathProbe};
use crate::prompt::{self, Confirmation, RETURNING};
use crate::runner::{CommandOutput, CommandRunner, CommandSpec};
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Notice for an unknown sub-menu choice.
pub const INVALID_CHOICE: &str = "Invalid choice. Returning to main menu.";

const RULE: &str = "---------------------------------------------";

/// Everything a handler needs: the terminal, the command runner, filesystem checks
/// and the configuration.
pub struct Session<'a, R, W> {
    console: Console<R, W>,
    runner: &'a dyn CommandRunner,
    paths: &'a dyn PathProbe,
    config: &'a ToolConfig,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(
        console: Console<R, W>,
        runner: &'a dyn CommandRunner,
        paths: &'a dyn PathProbe,
        config: &'a ToolConfig,
    ) -> Self {
        Self {
            console,
            runner,
            paths,
            config,
        }
    }

    pub fn console(&self) -> &Console<R, W> {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console<R, W> {
        &mut self.console
    }

    pub fn into_console(self) -> Console<R, W> {
        self.console
    }

    pub(crate) fn say(&mut self, text: impl Display) -> Result<()> {
        self.console.say(text)?;
        Ok(())
    }

    /// Free-text answer; `None` after the cancel keyword or end of input.
    pub(crate) fn ask_text(&mut self, question: &str) -> Result<Option<String>> {
        let Some(answer) = self.console.ask(question)? else {
            return Ok(None);
        };
        if prompt::is_cancel(&answer) {
            self.say(RETURNING)?;
            return Ok(None);
        }
        Ok(Some(answer))
    }

    /// Path answer, cancel-aware.
    pub(crate) fn ask_path(&mut self, question: &str) -> Result<Option<PathBuf>> {
        Ok(self.ask_text(question)?.map(PathBuf::from))
    }

    /// Sub-menu selection. Unknown input prints a notice and yields `None`.
    pub(crate) fn ask_choice<T: FromStr>(&mut self, question: &str) -> Result<Option<T>> {
        let Some(answer) = self.ask_text(question)? else {
            return Ok(None);
        };
        match answer.parse() {
            Ok(choice) => Ok(Some(choice)),
            Err(_) => {
                self.say(INVALID_CHOICE)?;
                Ok(None)
            }
        }
    }

    /// Plain `yes` question; anything else, including end of input, is no.
    pub(crate) fn ask_yes(&mut self, question: &str) -> Result<bool> {
        Ok(self
            .console
            .ask(question)?
            .is_some_and(|answer| prompt::is_yes(&answer)))
    }

    /// Ask for an existing `/dev/...` path until one is given and confirmed, or the
    /// user cancels.
    pub(crate) fn ask_device(&mut self, kind: &str) -> Result<Option<PathBuf>> {
        let question = format!(
            "Enter the FULL {} path (e.g., /dev/sdb, /dev/sdb1, /dev/nvme0n1) or type '{}' to return: ",
            kind,
            prompt::CANCEL_KEYWORD
        );
        loop {
            let Some(answer) = self.ask_text(&question)? else {
                return Ok(None);
            };
            let device = match paths::validate_device_path(&answer, self.paths) {
                Ok(device) => device,
                Err(rejection) => {
                    self.say(rejection)?;
                    continue;
                }
            };

            let check = format!(
                "You selected '{}'. Is this correct? (yes/no): ",
                device.display()
            );
            match self.console.ask(&check)? {
                None => return Ok(None),
                Some(answer) if prompt::is_yes(&answer) => return Ok(Some(device)),
                Some(_) => self.say(format!(
                    "Device selection cancelled. Please try again or type '{}' to return.",
                    prompt::CANCEL_KEYWORD
                ))?,
            }
        }
    }

    /// Existing source plus a destination whose parent directory exists.
    pub(crate) fn ask_source_destination(
        &mut self,
        action: &str,
    ) -> Result<Option<(PathBuf, PathBuf)>> {
        let source = loop {
            let question = format!(
                "Enter SOURCE path (file or directory to {}) or type '{}' to return: ",
                action,
                prompt::CANCEL_KEYWORD
            );
            let Some(source) = self.ask_path(&question)? else {
                return Ok(None);
            };
            if self.paths.exists(&source) {
                break source;
            }
            self.say(format!(
                "Source path '{}' does not exist. Please check.",
                source.display()
            ))?;
        };

        let destination = loop {
            let question = format!(
                "Enter DESTINATION path (where to {}) or type '{}' to return: ",
                action,
                prompt::CANCEL_KEYWORD
            );
            let Some(destination) = self.ask_path(&question)? else {
                return Ok(None);
            };
            if self.paths.exists(paths::parent_or_current(&destination)) {
                break destination;
            }
            self.say(format!(
                "Destination parent directory does not exist for '{}'.",
                destination.display()
            ))?;
        };

        Ok(Some((source, destination)))
    }

    /// Danger prompt. Only the confirmation token lets the action proceed.
    pub(crate) fn confirm_danger(&mut self, action: &str) -> Result<bool> {
        self.say(prompt::danger_banner(action))?;
        let question = format!(
            "Type '{}' (in uppercase) to proceed, or '{}' to return, or anything else to cancel: ",
            prompt::CONFIRM_TOKEN.to_uppercase(),
            prompt::CANCEL_KEYWORD
        );
        let answer = match self.console.ask(&question)? {
            Some(answer) => Confirmation::from_input(&answer),
            None => Confirmation::Cancelled,
        };
        if let Some(message) = answer.message() {
            self.say(message)?;
        }
        Ok(answer.proceed())
    }

    /// Run a command. Recoverable failures are printed and give `None`; a missing
    /// privilege is returned as an error.
    pub(crate) fn execute(&mut self, spec: CommandSpec) -> Result<Option<CommandOutput>> {
        match self.runner.run(&spec) {
            Ok(output) => {
                if output.dry_run {
                    self.say(format!("[dry-run] Skipped: {}", spec))?;
                }
                Ok(Some(output))
            }
            Err(e) if e.is_fatal() => Err(e.into()),
            Err(e) => {
                self.say(&e)?;
                if let Some(stderr) = e.stderr() {
                    self.say(format!("Stderr: {}", stderr))?;
                }
                Ok(None)
            }
        }
    }

    /// Run a command and report whether it exited successfully.
    pub(crate) fn execute_ok(&mut self, spec: CommandSpec) -> Result<bool> {
        Ok(self.execute(spec)?.is_some_and(|output| output.success))
    }

    /// Run a command and print what it captured.
    pub(crate) fn execute_and_show(&mut self, spec: CommandSpec) -> Result<bool> {
        match self.execute(spec)? {
            Some(output) => {
                self.relay(&output)?;
                Ok(output.success)
            }
            None => Ok(false),
        }
    }

    pub(crate) fn relay(&mut self, output: &CommandOutput) -> Result<()> {
        let text = output.stdout.trim_end();
        if output.captured && !text.is_empty() {
            self.say(text)?;
        }
        Ok(())
    }

    /// Best-effort `umount`; the target may simply not be mounted.
    pub(crate) fn try_unmount(&mut self, target: &Path) -> Result<()> {
        self.execute(
            CommandSpec::new("umount")
                .arg(target.display().to_string())
                .unchecked(),
        )?;
        Ok(())
    }

    /// Menu 1: show block devices and partitions.
    pub fn list_storage_devices(&mut self) -> Result<()> {
        self.say("\n--- Available Storage Devices & Partitions ---")?;
        self.say("Please carefully identify your target device (e.g., /dev/sdb, /dev/nvme0n1)")?;
        self.say(RULE)?;
        self.execute_and_show(
            CommandSpec::new("lsblk")
                .args(["-o", "NAME,SIZE,TYPE,MOUNTPOINT"])
                .unprivileged(),
        )?;
        self.say(format!("{}\n", RULE))?;
        Ok(())
    }

    /// Menu 00: tool information.
    pub fn show_tool_info(&mut self) -> Result<()> {
        self.say("\n--- Tool Information ---")?;
        self.say(format!(
            "Tool Name: Storage Device Management Tool ({} {})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ))?;
        self.say(format!("Purpose: {}.", env!("CARGO_PKG_DESCRIPTION")))?;
        self.say("Every operation runs a standard Linux utility (lsblk, dd, mkfs, fdisk, parted, smartctl, ...).")?;
        self.say("Disclaimer: Use with caution. Incorrect operations can lead to data loss.")?;
        self.say(format!("{}\n", RULE))?;
        Ok(())
    }

    fn config(&self) -> &'a ToolConfig {
        self.config
    }

    fn paths(&self) -> &'a dyn PathProbe {
        self.paths
    }
}
