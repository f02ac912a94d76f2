//! Runner that spawns real processes.
//!
//! Every spawn goes through here so it is logged, gated on privilege and registered
//! with the `ChildRegistry` for signal-time cleanup.

use super::{CommandOutput, CommandRunner, CommandSpec};
use crate::error::CommandError;
use crate::privilege::PrivilegeCheck;
use crate::process_guard::{ChildRegistry, CommandProcessGroup};
use std::io::ErrorKind;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{info, warn};

/// Spawns commands on the host.
#[derive(Debug)]
pub struct SystemRunner<P> {
    privilege: P,
    dry_run: bool,
}

impl<P: PrivilegeCheck> SystemRunner<P> {
    pub fn new(privilege: P) -> Self {
        Self {
            privilege,
            dry_run: false,
        }
    }

    /// In dry-run mode elevated and file-writing commands are reported and skipped.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn privilege(&self) -> &P {
        &self.privilege
    }

    fn spawn_and_wait(
        &self,
        spec: &CommandSpec,
        line: &str,
    ) -> std::io::Result<(ExitStatus, String, String, bool)> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);

        let captured = spec.captures_output();
        if captured {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .in_new_process_group();
        } else {
            cmd.stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .with_parent_death_signal();
        }

        let child = cmd.spawn()?;
        let pid = child.id();
        track(pid, true);
        info!(pid, captured, "spawned `{}`", line);

        let waited = child.wait_with_output();
        track(pid, false);
        let output = waited?;

        Ok((
            output.status,
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            captured,
        ))
    }
}

fn track(pid: u32, running: bool) {
    let registry = ChildRegistry::global();
    // A poisoned registry only loses cleanup tracking
    let Ok(mut guard) = registry.lock() else {
        return;
    };
    if running {
        guard.register(pid);
    } else {
        guard.unregister(pid);
    }
}

impl<P: PrivilegeCheck> CommandRunner for SystemRunner<P> {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let line = spec.to_string();

        if self.dry_run && spec.skipped_in_dry_run() {
            info!("dry-run: skipping `{}`", line);
            return Ok(CommandOutput::skipped());
        }

        if spec.elevated && !self.privilege.is_elevated() {
            tracing::error!("refusing `{}`: not running as root", line);
            return Err(CommandError::MissingPrivilege { command: line });
        }

        let (status, stdout, stderr, captured) = match self.spawn_and_wait(spec, &line) {
            Ok(result) => result,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("`{}` not found", spec.program);
                return Err(CommandError::NotFound {
                    program: spec.program.clone(),
                });
            }
            Err(source) => {
                warn!(error = %source, "failed to run `{}`", line);
                return Err(CommandError::Execution {
                    command: line,
                    source,
                });
            }
        };

        let exit_code = status.code();
        if !status.success() {
            warn!(?exit_code, "`{}` exited unsuccessfully", line);
            if spec.check {
                return Err(CommandError::Failed {
                    command: line,
                    exit_code,
                    stderr,
                });
            }
        }

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code,
            success: status.success(),
            captured,
            dry_run: false,
        })
    }
}
