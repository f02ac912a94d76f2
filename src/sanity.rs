//! Pre-flight checks for the runtime environment
//!
//! Run once before the menu starts:
//! - External tools the menu calls are present in PATH
//! - The process runs with root privileges (EUID 0)
//!
//! Neither check is fatal. Missing tools and a missing root are reported and the
//! menu starts anyway; individual operations fail later if they really need them.

use crate::console::Console;
use crate::privilege::PrivilegeCheck;
use crate::process_guard::CommandProcessGroup;
use std::io::{self, BufRead, Write};
use std::process::Command;

/// Result of environment verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    pub missing_tools: Vec<String>,
    pub elevated: bool,
}

impl StartupReport {
    /// Returns true if all checks passed
    pub fn is_ok(&self) -> bool {
        self.missing_tools.is_empty() && self.elevated
    }
}

/// Tools invoked by menu operations
pub const REQUIRED_TOOLS: &[&str] = &[
    "lsblk",     // Device listing (util-linux)
    "dd",        // Wipe, imaging, benchmark (coreutils)
    "cp",
    "rm",
    "mkdir",
    "df",
    "du",
    "mount",
    "umount",
    "fdisk",     // Partition editing (util-linux)
    "parted",
    "mkfs.fat",  // dosfstools
    "mkfs.ntfs", // ntfs-3g
    "mkfs.ext4", // e2fsprogs
    "smartctl",  // smartmontools
];

/// Check if a binary is available in PATH
fn binary_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .in_new_process_group()
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Check tools and privilege.
pub fn inspect_host(privilege: &dyn PrivilegeCheck) -> StartupReport {
    let missing_tools: Vec<String> = REQUIRED_TOOLS
        .iter()
        .filter(|tool| !binary_exists(tool))
        .map(|tool| (*tool).to_string())
        .collect();

    for tool in &missing_tools {
        tracing::debug!(tool = %tool, "required tool not found in PATH");
    }

    StartupReport {
        missing_tools,
        elevated: privilege.is_elevated(),
    }
}

/// Print warnings for a failed check. Without root, wait for Enter before the menu.
pub fn print_startup_warnings<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    report: &StartupReport,
) -> io::Result<()> {
    if !report.missing_tools.is_empty() {
        console.say("Warning: Some required tools were not found in PATH:")?;
        for tool in &report.missing_tools {
            console.say(format!("  - {} (package: {})", tool, package_for_tool(tool)))?;
        }
        console.say("Operations that use them will fail until they are installed.")?;
    }

    if !report.elevated {
        console.say("Warning: Most operations require root privileges.")?;
        console.say("It is highly recommended to run this tool with 'sudo':")?;
        console.say(format!("  sudo {}", env!("CARGO_PKG_NAME")))?;
        console.say("Continuing without sudo might limit functionality.")?;
        console.ask("Press Enter to continue or Ctrl+C to exit and restart with sudo...")?;
    }
    Ok(())
}

/// Map tool names to the distribution package that ships them
pub fn package_for_tool(tool: &str) -> &'static str {
    match tool {
        "lsblk" | "fdisk" | "mount" | "umount" => "util-linux",
        "dd" | "cp" | "rm" | "mkdir" | "df" | "du" => "coreutils",
        "parted" => "parted",
        "mkfs.fat" => "dosfstools",
        "mkfs.ntfs" => "ntfs-3g",
        "mkfs.ext4" => "e2fsprogs",
        "smartctl" => "smartmontools",
        _ => "unknown",
    }
}
