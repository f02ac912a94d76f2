use clap::Parser;
use std::path::PathBuf;

/// disktool - Interactive storage device management for Linux
#[derive(Parser, Debug)]
#[command(name = "disktool")]
#[command(about = "A menu-driven storage management tool wrapping lsblk, dd, mkfs, fdisk, parted and smartctl")]
#[command(version)]
pub struct Cli {
    /// Path to a JSON configuration file (block sizes, benchmark scratch file)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Dry-run mode: show what would be executed without making changes.
    ///
    /// Commands that need root (wipe, format, copy, mount, ...) are skipped
    /// and reported. Read-only commands (lsblk, df, du) still execute so the
    /// menu stays usable.
    #[arg(long)]
    pub dry_run: bool,

    /// Treat the process as root without checking the effective UID.
    ///
    /// For development only; DISKTOOL_SKIP_ROOT_CHECK=1 does the same.
    #[arg(long)]
    pub skip_root_check: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
