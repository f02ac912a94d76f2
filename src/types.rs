//! Typed menu selections.
//!
//! Every number the user can type maps to an enum variant through `strum::EnumString`,
//! so unknown input is rejected in one place instead of falling through string
//! comparisons.

use strum::{EnumIter, EnumString, IntoStaticStr};

/// Main menu entries, keyed by the code typed at the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumString, EnumIter, IntoStaticStr)]
pub enum MenuAction {
    #[strum(serialize = "1")]
    ListDevices,
    #[strum(serialize = "2")]
    CopyData,
    #[strum(serialize = "3")]
    DeleteData,
    #[strum(serialize = "4")]
    FormatDisk,
    #[strum(serialize = "5")]
    ManagePartitions,
    #[strum(serialize = "6")]
    CheckHealth,
    #[strum(serialize = "7")]
    DiskUsage,
    #[strum(serialize = "8")]
    CreateDirectory,
    #[strum(serialize = "9")]
    MountUnmount,
    #[strum(serialize = "10")]
    BackupImage,
    #[strum(serialize = "11")]
    RestoreImage,
    #[strum(serialize = "12")]
    BootableUsb,
    #[strum(serialize = "13")]
    FormatPartition,
    #[strum(serialize = "14")]
    SmartErrors,
    #[strum(serialize = "15")]
    Benchmark,
    #[strum(serialize = "00")]
    About,
    #[strum(serialize = "0")]
    Exit,
}

impl MenuAction {
    /// Code shown in front of the menu line.
    pub fn code(&self) -> &'static str {
        self.into()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ListDevices => "List Storage Devices (lsblk)",
            Self::CopyData => "Copy Data (cp)",
            Self::DeleteData => "Delete Data (rm / dd)",
            Self::FormatDisk => "Format Entire Disk (mkfs)",
            Self::ManagePartitions => "Manage Partitions (fdisk/parted - Advanced!)",
            Self::CheckHealth => "Check Disk Health (S.M.A.R.T. Full Report)",
            Self::DiskUsage => "View Disk Usage (df/du)",
            Self::CreateDirectory => "Create Directory (mkdir)",
            Self::MountUnmount => "Mount/Unmount Device",
            Self::BackupImage => "Backup Partition/Disk to Image (dd)",
            Self::RestoreImage => "Restore Image to Partition/Disk (dd)",
            Self::BootableUsb => "Create Bootable USB from ISO (dd)",
            Self::FormatPartition => "Format Partition Only (mkfs)",
            Self::SmartErrors => "View S.M.A.R.T. Errors Only",
            Self::Benchmark => "Benchmark Disk Read/Write Speed (dd)",
            Self::About => "Tool Info",
            Self::Exit => "Exit",
        }
    }

    /// Entries from 10 on are grouped under an "Advanced Features" heading.
    pub fn is_advanced(&self) -> bool {
        matches!(
            self,
            Self::BackupImage
                | Self::RestoreImage
                | Self::BootableUsb
                | Self::FormatPartition
                | Self::SmartErrors
                | Self::Benchmark
        )
    }
}

/// Filesystems the format handlers can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(strum::Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum FilesystemKind {
    /// Readable by Windows, macOS and Linux
    #[strum(to_string = "fat32", serialize = "1")]
    Fat32,
    #[strum(to_string = "ntfs", serialize = "2")]
    Ntfs,
    #[strum(to_string = "ext4", serialize = "3")]
    Ext4,
}

impl FilesystemKind {
    /// mkfs program and its force/format flags; the device is appended last.
    pub fn mkfs_command(&self) -> (&'static str, &'static [&'static str]) {
        const FAT32_ARGS: &[&str] = &["-F", "32"];
        const NTFS_ARGS: &[&str] = &["-f"];
        const EXT4_ARGS: &[&str] = &["-F"];

        match self {
            Self::Fat32 => ("mkfs.fat", FAT32_ARGS),
            Self::Ntfs => ("mkfs.ntfs", NTFS_ARGS),
            Self::Ext4 => ("mkfs.ext4", EXT4_ARGS),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Fat32 => "FAT32 (Compatible with Windows, macOS, Linux)",
            Self::Ntfs => "NTFS (Primarily Windows, good Linux support)",
            Self::Ext4 => "Ext4 (Linux Native)",
        }
    }
}

/// Delete Data sub-menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum DeleteMode {
    #[strum(serialize = "1")]
    Files,
    #[strum(serialize = "2")]
    WipeDevice,
}

/// Partition management sub-menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum PartitionTool {
    #[strum(serialize = "1")]
    Fdisk,
    #[strum(serialize = "2")]
    Parted,
    #[strum(serialize = "3")]
    List,
}

/// Disk usage sub-menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum UsageView {
    #[strum(serialize = "1")]
    Filesystems,
    #[strum(serialize = "2")]
    PathSize,
}

/// Mount sub-menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
pub enum MountAction {
    #[strum(serialize = "1")]
    Mount,
    #[strum(serialize = "2")]
    Unmount,
}
