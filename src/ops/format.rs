//! mkfs handlers for whole disks and single partitions.

use super::Session;
use crate::error::Result;
use crate::paths::{self, looks_like_partition};
use crate::prompt::CANCEL_KEYWORD;
use crate::runner::CommandSpec;
use crate::types::FilesystemKind;
use std::io::{BufRead, Write};
use std::path::Path;
use strum::IntoEnumIterator;

impl<R: BufRead, W: Write> Session<'_, R, W> {
    /// Menu 4
    pub fn format_disk(&mut self) -> Result<()> {
        self.say("\n--- Format Entire Disk ---")?;
        self.list_storage_devices()?;
        let Some(device) = self.ask_device("device")? else {
            return Ok(());
        };
        let Some(filesystem) = self.ask_filesystem()? else {
            return Ok(());
        };

        let target = device.display().to_string();
        if !self.confirm_danger(&format!(
            "format '{}' (entire disk) with '{}'",
            target, filesystem
        ))? {
            return Ok(());
        }

        // Partitions 1 and 2 first, then the disk; any of them may be unmounted already
        self.say(format!(
            "Attempting to unmount {} and its partitions...",
            target
        ))?;
        self.try_unmount(&paths::partition_path(&device, 1))?;
        self.try_unmount(&paths::partition_path(&device, 2))?;
        self.try_unmount(&device)?;
        self.say("Unmount attempts finished. Proceeding with format...")?;

        self.make_filesystem(&device, filesystem)
    }

    /// Menu 13
    pub fn format_partition(&mut self) -> Result<()> {
        self.say("\n--- Format Partition ---")?;
        self.list_storage_devices()?;
        let Some(device) = self.ask_device("partition")? else {
            return Ok(());
        };
        let target = device.display().to_string();

        if !looks_like_partition(&target) {
            self.say(
                "Warning: The selected path does not look like a partition (e.g., /dev/sdb1). Proceeding anyway, but be careful!",
            )?;
            if !self.confirm_danger(&format!(
                "format what appears to be a FULL DISK, not a partition: {}",
                target
            ))? {
                self.say("Operation cancelled.")?;
                return Ok(());
            }
        }

        let Some(filesystem) = self.ask_filesystem()? else {
            return Ok(());
        };
        if !self.confirm_danger(&format!(
            "format '{}' (partition) with '{}'",
            target, filesystem
        ))? {
            return Ok(());
        }

        self.say(format!("Attempting to unmount {} before format...", target))?;
        self.try_unmount(&device)?;
        self.say("Unmount attempt finished. Proceeding with format...")?;

        self.make_filesystem(&device, filesystem)
    }

    fn ask_filesystem(&mut self) -> Result<Option<FilesystemKind>> {
        self.say("Available Filesystem Types:")?;
        for (number, kind) in FilesystemKind::iter().enumerate() {
            self.say(format!("{}. {}", number + 1, kind.description()))?;
        }
        self.say(format!("Type '{}' to return to main menu.", CANCEL_KEYWORD))?;

        let Some(answer) = self.ask_text("Enter your desired filesystem type (1, 2, or 3): ")?
        else {
            return Ok(None);
        };
        match answer.parse::<FilesystemKind>() {
            Ok(kind) => Ok(Some(kind)),
            Err(_) => {
                self.say("Invalid filesystem choice. Returning to main menu.")?;
                Ok(None)
            }
        }
    }

    fn make_filesystem(&mut self, device: &Path, filesystem: FilesystemKind) -> Result<()> {
        let target = device.display().to_string();
        let (program, flags) = filesystem.mkfs_command();
        let spec = CommandSpec::new(program).args(flags.iter().copied()).arg(&target);

        if self.execute_ok(spec)? {
            self.say(format!(
                "'{}' successfully formatted to {}.",
                target, filesystem
            ))?;
        } else {
            self.say(format!("Formatting failed for '{}'.", target))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ToolConfig;
    use crate::console::Console;
    use crate::fake::{FakePaths, RecordingRunner};
    use crate::ops::Session;
    use std::io::Cursor;

    fn run<F>(input: &str, runner: &RecordingRunner, paths: &FakePaths, handler: F) -> String
    where
        F: FnOnce(&mut Session<'_, Cursor<Vec<u8>>, Vec<u8>>) -> crate::error::Result<()>,
    {
        let config = ToolConfig::default();
        let console = Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let mut session = Session::new(console, runner, paths, &config);
        handler(&mut session).expect("handler");
        String::from_utf8(session.into_console().into_output()).expect("utf8")
    }

    #[test]
    fn test_format_disk_unmounts_partitions_then_disk() {
        let runner = RecordingRunner::new().with_exit_code("umount", 32);
        let paths = FakePaths::new().with_file("/dev/sdb");
        let out = run(
            "/dev/sdb\nyes\n1\nconfirm\n",
            &runner,
            &paths,
            |s| s.format_disk(),
        );

        let lines: Vec<String> = runner
            .command_lines()
            .into_iter()
            .filter(|l| !l.starts_with("lsblk"))
            .collect();
        assert_eq!(
            lines,
            vec![
                "umount /dev/sdb1",
                "umount /dev/sdb2",
                "umount /dev/sdb",
                "mkfs.fat -F 32 /dev/sdb",
            ]
        );
        assert!(out.contains("'/dev/sdb' successfully formatted to fat32."));
    }

    #[test]
    fn test_format_nvme_disk_partition_names() {
        let runner = RecordingRunner::new();
        let paths = FakePaths::new().with_file("/dev/nvme0n1");
        run(
            "/dev/nvme0n1\nyes\n3\nconfirm\n",
            &runner,
            &paths,
            |s| s.format_disk(),
        );
        let umounts: Vec<String> = runner
            .calls_to("umount")
            .iter()
            .map(|c| c.args[0].clone())
            .collect();
        assert_eq!(umounts, vec!["/dev/nvme0n1p1", "/dev/nvme0n1p2", "/dev/nvme0n1"]);
        assert_eq!(runner.calls_to("mkfs.ext4")[0].args, vec!["-F", "/dev/nvme0n1"]);
    }

    #[test]
    fn test_format_invalid_filesystem() {
        let runner = RecordingRunner::new();
        let paths = FakePaths::new().with_file("/dev/sdb");
        let out = run("/dev/sdb\nyes\nzfs\n", &runner, &paths, |s| s.format_disk());
        assert!(out.contains("Invalid filesystem choice."));
        assert!(runner.calls_to("umount").is_empty());
    }

    #[test]
    fn test_format_partition_declined() {
        let runner = RecordingRunner::new();
        let paths = FakePaths::new().with_file("/dev/sdb1");
        let out = run(
            "/dev/sdb1\nyes\n3\nno\n",
            &runner,
            &paths,
            |s| s.format_partition(),
        );
        assert!(out.contains("Action cancelled."));
        assert!(runner.calls_to("mkfs.ext4").is_empty());
        assert!(runner.calls_to("umount").is_empty());
    }

    #[test]
    fn test_format_partition_ntfs() {
        let runner = RecordingRunner::new();
        let paths = FakePaths::new().with_file("/dev/sdc2");
        let out = run(
            "/dev/sdc2\nyes\nNTFS\nconfirm\n",
            &runner,
            &paths,
            |s| s.format_partition(),
        );
        let lines: Vec<String> = runner
            .command_lines()
            .into_iter()
            .filter(|l| !l.starts_with("lsblk"))
            .collect();
        assert_eq!(lines, vec!["umount /dev/sdc2", "mkfs.ntfs -f /dev/sdc2"]);
        assert!(out.contains("successfully formatted to ntfs"));
    }

    #[test]
    fn test_format_partition_full_disk_needs_extra_confirmation() {
        let runner = RecordingRunner::new();
        let paths = FakePaths::new().with_file("/dev/sdb");
        let out = run("/dev/sdb\nyes\nno\n", &runner, &paths, |s| s.format_partition());
        assert!(out.contains("does not look like a partition"));
        assert!(out.contains("Operation cancelled."));
        assert!(!out.contains("Available Filesystem Types"));
    }

    #[test]
    fn test_mkfs_failure_reported() {
        let runner = RecordingRunner::new().with_exit_code("mkfs.ext4", 1);
        let paths = FakePaths::new().with_file("/dev/sdb1");
        let out = run(
            "/dev/sdb1\nyes\n3\nconfirm\n",
            &runner,
            &paths,
            |s| s.format_partition(),
        );
        assert!(out.contains("Formatting failed for '/dev/sdb1'."));
    }
}
