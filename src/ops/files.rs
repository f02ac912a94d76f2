//! File-level operations: copy, delete/wipe, usage, mkdir and mount.

use super::Session;
use crate::error::Result;
use crate::prompt::CANCEL_KEYWORD;
use crate::runner::{CommandSpec, PROGRESS_FLAG};
use crate::types::{DeleteMode, MountAction, UsageView};
use std::io::{BufRead, Write};
use std::path::Path;

/// dd stops with ENOSPC once it runs past the last sector of the device.
const WIPE_END_NOTE: &str = "Note: dd exits with 'No space left on device' when it reaches the end of the device. If that is the only error shown above, the wipe completed.";

impl<R: BufRead, W: Write> Session<'_, R, W> {
    /// Menu 2
    pub fn copy_data(&mut self) -> Result<()> {
        self.say("\n--- Copy Data ---")?;
        let Some((source, destination)) = self.ask_source_destination("copy")? else {
            return Ok(());
        };

        if !self.confirm_danger(&format!(
            "copy '{}' to '{}' (existing files at the destination are overwritten)",
            source.display(),
            destination.display()
        ))? {
            return Ok(());
        }

        self.say(format!(
            "Copying '{}' to '{}'...",
            source.display(),
            destination.display()
        ))?;
        let copied = self.execute_and_show(CommandSpec::new("cp").args([
            "-av".to_string(),
            source.display().to_string(),
            destination.display().to_string(),
        ]))?;
        if copied {
            self.say("Data copied successfully.")?;
        } else {
            self.say("Data copy failed.")?;
        }
        Ok(())
    }

    /// Menu 3: remove paths, or zero-fill a whole device.
    pub fn delete_data(&mut self) -> Result<()> {
        self.say("\n--- Delete Data ---")?;
        self.say("1. Delete specific files/directories")?;
        self.say("2. Securely wipe entire device (DANGEROUS & SLOW!)")?;
        self.say(format!("Type '{}' to return to main menu.", CANCEL_KEYWORD))?;

        match self.ask_choice::<DeleteMode>("Enter your choice (1 or 2): ")? {
            None => Ok(()),
            Some(DeleteMode::Files) => self.delete_files(),
            Some(DeleteMode::WipeDevice) => self.wipe_device(),
        }
    }

    fn delete_files(&mut self) -> Result<()> {
        let question = format!(
            "Enter the path of the file or directory to delete or type '{}' to return: ",
            CANCEL_KEYWORD
        );
        let Some(target) = self.ask_path(&question)? else {
            return Ok(());
        };
        let target = target.display().to_string();

        if !self.confirm_danger(&format!("delete '{}'", target))? {
            self.say("Deletion cancelled.")?;
            return Ok(());
        }

        self.say(format!("Deleting '{}'...", target))?;
        if self.execute_ok(CommandSpec::new("rm").args(["-rf", target.as_str()]))? {
            self.say("Data deleted successfully.")?;
        } else {
            self.say("Data deletion failed.")?;
        }
        Ok(())
    }

    fn wipe_device(&mut self) -> Result<()> {
        self.list_storage_devices()?;
        let Some(device) = self.ask_device("device")? else {
            return Ok(());
        };
        let target = device.display().to_string();

        if !self.confirm_danger(&format!(
            "PERMANENTLY WIPE ALL DATA from '{}' (zeros out the entire disk)",
            target
        ))? {
            self.say("Device wipe cancelled.")?;
            return Ok(());
        }

        self.try_unmount(&device)?;
        self.say(format!(
            "Wiping all data from '{}'. This will take a long time for large drives...",
            target
        ))?;
        let wipe = CommandSpec::new("dd")
            .args([
                "if=/dev/zero".to_string(),
                format!("of={}", target),
                format!("bs={}", self.config().copy_block_size),
                PROGRESS_FLAG.to_string(),
            ])
            .unchecked();
        if self.execute_ok(wipe)? {
            self.say(format!("Successfully wiped '{}'.", target))?;
        } else {
            self.say(format!("Failed to wipe '{}'.", target))?;
            self.say(WIPE_END_NOTE)?;
        }
        Ok(())
    }

    /// Menu 7: `df -h` or `du -sh <path>`.
    pub fn view_disk_usage(&mut self) -> Result<()> {
        self.say("\n--- View Disk Usage ---")?;
        self.say("1. View filesystem disk space (df -h)")?;
        self.say("2. View directory/file size (du -sh)")?;
        self.say(format!("Type '{}' to return to main menu.", CANCEL_KEYWORD))?;

        match self.ask_choice::<UsageView>("Enter your choice (1 or 2): ")? {
            None => {}
            Some(UsageView::Filesystems) => {
                self.say("Filesystem Disk Space:")?;
                self.execute_and_show(CommandSpec::new("df").arg("-h").unprivileged())?;
            }
            Some(UsageView::PathSize) => {
                let question = format!(
                    "Enter the path (directory or file) to check size for or type '{}' to return: ",
                    CANCEL_KEYWORD
                );
                let Some(target) = self.ask_path(&question)? else {
                    return Ok(());
                };
                if self.paths().exists(&target) {
                    self.say(format!("Size of '{}':", target.display()))?;
                    self.execute_and_show(
                        CommandSpec::new("du")
                            .args(["-sh".to_string(), target.display().to_string()])
                            .unprivileged(),
                    )?;
                } else {
                    self.say(format!("Path '{}' does not exist.", target.display()))?;
                }
            }
        }
        Ok(())
    }

    /// Menu 8
    pub fn create_directory(&mut self) -> Result<()> {
        self.say("\n--- Create Directory ---")?;
        let question = format!(
            "Enter the full path for the new directory or type '{}' to return: ",
            CANCEL_KEYWORD
        );
        let Some(directory) = self.ask_path(&question)? else {
            return Ok(());
        };
        if self.paths().exists(&directory) {
            self.say(format!("Directory '{}' already exists.", directory.display()))?;
            return Ok(());
        }

        if !self.confirm_danger(&format!("create directory '{}'", directory.display()))? {
            return Ok(());
        }
        if self.make_directory(&directory)? {
            self.say(format!(
                "Directory '{}' created successfully.",
                directory.display()
            ))?;
        } else {
            self.say(format!(
                "Failed to create directory '{}'.",
                directory.display()
            ))?;
        }
        Ok(())
    }

    /// Menu 9
    pub fn mount_unmount(&mut self) -> Result<()> {
        self.say("\n--- Mount/Unmount Device ---")?;
        self.say("1. Mount a partition")?;
        self.say("2. Unmount a partition/device")?;
        self.say(format!("Type '{}' to return to main menu.", CANCEL_KEYWORD))?;

        match self.ask_choice::<MountAction>("Enter your choice (1 or 2): ")? {
            None => Ok(()),
            Some(MountAction::Mount) => self.mount_partition(),
            Some(MountAction::Unmount) => self.unmount_target(),
        }
    }

    fn mount_partition(&mut self) -> Result<()> {
        self.list_storage_devices()?;
        let Some(partition) = self.ask_device("partition")? else {
            return Ok(());
        };
        let question = format!(
            "Enter the mount point directory (e.g., /mnt/myusb, will be created if needed) or type '{}' to return: ",
            CANCEL_KEYWORD
        );
        let Some(mount_point) = self.ask_path(&question)? else {
            return Ok(());
        };

        if !self.paths().exists(&mount_point) {
            self.say(format!(
                "Mount point '{}' does not exist. Creating it...",
                mount_point.display()
            ))?;
            if !self.confirm_danger(&format!(
                "create mount point directory '{}'",
                mount_point.display()
            ))? {
                return Ok(());
            }
            if !self.make_directory(&mount_point)? {
                self.say("Mount failed.")?;
                return Ok(());
            }
        }

        let (partition, mount_point) = (
            partition.display().to_string(),
            mount_point.display().to_string(),
        );
        if !self.confirm_danger(&format!("mount '{}' to '{}'", partition, mount_point))? {
            return Ok(());
        }
        if self.execute_ok(CommandSpec::new("mount").args([&partition, &mount_point]))? {
            self.say(format!(
                "Successfully mounted '{}' to '{}'.",
                partition, mount_point
            ))?;
        } else {
            self.say("Mount failed.")?;
        }
        Ok(())
    }

    fn unmount_target(&mut self) -> Result<()> {
        let question = format!(
            "Enter the device/partition path OR mount point to unmount or type '{}' to return: ",
            CANCEL_KEYWORD
        );
        let Some(target) = self.ask_path(&question)? else {
            return Ok(());
        };
        let target = target.display().to_string();

        if !self.confirm_danger(&format!("unmount '{}'", target))? {
            return Ok(());
        }
        if self.execute_ok(CommandSpec::new("umount").arg(&target))? {
            self.say(format!("Successfully unmounted '{}'.", target))?;
        } else {
            self.say("Unmount failed.")?;
        }
        Ok(())
    }

    fn make_directory(&mut self, directory: &Path) -> Result<bool> {
        self.execute_ok(
            CommandSpec::new("mkdir").args(["-p".to_string(), directory.display().to_string()]),
        )
    }
}
