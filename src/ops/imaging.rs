//! Raw block copies with dd: image backup, image restore and ISO writing.

use super::Session;
use crate::error::Result;
use crate::paths::parent_or_current;
use crate::prompt::CANCEL_KEYWORD;
use crate::runner::{CommandSpec, PROGRESS_FLAG};
use std::io::{BufRead, Write};
use std::path::Path;

impl<R: BufRead, W: Write> Session<'_, R, W> {
    /// Menu 10
    pub fn backup_to_image(&mut self) -> Result<()> {
        self.say("\n--- Backup Partition/Disk to Image ---")?;
        self.list_storage_devices()?;
        let Some(source) = self.ask_device("device/partition to backup")? else {
            return Ok(());
        };
        let question = format!(
            "Enter the FULL path for the output image file (e.g., /home/user/my_backup.img) or type '{}' to return: ",
            CANCEL_KEYWORD
        );
        let Some(image) = self.ask_path(&question)? else {
            return Ok(());
        };
        if !self.paths().is_dir(parent_or_current(&image)) {
            self.say("Error: Destination directory does not exist.")?;
            return Ok(());
        }

        let (source, image) = (source.display().to_string(), image.display().to_string());
        if !self.confirm_danger(&format!("backup '{}' to '{}'", source, image))? {
            return Ok(());
        }

        self.say(format!("Attempting to unmount {} before backup...", source))?;
        self.try_unmount(Path::new(&source))?;
        self.say(format!(
            "Creating image from '{}' to '{}'. This may take time...",
            source, image
        ))?;
        if self.execute_ok(self.block_copy(&source, &image))? {
            self.say(format!(
                "Backup of '{}' to '{}' completed successfully.",
                source, image
            ))?;
        } else {
            self.say(format!("Backup failed for '{}'.", source))?;
        }
        Ok(())
    }

    /// Menu 11
    pub fn restore_image(&mut self) -> Result<()> {
        self.say("\n--- Restore Image to Partition/Disk ---")?;
        let question = format!(
            "Enter the FULL path to the image file to restore (e.g., /home/user/my_backup.img) or type '{}' to return: ",
            CANCEL_KEYWORD
        );
        let Some(image) = self.ask_path(&question)? else {
            return Ok(());
        };
        if !self.paths().exists(&image) {
            self.say(format!(
                "Error: Image file '{}' not found.",
                image.display()
            ))?;
            return Ok(());
        }

        self.list_storage_devices()?;
        let Some(device) = self.ask_device("destination device/partition")? else {
            return Ok(());
        };

        let (image, device) = (image.display().to_string(), device.display().to_string());
        if !self.confirm_danger(&format!(
            "RESTORE IMAGE '{}' to '{}'. ALL DATA on {} WILL BE OVERWRITTEN!",
            image, device, device
        ))? {
            return Ok(());
        }

        self.say(format!("Attempting to unmount {} before restore...", device))?;
        self.try_unmount(Path::new(&device))?;
        self.say(format!(
            "Restoring image '{}' to '{}'. This may take time...",
            image, device
        ))?;
        if self.execute_ok(self.block_copy(&image, &device))? {
            self.say(format!(
                "Restore of '{}' to '{}' completed successfully.",
                image, device
            ))?;
        } else {
            self.say(format!("Restore failed for '{}'.", device))?;
        }
        Ok(())
    }

    /// Menu 12
    pub fn create_bootable_usb(&mut self) -> Result<()> {
        self.say("\n--- Create Bootable USB from ISO ---")?;
        let question = format!(
            "Enter the FULL path to the ISO file (e.g., /home/user/ubuntu.iso) or type '{}' to return: ",
            CANCEL_KEYWORD
        );
        let Some(iso) = self.ask_path(&question)? else {
            return Ok(());
        };
        if !self.paths().exists(&iso) || !is_iso_name(&iso) {
            self.say(format!(
                "Error: ISO file '{}' not found or is not an ISO file.",
                iso.display()
            ))?;
            return Ok(());
        }

        self.list_storage_devices()?;
        let Some(device) = self.ask_device("USB device (e.g., /dev/sdb)")? else {
            return Ok(());
        };

        let (iso, device) = (iso.display().to_string(), device.display().to_string());
        if !self.confirm_danger(&format!(
            "CREATE BOOTABLE USB from '{}' to '{}'. ALL DATA on {} WILL BE OVERWRITTEN!",
            iso, device, device
        ))? {
            return Ok(());
        }

        self.say(format!(
            "Attempting to unmount {} before writing ISO...",
            device
        ))?;
        self.try_unmount(Path::new(&device))?;
        self.say(format!(
            "Writing ISO '{}' to '{}'. This may take time...",
            iso, device
        ))?;
        if self.execute_ok(self.block_copy(&iso, &device).arg("oflag=sync"))? {
            self.say(format!(
                "Bootable USB '{}' created successfully from '{}'.",
                device, iso
            ))?;
            self.say("Note: You may need to sync the changes (sudo sync) or remove and re-insert the USB for it to be recognized.")?;
        } else {
            self.say(format!("Failed to create bootable USB on '{}'.", device))?;
        }
        Ok(())
    }

    /// Elevated dd copy with live progress; success is judged by exit code.
    fn block_copy(&self, input: &str, output: &str) -> CommandSpec {
        CommandSpec::new("dd")
            .args([
                format!("if={}", input),
                format!("of={}", output),
                format!("bs={}", self.config().copy_block_size),
                PROGRESS_FLAG.to_string(),
            ])
            .unchecked()
    }
}

fn is_iso_name(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("iso"))
}

#[cfg(test)]
mod tests {
    use super::is_iso_name;
    use crate::config::ToolConfig;
    use crate::console::Console;
    use crate::fake::{FakePaths, RecordingRunner};
    use crate::ops::Session;
    use std::io::Cursor;
    use std::path::Path;

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

    fn without_listing(runner: &RecordingRunner) -> Vec<String> {
        runner
            .command_lines()
            .into_iter()
            .filter(|l| !l.starts_with("lsblk"))
            .collect()
    }

    #[test]
    fn test_iso_extension_any_case() {
        assert!(is_iso_name(Path::new("/home/u/ubuntu.iso")));
        assert!(is_iso_name(Path::new("/home/u/Ubuntu.ISO")));
        assert!(!is_iso_name(Path::new("/home/u/ubuntu.img")));
        assert!(!is_iso_name(Path::new("/home/u/iso")));
    }

    #[test]
    fn test_backup_runs_streamed_dd() {
        let runner = RecordingRunner::new();
        let paths = FakePaths::new()
            .with_file("/dev/sdb1")
            .with_dir("/home/u");
        let out = run(
            "/dev/sdb1\nyes\n/home/u/sdb1.img\nconfirm\n",
            &runner,
            &paths,
            |s| s.backup_to_image(),
        );
        assert_eq!(
            without_listing(&runner),
            vec![
                "umount /dev/sdb1",
                "dd if=/dev/sdb1 of=/home/u/sdb1.img bs=4M status=progress",
            ]
        );
        assert!(!runner.calls_to("dd")[0].captures_output());
        assert!(out.contains("completed successfully"));
    }

    #[test]
    fn test_backup_requires_destination_directory() {
        let runner = RecordingRunner::new();
        let paths = FakePaths::new().with_file("/dev/sdb1");
        let out = run(
            "/dev/sdb1\nyes\n/missing/sdb1.img\n",
            &runner,
            &paths,
            |s| s.backup_to_image(),
        );
        assert!(out.contains("Error: Destination directory does not exist."));
        assert!(runner.calls_to("dd").is_empty());
    }

    #[test]
    fn test_restore_requires_existing_image() {
        let runner = RecordingRunner::new();
        let paths = FakePaths::new();
        let out = run("/home/u/none.img\n", &runner, &paths, |s| s.restore_image());
        assert!(out.contains("Error: Image file '/home/u/none.img' not found."));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_restore_writes_image_to_device() {
        let runner = RecordingRunner::new();
        let paths = FakePaths::new()
            .with_file("/home/u/sdb.img")
            .with_file("/dev/sdc");
        run(
            "/home/u/sdb.img\n/dev/sdc\nyes\nconfirm\n",
            &runner,
            &paths,
            |s| s.restore_image(),
        );
        assert_eq!(
            without_listing(&runner),
            vec![
                "umount /dev/sdc",
                "dd if=/home/u/sdb.img of=/dev/sdc bs=4M status=progress",
            ]
        );
    }

    #[test]
    fn test_bootable_usb_adds_sync_flag() {
        let runner = RecordingRunner::new();
        let paths = FakePaths::new()
            .with_file("/home/u/Arch.ISO")
            .with_file("/dev/sdb");
        let out = run(
            "/home/u/Arch.ISO\n/dev/sdb\nyes\nconfirm\n",
            &runner,
            &paths,
            |s| s.create_bootable_usb(),
        );
        assert_eq!(
            runner.calls_to("dd")[0].to_string(),
            "dd if=/home/u/Arch.ISO of=/dev/sdb bs=4M status=progress oflag=sync"
        );
        assert!(out.contains("sudo sync"));
    }

    #[test]
    fn test_bootable_usb_rejects_non_iso() {
        let runner = RecordingRunner::new();
        let paths = FakePaths::new().with_file("/home/u/disk.img");
        let out = run("/home/u/disk.img\n", &runner, &paths, |s| s.create_bootable_usb());
        assert!(out.contains("not found or is not an ISO file"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_bootable_usb_declined() {
        let runner = RecordingRunner::new();
        let paths = FakePaths::new()
            .with_file("/home/u/a.iso")
            .with_file("/dev/sdb");
        run(
            "/home/u/a.iso\n/dev/sdb\nyes\nback\n",
            &runner,
            &paths,
            |s| s.create_bootable_usb(),
        );
        assert!(runner.calls_to("umount").is_empty());
        assert!(runner.calls_to("dd").is_empty());
    }
}
