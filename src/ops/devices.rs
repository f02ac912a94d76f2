//! Device inspection and partition editing: SMART queries and fdisk/parted.

use super::Session;
use crate::error::Result;
use crate::prompt::CANCEL_KEYWORD;
use crate::runner::CommandSpec;
use crate::types::PartitionTool;
use std::io::{BufRead, Write};

impl<R: BufRead, W: Write> Session<'_, R, W> {
    /// Menu 5: hand the device to an interactive partition editor, or list its table.
    pub fn manage_partitions(&mut self) -> Result<()> {
        self.say("\n--- Partition Management (Advanced) ---")?;
        self.say("Warning: Incorrect partition management can render your device unusable.")?;
        self.list_storage_devices()?;
        let Some(device) = self.ask_device("device")? else {
            return Ok(());
        };
        let target = device.display().to_string();

        self.say("1. Start 'fdisk' interactive mode (for MBR/GPT, common for USBs)")?;
        self.say("2. Start 'parted' interactive mode (more powerful, supports GPT better)")?;
        self.say("3. List partitions (fdisk -l)")?;
        self.say(format!("Type '{}' to return to main menu.", CANCEL_KEYWORD))?;

        let Some(tool) = self.ask_choice::<PartitionTool>("Enter your choice (1, 2, or 3): ")?
        else {
            return Ok(());
        };

        match tool {
            PartitionTool::Fdisk => {
                if self.confirm_danger(&format!("enter 'fdisk' interactive mode for {}", target))? {
                    self.say(format!(
                        "Starting 'fdisk {}'. Type 'm' for help inside fdisk.",
                        target
                    ))?;
                    self.execute(CommandSpec::new("fdisk").arg(&target).attached())?;
                    self.say("Exited fdisk.")?;
                }
            }
            PartitionTool::Parted => {
                if self.confirm_danger(&format!("enter 'parted' interactive mode for {}", target))? {
                    self.say(format!(
                        "Starting 'parted {}'. Type 'help' for help inside parted.",
                        target
                    ))?;
                    self.execute(CommandSpec::new("parted").arg(&target).attached())?;
                    self.say("Exited parted.")?;
                }
            }
            PartitionTool::List => {
                self.say(format!("Listing partitions for {}:", target))?;
                self.execute_and_show(
                    CommandSpec::new("fdisk")
                        .args(["-l", target.as_str()])
                        .unprivileged(),
                )?;
            }
        }
        Ok(())
    }

    /// Menu 6: SMART overall health, with an optional full report.
    pub fn check_disk_health(&mut self) -> Result<()> {
        self.say("\n--- Check Disk Health (S.M.A.R.T.) ---")?;
        self.list_storage_devices()?;
        let Some(device) = self.ask_device("device")? else {
            return Ok(());
        };
        let target = device.display().to_string();

        self.say(format!("Checking S.M.A.R.T. health for {}...", target))?;
        if !self.execute_and_show(CommandSpec::new("smartctl").args(["-H", target.as_str()]))? {
            self.say(
                "Could not retrieve S.M.A.R.T. data. 'smartctl' might not be installed or supported for this device.",
            )?;
            return Ok(());
        }

        if self.ask_yes("Do you want a full S.M.A.R.T. report? (yes/no): ")? {
            self.execute(
                CommandSpec::new("smartctl")
                    .args(["-a", target.as_str()])
                    .attached(),
            )?;
        }
        Ok(())
    }

    /// Menu 14: SMART error log only.
    pub fn view_smart_errors(&mut self) -> Result<()> {
        self.say("\n--- View S.M.A.R.T. Errors ---")?;
        self.list_storage_devices()?;
        let Some(device) = self.ask_device("device")? else {
            return Ok(());
        };
        let target = device.display().to_string();

        self.say(format!("Checking S.M.A.R.T. error log for {}...", target))?;
        if !self.execute_and_show(
            CommandSpec::new("smartctl").args(["-l", "error", target.as_str()]),
        )? {
            self.say(
                "Could not retrieve S.M.A.R.T. error log. 'smartctl' might not be installed or supported for this device.",
            )?;
        }
        Ok(())
    }
}
