//! Main menu loop and dispatch.

use crate::error::Result;
use crate::ops::Session;
use crate::types::MenuAction;
use std::io::{BufRead, Write};
use strum::IntoEnumIterator;

const TITLE: &str = "\n--- Storage Device Management Tool (Linux CLI) ---";
const SEPARATOR: &str = "-------------------------------------------------";
const CHOICE_PROMPT: &str = "Enter your choice (0-15, 00 for info): ";

/// Notice for an unknown main menu code.
pub const UNKNOWN_CHOICE: &str = "Invalid choice. Please pick an option from the menu.";
pub const GOODBYE: &str = "Exiting tool. Goodbye!";

/// What the loop does after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Show the menu until the user exits or input ends.
///
/// Only terminal I/O failures and a missing privilege end the loop with an error.
pub fn run_menu<R: BufRead, W: Write>(session: &mut Session<'_, R, W>) -> Result<()> {
    loop {
        print_menu(session)?;
        let Some(answer) = session.console_mut().ask(CHOICE_PROMPT)? else {
            session.say(GOODBYE)?;
            return Ok(());
        };

        let Ok(action) = answer.parse::<MenuAction>() else {
            tracing::debug!(input = %answer, "unrecognised menu choice");
            session.say(UNKNOWN_CHOICE)?;
            continue;
        };

        if dispatch(session, action)? == Flow::Exit {
            return Ok(());
        }
    }
}

/// Run the handler for one menu entry.
pub fn dispatch<R: BufRead, W: Write>(
    session: &mut Session<'_, R, W>,
    action: MenuAction,
) -> Result<Flow> {
    tracing::debug!(?action, "menu selection");
    match action {
        MenuAction::ListDevices => session.list_storage_devices()?,
        MenuAction::CopyData => session.copy_data()?,
        MenuAction::DeleteData => session.delete_data()?,
        MenuAction::FormatDisk => session.format_disk()?,
        MenuAction::ManagePartitions => session.manage_partitions()?,
        MenuAction::CheckHealth => session.check_disk_health()?,
        MenuAction::DiskUsage => session.view_disk_usage()?,
        MenuAction::CreateDirectory => session.create_directory()?,
        MenuAction::MountUnmount => session.mount_unmount()?,
        MenuAction::BackupImage => session.backup_to_image()?,
        MenuAction::RestoreImage => session.restore_image()?,
        MenuAction::BootableUsb => session.create_bootable_usb()?,
        MenuAction::FormatPartition => session.format_partition()?,
        MenuAction::SmartErrors => session.view_smart_errors()?,
        MenuAction::Benchmark => session.benchmark()?,
        MenuAction::About => session.show_tool_info()?,
        MenuAction::Exit => {
            session.say(GOODBYE)?;
            return Ok(Flow::Exit);
        }
    }
    Ok(Flow::Continue)
}

fn print_menu<R: BufRead, W: Write>(session: &mut Session<'_, R, W>) -> Result<()> {
    session.say(TITLE)?;
    let mut in_advanced = false;
    for action in MenuAction::iter() {
        if action.is_advanced() && !in_advanced {
            session.say(SEPARATOR)?;
            session.say("--- Advanced Features ---")?;
            in_advanced = true;
        } else if !action.is_advanced() && in_advanced {
            session.say(SEPARATOR)?;
            in_advanced = false;
        }
        session.say(format!("{}. {}", action.code(), action.label()))?;
    }
    session.say(SEPARATOR)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolConfig;
    use crate::console::Console;
    use crate::fake::{FakePaths, RecordingRunner};
    use std::io::Cursor;

    fn run(input: &str, runner: &RecordingRunner) -> String {
        let config = ToolConfig::default();
        let paths = FakePaths::new();
        let console = Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let mut session = Session::new(console, runner, &paths, &config);
        run_menu(&mut session).expect("menu");
        String::from_utf8(session.into_console().into_output()).expect("utf8")
    }

    #[test]
    fn test_menu_lists_every_entry() {
        let out = run("0\n", &RecordingRunner::new());
        assert!(out.contains("1. List Storage Devices (lsblk)"));
        assert!(out.contains("--- Advanced Features ---"));
        assert!(out.contains("15. Benchmark Disk Read/Write Speed (dd)"));
        assert!(out.contains("00. Tool Info"));
        assert!(out.contains("0. Exit"));
        assert!(out.ends_with(&format!("{}\n", GOODBYE)));
    }

    #[test]
    fn test_advanced_heading_before_entry_ten() {
        let out = run("0\n", &RecordingRunner::new());
        let heading = out.find("--- Advanced Features ---").unwrap();
        assert!(heading < out.find("10. Backup").unwrap());
        assert!(heading > out.find("9. Mount/Unmount Device").unwrap());
    }

    #[test]
    fn test_unknown_choice_redisplays_menu() {
        let runner = RecordingRunner::new();
        let out = run("42\n\n0\n", &runner);
        assert_eq!(out.matches(UNKNOWN_CHOICE).count(), 2);
        assert_eq!(out.matches(CHOICE_PROMPT).count(), 3);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_eof_exits_cleanly() {
        let out = run("", &RecordingRunner::new());
        assert!(out.contains(GOODBYE));
    }

    #[test]
    fn test_list_then_about_then_exit() {
        let runner = RecordingRunner::new();
        let out = run("1\n00\n0\n", &runner);
        assert_eq!(runner.command_lines(), vec!["lsblk -o NAME,SIZE,TYPE,MOUNTPOINT"]);
        assert!(out.contains("--- Tool Information ---"));
    }

    #[test]
    fn test_dispatch_exit() {
        let runner = RecordingRunner::new();
        let config = ToolConfig::default();
        let paths = FakePaths::new();
        let console = Console::new(Cursor::new(Vec::new()), Vec::new());
        let mut session = Session::new(console, &runner, &paths, &config);
        assert_eq!(dispatch(&mut session, MenuAction::Exit).unwrap(), Flow::Exit);
        assert_eq!(
            dispatch(&mut session, MenuAction::About).unwrap(),
            Flow::Continue
        );
    }
}
