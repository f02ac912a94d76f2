//! dd write/read throughput benchmark.

use super::Session;
use crate::error::Result;
use crate::runner::{CommandSpec, PROGRESS_FLAG};
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

const MIB: f64 = 1024.0 * 1024.0;

/// Throughput in MiB/s; `None` when no time was measured.
pub fn throughput_mib_per_sec(bytes: u64, elapsed: Duration) -> Option<f64> {
    let seconds = elapsed.as_secs_f64();
    if seconds <= 0.0 {
        return None;
    }
    Some(bytes as f64 / MIB / seconds)
}

impl<R: BufRead, W: Write> Session<'_, R, W> {
    /// Menu 15: write phase against the scratch file, then read phase from the device.
    pub fn benchmark(&mut self) -> Result<()> {
        self.say("\n--- Disk Benchmarking (Read/Write Speed) ---")?;
        self.list_storage_devices()?;
        let Some(device) = self.ask_device("device")? else {
            return Ok(());
        };
        let device = device.display().to_string();
        let bench = &self.config().benchmark;
        let scratch = bench.scratch_file.display().to_string();
        let count = format!("count={}", bench.block_count);
        let block = format!("bs={}", bench.dd_block_size());

        self.say(format!(
            "\nBenchmarking '{}' with a {}MB test size...",
            device,
            bench.total_mib()
        ))?;

        if !self.confirm_danger(&format!(
            "start Write Speed Test to '{}' (temporary file on your system disk)",
            scratch
        ))? {
            return Ok(());
        }
        self.say("\n--- Starting Write Speed Test ---")?;
        self.say(format!(
            "Writing {}MB to {} on {}...",
            bench.total_mib(),
            scratch,
            device
        ))?;
        let write = CommandSpec::new("dd")
            .args([
                "if=/dev/zero".to_string(),
                format!("of={}", scratch),
                block.clone(),
                count.clone(),
                "conv=fdatasync".to_string(),
                PROGRESS_FLAG.to_string(),
            ])
            .unprivileged()
            .writes_files()
            .unchecked();
        self.timed_phase("Write", write, bench.total_bytes())?;

        if self.paths().exists(&bench.scratch_file) {
            let removal = self.execute(
                CommandSpec::new("rm")
                    .args(["-f", scratch.as_str()])
                    .unprivileged()
                    .writes_files(),
            )?;
            if removal.is_some_and(|out| out.success && !out.dry_run) {
                self.say(format!("Removed temporary file: {}", scratch))?;
            }
        }

        if !self.confirm_danger(&format!("start Read Speed Test from '{}'", device))? {
            return Ok(());
        }
        self.say("\n--- Starting Read Speed Test ---")?;
        self.say(format!("Reading {}MB from {}...", bench.total_mib(), device))?;
        let read = CommandSpec::new("dd")
            .args([
                format!("if={}", device),
                "of=/dev/null".to_string(),
                block,
                count,
                PROGRESS_FLAG.to_string(),
            ])
            .unchecked();
        if !self.timed_phase("Read", read, bench.total_bytes())? {
            self.say("Note: Read test might fail if the device is not readable or already mounted.")?;
        }

        self.say("\nBenchmarking complete.")?;
        Ok(())
    }

    /// Run one dd phase under a wall clock and print its speed.
    ///
    /// A phase skipped by dry-run reports no speed and counts as completed.
    fn timed_phase(&mut self, label: &str, spec: CommandSpec, bytes: u64) -> Result<bool> {
        let started = Instant::now();
        let output = self.execute(spec)?;
        let elapsed = started.elapsed();

        let Some(output) = output.filter(|out| out.success) else {
            self.say(format!("{} test failed.", label))?;
            return Ok(false);
        };
        if output.dry_run {
            self.say(format!("{} test skipped (dry-run), no speed measured.", label))?;
            return Ok(true);
        }
        self.say(format!(
            "{} test completed in {:.2} seconds.",
            label,
            elapsed.as_secs_f64()
        ))?;
        match throughput_mib_per_sec(bytes, elapsed) {
            Some(speed) => self.say(format!("Average {} Speed: {:.2} MB/s", label, speed))?,
            None => self.say(format!("Average {} Speed: not measurable", label))?,
        }
        Ok(true)
    }
}
