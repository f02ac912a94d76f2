//! Tool configuration
//!
//! Loaded from an optional JSON file given with `--config`. Every field has a
//! default, so an empty object `{}` is a valid configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Size units dd accepts after a block count
const DD_SIZE_SUFFIXES: &[&str] = &["", "c", "w", "b", "K", "kB", "M", "MB", "G", "GB"];

const MIB: u64 = 1024 * 1024;

/// Runtime settings for the disk operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// `bs=` used by wipe, backup, restore and bootable-USB copies
    pub copy_block_size: String,
    pub benchmark: BenchmarkConfig,
}

/// Benchmark payload settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchmarkConfig {
    /// Temporary file written during the write test
    pub scratch_file: PathBuf,
    pub block_size_mib: u64,
    pub block_count: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            copy_block_size: "4M".to_string(),
            benchmark: BenchmarkConfig::default(),
        }
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            scratch_file: PathBuf::from("/tmp/disk_test_file.bin"),
            block_size_mib: 1,
            block_count: 1024,
        }
    }
}

impl BenchmarkConfig {
    /// Bytes moved by each benchmark phase
    pub fn total_bytes(&self) -> u64 {
        self.block_size_mib
            .saturating_mul(self.block_count)
            .saturating_mul(MIB)
    }

    /// Payload size in MiB, for messages
    pub fn total_mib(&self) -> u64 {
        self.block_size_mib.saturating_mul(self.block_count)
    }

    /// dd `bs=` value
    pub fn dd_block_size(&self) -> String {
        format!("{}M", self.block_size_mib)
    }
}

impl ToolConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !is_dd_size(&self.copy_block_size) {
            anyhow::bail!(
                "copy_block_size '{}' is not a dd block size (e.g. 512, 64K, 4M)",
                self.copy_block_size
            );
        }

        let bench = &self.benchmark;
        if bench.block_size_mib == 0 {
            anyhow::bail!("benchmark.block_size_mib must be positive");
        }
        if bench.block_count == 0 {
            anyhow::bail!("benchmark.block_count must be positive");
        }
        let payload = bench
            .block_size_mib
            .checked_mul(bench.block_count)
            .and_then(|mib| mib.checked_mul(MIB));
        if payload.is_none() {
            anyhow::bail!("benchmark payload is too large");
        }
        if bench.scratch_file.as_os_str().is_empty() {
            anyhow::bail!("benchmark.scratch_file must be specified");
        }
        if bench.scratch_file.starts_with("/dev") {
            anyhow::bail!(
                "benchmark.scratch_file {:?} must be a regular file path, not a device",
                bench.scratch_file
            );
        }

        Ok(())
    }
}

/// Positive integer followed by one of dd's unit suffixes
fn is_dd_size(value: &str) -> bool {
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, suffix) = value.split_at(split);

    let positive = digits.parse::<u64>().map(|n| n > 0).unwrap_or(false);
    positive && DD_SIZE_SUFFIXES.contains(&suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ToolConfig::default();
        assert_eq!(config.copy_block_size, "4M");
        assert_eq!(config.benchmark.block_count, 1024);
        assert_eq!(config.benchmark.total_bytes(), 1024 * 1024 * 1024);
        assert_eq!(config.benchmark.dd_block_size(), "1M");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_json_fills_defaults() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, r#"{{ "copy_block_size": "64K" }}"#).expect("write");

        let config = ToolConfig::load_from_file(file.path()).expect("should load");
        assert_eq!(config.copy_block_size, "64K");
        assert_eq!(config.benchmark, BenchmarkConfig::default());
    }

    #[test]
    fn test_load_nested_benchmark() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            r#"{{ "benchmark": {{ "scratch_file": "/var/tmp/bench.bin", "block_count": 256 }} }}"#
        )
        .expect("write");

        let config = ToolConfig::load_from_file(file.path()).expect("should load");
        assert_eq!(config.benchmark.scratch_file, PathBuf::from("/var/tmp/bench.bin"));
        assert_eq!(config.benchmark.block_count, 256);
        assert_eq!(config.benchmark.block_size_mib, 1);
        assert_eq!(config.benchmark.total_mib(), 256);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ToolConfig::load_from_file("/nonexistent/disktool.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, r#"{{ "block_size": "4M" }}"#).expect("write");
        assert!(ToolConfig::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "not json").expect("write");
        assert!(ToolConfig::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_dd_size_validation() {
        for ok in ["512", "64K", "4M", "1MB", "2G", "1c", "8kB"] {
            assert!(is_dd_size(ok), "{ok} should be accepted");
        }
        for bad in ["", "0", "0M", "M", "4 M", "4T", "-1", "4m"] {
            assert!(!is_dd_size(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_validation_zero_benchmark_values() {
        let mut config = ToolConfig::default();
        config.benchmark.block_count = 0;
        assert!(config.validate().is_err());

        let mut config = ToolConfig::default();
        config.benchmark.block_size_mib = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_scratch_file_on_device() {
        let mut config = ToolConfig::default();
        config.benchmark.scratch_file = PathBuf::from("/dev/sdb");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_overflowing_payload() {
        let mut config = ToolConfig::default();
        config.benchmark.block_size_mib = u64::MAX;
        config.benchmark.block_count = 2;
        assert!(config.validate().is_err());
    }
}
