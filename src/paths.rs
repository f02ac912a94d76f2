//! Path checks used by the prompts.
//!
//! Existence checks go through `PathProbe` so the menu can be driven in tests with
//! device nodes that do not exist on the test machine.

use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix every block device path must have.
pub const DEVICE_PREFIX: &str = "/dev/";

/// Filesystem queries the prompts depend on.
pub trait PathProbe {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
}

/// Queries the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPaths;

impl PathProbe for HostPaths {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Why a device path was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRejection {
    MissingPrefix,
    DoesNotExist(String),
}

impl fmt::Display for PathRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathRejection::MissingPrefix => {
                write!(f, "Invalid path format. It should start with '{}'.", DEVICE_PREFIX)
            }
            PathRejection::DoesNotExist(path) => write!(
                f,
                "Path '{}' does not seem to exist. Please check 'lsblk' output.",
                path
            ),
        }
    }
}

/// Accepts an existing path under `/dev/`.
pub fn validate_device_path(
    input: &str,
    probe: &dyn PathProbe,
) -> Result<PathBuf, PathRejection> {
    if !input.starts_with(DEVICE_PREFIX) {
        return Err(PathRejection::MissingPrefix);
    }
    let path = PathBuf::from(input);
    if !probe.exists(&path) {
        return Err(PathRejection::DoesNotExist(input.to_string()));
    }
    Ok(path)
}

/// Directory that would contain `path`; an empty parent means the current directory.
pub fn parent_or_current(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Rough guess whether a device path names a partition rather than a whole disk.
///
/// `/dev/sd*` counts when the node name has a digit, `/dev/nvme*` when it has a `p`.
/// Anything else (mmcblk, virtio, loop, device-mapper) is reported as a whole disk.
pub fn looks_like_partition(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    (path.starts_with("/dev/sd") && name.chars().any(|c| c.is_ascii_digit()))
        || (path.starts_with("/dev/nvme") && name.contains('p'))
}

/// Path of partition `number` on `disk`, following kernel naming: a `p` separator is
/// needed when the disk name ends in a digit.
pub fn partition_path(disk: &Path, number: u32) -> PathBuf {
    let disk = disk.to_string_lossy();
    if disk.ends_with(|c: char| c.is_ascii_digit()) {
        PathBuf::from(format!("{}p{}", disk, number))
    } else {
        PathBuf::from(format!("{}{}", disk, number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakePaths;

    #[test]
    fn test_rejects_missing_prefix() {
        let probe = FakePaths::new().with_file("sdb");
        assert_eq!(
            validate_device_path("sdb", &probe),
            Err(PathRejection::MissingPrefix)
        );
        assert_eq!(
            validate_device_path("/tmp/sdb", &probe),
            Err(PathRejection::MissingPrefix)
        );
    }

    #[test]
    fn test_rejects_nonexistent_device() {
        let probe = FakePaths::new();
        assert_eq!(
            validate_device_path("/dev/sdz", &probe),
            Err(PathRejection::DoesNotExist("/dev/sdz".to_string()))
        );
    }

    #[test]
    fn test_accepts_existing_device() {
        let probe = FakePaths::new().with_file("/dev/sdb");
        assert_eq!(
            validate_device_path("/dev/sdb", &probe),
            Ok(PathBuf::from("/dev/sdb"))
        );
    }

    #[test]
    fn test_host_paths_dev_null() {
        assert!(HostPaths.exists(Path::new("/dev/null")));
        assert!(!HostPaths.is_dir(Path::new("/dev/null")));
        assert!(HostPaths.is_dir(Path::new("/dev")));
    }

    #[test]
    fn test_parent_or_current() {
        assert_eq!(parent_or_current(Path::new("backup.img")), Path::new("."));
        assert_eq!(
            parent_or_current(Path::new("/home/me/backup.img")),
            Path::new("/home/me")
        );
        assert_eq!(parent_or_current(Path::new("/")), Path::new("."));
    }

    #[test]
    fn test_looks_like_partition() {
        assert!(looks_like_partition("/dev/sdb1"));
        assert!(looks_like_partition("/dev/nvme0n1p2"));
        assert!(!looks_like_partition("/dev/sdb"));
        assert!(!looks_like_partition("/dev/nvme0n1"));
        // Known misses of the heuristic
        assert!(!looks_like_partition("/dev/mmcblk0p1"));
        assert!(!looks_like_partition("/dev/vda1"));
    }

    #[test]
    fn test_partition_path() {
        assert_eq!(
            partition_path(Path::new("/dev/sdb"), 1),
            PathBuf::from("/dev/sdb1")
        );
        assert_eq!(
            partition_path(Path::new("/dev/nvme0n1"), 2),
            PathBuf::from("/dev/nvme0n1p2")
        );
        assert_eq!(
            partition_path(Path::new("/dev/mmcblk0"), 1),
            PathBuf::from("/dev/mmcblk0p1")
        );
    }
}
