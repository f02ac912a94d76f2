//! disktool library
//!
//! Menu-driven storage management: every operation gathers input, confirms anything
//! irreversible and then runs a standard Linux utility through a `CommandRunner`.

pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod fake;
pub mod menu;
pub mod ops;
pub mod paths;
pub mod privilege;
pub mod process_guard;
pub mod prompt;
pub mod runner;
pub mod sanity;
pub mod types;

// Re-export main types for convenience
pub use config::{BenchmarkConfig, ToolConfig};
pub use console::Console;
pub use error::{CommandError, DiskToolError};
pub use menu::{Flow, dispatch, run_menu};
pub use ops::{Session, throughput_mib_per_sec};
pub use paths::{HostPaths, PathProbe};
pub use privilege::{EffectiveUid, FixedPrivilege, PrivilegeCheck};
pub use process_guard::{ChildRegistry, CommandProcessGroup};
pub use prompt::Confirmation;
pub use runner::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
pub use types::{FilesystemKind, MenuAction};
