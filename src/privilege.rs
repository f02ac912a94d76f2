//! Elevated-privilege detection.
//!
//! The runner asks a `PrivilegeCheck` before every command that needs root, and the
//! startup warning asks the same one. Tests and `--skip-root-check` swap in a fixed
//! answer instead of reading the effective UID.

/// Answers whether the current process may run root-only commands.
pub trait PrivilegeCheck {
    fn is_elevated(&self) -> bool;
}

/// Production check: the effective UID is 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectiveUid;

impl PrivilegeCheck for EffectiveUid {
    fn is_elevated(&self) -> bool {
        nix::unistd::geteuid().is_root()
    }
}

/// A constant answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPrivilege(pub bool);

impl PrivilegeCheck for FixedPrivilege {
    fn is_elevated(&self) -> bool {
        self.0
    }
}

impl<P: PrivilegeCheck + ?Sized> PrivilegeCheck for &P {
    fn is_elevated(&self) -> bool {
        (**self).is_elevated()
    }
}

impl<P: PrivilegeCheck + ?Sized> PrivilegeCheck for Box<P> {
    fn is_elevated(&self) -> bool {
        (**self).is_elevated()
    }
}

/// Skip the root check (for development/testing)
/// Set DISKTOOL_SKIP_ROOT_CHECK=1 to skip
pub fn should_skip_root_check() -> bool {
    std::env::var("DISKTOOL_SKIP_ROOT_CHECK")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
