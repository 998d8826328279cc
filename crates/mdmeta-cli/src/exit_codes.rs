//! Exit codes for the `mdmeta` binary.
//! These codes are part of the public contract.

pub const OK: i32 = 0;
pub const FAILED: i32 = 1; // Usage-level failure or at least one file failed
pub const CONFIG_ERROR: i32 = 2; // Config or internal error reaching main
