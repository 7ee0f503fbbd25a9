//! Process exit codes for the `charity-grants` binary.

/// Report written, or help/version printed.
pub const OK: i32 = 0;
/// Any fatal error: bad flags, unreadable inputs, malformed CSV, write failure.
pub const FAILURE: i32 = 1;
