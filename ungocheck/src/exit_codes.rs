//! Stable exit codes for the `ungocheck` CLI.

/// Every test passed and all shadow files were removed.
pub const OK: i32 = 0;
/// Resolution, rewriting, `go test` or cleanup failed.
pub const FAILED: i32 = 1;
