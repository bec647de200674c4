//! Run gocheck suites with plain `go test`.
//!
//! `ungocheck` rewrites every gocheck test file of the requested packages into
//! a shadow `*_ungocheck_test.go` file whose suite methods become standalone,
//! parallel `func TestXxx(t *testing.T)` functions. It then runs `go test`
//! with the adaptation build tag and removes the shadow files afterwards. The
//! architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (naming, selector parsing, line
//!   rewrite rules, error aggregation). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (filesystem, environment, config,
//!   process execution). Isolated behind traits to enable substitutes in tests.
//!
//! Orchestration modules ([`resolve`], [`rewrite`], [`run`]) coordinate core
//! logic with I/O to implement the CLI.
//!
//! The rewrite is line based: a suite test whose signature spans several
//! physical lines is left untouched.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod resolve;
pub mod rewrite;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
