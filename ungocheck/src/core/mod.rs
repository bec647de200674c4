//! Deterministic, pure logic shared by the adapter.
//!
//! Core modules must be free of I/O side effects. They operate on strings and
//! paths and return deterministic outputs suitable for tests.

pub mod adaptation;
pub mod decl;
pub mod errors;
pub mod selector;
pub mod transform;
