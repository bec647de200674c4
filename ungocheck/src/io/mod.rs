//! I/O adapters for the resolver, the rewrite engine and the runner.

pub mod config;
pub mod env;
pub mod fs;
pub mod go;
pub mod process;
