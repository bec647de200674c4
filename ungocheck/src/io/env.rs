//! Process environment the resolver depends on.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// Working directory plus the GOPATH roots searched for import paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoEnv {
    pub workdir: PathBuf,
    pub roots: Vec<PathBuf>,
}

impl GoEnv {
    pub fn new(workdir: impl Into<PathBuf>, roots: Vec<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            roots,
        }
    }

    /// Read the current directory and `GOPATH` from the process.
    pub fn from_process() -> Result<Self> {
        let workdir = env::current_dir().context("read working directory")?;
        let home = env::var_os("HOME").map(PathBuf::from);
        let roots = gopath_roots(env::var_os("GOPATH").as_deref(), home.as_deref());
        debug!(workdir = %workdir.display(), roots = ?roots, "go environment");
        Ok(Self { workdir, roots })
    }
}

/// Split a `GOPATH` value into roots.
///
/// An unset or empty value falls back to `$HOME/go`, as `go` itself does.
pub fn gopath_roots(gopath: Option<&OsStr>, home: Option<&Path>) -> Vec<PathBuf> {
    let roots: Vec<PathBuf> = gopath
        .map(|value| {
            env::split_paths(value)
                .filter(|root| !root.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default();
    if !roots.is_empty() {
        return roots;
    }
    home.map(|home| vec![home.join("go")]).unwrap_or_default()
}
