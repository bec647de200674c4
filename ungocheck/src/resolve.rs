//! Package resolution: selectors to directories to gocheck test files.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, trace};

use crate::core::adaptation::Adaptation;
use crate::core::selector::{is_local, split_recursive};
use crate::io::env::GoEnv;
use crate::io::fs::Filesystem;

/// Version-control metadata directories never descended into.
pub const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn", ".bzr"];

/// Turns package selectors into the test files they contain.
pub struct Resolver<'a, F: Filesystem + ?Sized> {
    fs: &'a F,
    env: &'a GoEnv,
    adaptation: &'a Adaptation,
}

impl<'a, F: Filesystem + ?Sized> Resolver<'a, F> {
    pub fn new(fs: &'a F, env: &'a GoEnv, adaptation: &'a Adaptation) -> Self {
        Self {
            fs,
            env,
            adaptation,
        }
    }

    /// Resolve selectors to a sorted, deduplicated list of test files.
    ///
    /// Any filesystem failure or unknown package aborts the whole resolution.
    #[instrument(
        skip_all,
        fields(selectors = ?selectors.iter().map(AsRef::<str>::as_ref).collect::<Vec<_>>())
    )]
    pub fn resolve<S: AsRef<str>>(&self, selectors: &[S]) -> Result<Vec<PathBuf>> {
        let dirs = self.directories(selectors)?;
        debug!(dirs = dirs.len(), "directory set resolved");
        let files = self.test_files(&dirs)?;
        debug!(files = files.len(), "test files resolved");
        Ok(files)
    }

    /// Expand selectors to the set of package directories.
    pub fn directories<S: AsRef<str>>(&self, selectors: &[S]) -> Result<BTreeSet<PathBuf>> {
        let mut dirs = BTreeSet::new();
        for selector in selectors {
            let selector = selector.as_ref();
            let (base, recursive) = split_recursive(selector);
            let seed = self.package_dir(base)?;
            if recursive {
                self.walk(&seed, &mut dirs)
                    .with_context(|| format!("expand {selector}"))?;
            } else {
                dirs.insert(seed);
            }
        }
        Ok(dirs)
    }

    /// Locate the directory of a single (non-recursive) selector.
    ///
    /// Local selectors are joined onto the working directory; import paths
    /// are looked up as `<root>/src/<pkg>` in GOPATH order.
    pub fn package_dir(&self, selector: &str) -> Result<PathBuf> {
        if is_local(selector) {
            let dir = if selector == "." {
                self.env.workdir.clone()
            } else {
                self.env.workdir.join(selector)
            };
            self.require_dir(&dir)?;
            return Ok(dir);
        }
        for root in &self.env.roots {
            let candidate = root.join("src").join(selector);
            match self.fs.stat(&candidate) {
                Ok(info) if info.is_dir() => {
                    trace!(package = selector, dir = %candidate.display(), "package found");
                    return Ok(candidate);
                }
                Ok(_) => continue,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => {
                    return Err(err).with_context(|| format!("stat {}", candidate.display()));
                }
            }
        }
        Err(anyhow!(
            "cannot find package \"{selector}\" in any of: {}",
            self.searched_roots()
        ))
    }

    /// Depth-first traversal over an explicit stack, skipping VCS directories.
    fn walk(&self, seed: &Path, dirs: &mut BTreeSet<PathBuf>) -> Result<()> {
        let mut stack = vec![seed.to_path_buf()];
        while let Some(dir) = stack.pop() {
            let entries = self
                .fs
                .read_dir(&dir)
                .with_context(|| format!("read directory {}", dir.display()))?;
            for entry in entries {
                if !entry.is_dir() {
                    continue;
                }
                if VCS_DIRS.contains(&entry.name.as_str()) {
                    trace!(dir = %dir.join(&entry.name).display(), "skip vcs directory");
                    continue;
                }
                stack.push(dir.join(&entry.name));
            }
            dirs.insert(dir);
        }
        Ok(())
    }

    /// List every directory once and keep the candidate test files.
    fn test_files(&self, dirs: &BTreeSet<PathBuf>) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for dir in dirs {
            let entries = self
                .fs
                .read_dir(dir)
                .with_context(|| format!("read directory {}", dir.display()))?;
            files.extend(
                entries
                    .into_iter()
                    .filter(|entry| entry.is_file() && self.adaptation.is_test_file(&entry.name))
                    .map(|entry| dir.join(entry.name)),
            );
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    fn require_dir(&self, dir: &Path) -> Result<()> {
        let info = self
            .fs
            .stat(dir)
            .with_context(|| format!("stat {}", dir.display()))?;
        if !info.is_dir() {
            return Err(anyhow!("{} is not a directory", dir.display()));
        }
        Ok(())
    }

    fn searched_roots(&self) -> String {
        if self.env.roots.is_empty() {
            return "(no GOPATH roots)".to_string();
        }
        self.env
            .roots
            .iter()
            .map(|root| root.join("src").display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
