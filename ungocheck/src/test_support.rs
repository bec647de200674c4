//! Test-only helpers: an in-memory filesystem, a scripted test runner and a
//! temporary Go source tree.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::io::fs::{FileInfo, FileKind, Filesystem};
use crate::io::go::{RunOutput, TestRunner};

/// Filesystem operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FsOp {
    Open,
    Create,
    Write,
    Remove,
    Stat,
    ReadDir,
}

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
}

/// In-memory [`Filesystem`] with per-path failure injection.
#[derive(Debug, Default)]
pub struct MemFilesystem {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    failures: RefCell<BTreeSet<(FsOp, PathBuf)>>,
    read_dirs: RefCell<Vec<PathBuf>>,
}

impl MemFilesystem {
    pub fn new() -> Self {
        let fs = Self::default();
        fs.add_dir("/");
        fs
    }

    /// Add a file, creating missing parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: &str) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), Node::File(contents.as_bytes().to_vec()));
    }

    /// Add a directory and all of its ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut nodes = self.nodes.borrow_mut();
        for dir in path.as_ref().ancestors() {
            if dir.as_os_str().is_empty() {
                continue;
            }
            nodes.entry(dir.to_path_buf()).or_insert(Node::Dir);
        }
    }

    /// Make every `op` on `path` fail with `PermissionDenied`.
    pub fn fail_on(&self, op: FsOp, path: impl AsRef<Path>) {
        self.failures
            .borrow_mut()
            .insert((op, path.as_ref().to_path_buf()));
    }

    /// Contents of a file, if it exists.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        match self.nodes.borrow().get(path.as_ref()) {
            Some(Node::File(bytes)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.nodes.borrow().contains_key(path.as_ref())
    }

    /// Sorted paths of files whose name ends with `suffix`.
    pub fn paths_with_suffix(&self, suffix: &str) -> Vec<PathBuf> {
        self.nodes
            .borrow()
            .iter()
            .filter(|(path, node)| {
                matches!(node, Node::File(_)) && path.to_string_lossy().ends_with(suffix)
            })
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Directories listed so far, in call order.
    pub fn read_dir_log(&self) -> Vec<PathBuf> {
        self.read_dirs.borrow().clone()
    }

    fn check(&self, op: FsOp, path: &Path) -> io::Result<()> {
        if self.failures.borrow().contains(&(op, path.to_path_buf())) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("injected {op:?} failure"),
            ));
        }
        Ok(())
    }

    fn append(&self, path: &Path, buf: &[u8]) -> io::Result<()> {
        self.check(FsOp::Write, path)?;
        let mut nodes = self.nodes.borrow_mut();
        match nodes.get_mut(path) {
            Some(Node::File(bytes)) => {
                bytes.extend_from_slice(buf);
                Ok(())
            }
            _ => Err(not_found(path)),
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file or directory", path.display()),
    )
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string())
}

struct MemWriter<'a> {
    fs: &'a MemFilesystem,
    path: PathBuf,
}

impl Write for MemWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.fs.append(&self.path, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Filesystem for MemFilesystem {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        self.check(FsOp::Open, path)?;
        match self.nodes.borrow().get(path) {
            Some(Node::File(bytes)) => Ok(Box::new(Cursor::new(bytes.clone()))),
            Some(Node::Dir) => Err(io::Error::other(format!(
                "{}: is a directory",
                path.display()
            ))),
            None => Err(not_found(path)),
        }
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
        self.check(FsOp::Create, path)?;
        let parent_is_dir = path
            .parent()
            .is_some_and(|parent| matches!(self.nodes.borrow().get(parent), Some(Node::Dir)));
        if !parent_is_dir {
            return Err(not_found(path));
        }
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), Node::File(Vec::new()));
        Ok(Box::new(MemWriter {
            fs: self,
            path: path.to_path_buf(),
        }))
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.check(FsOp::Remove, path)?;
        let mut nodes = self.nodes.borrow_mut();
        let is_file = match nodes.get(path) {
            Some(Node::File(_)) => true,
            Some(Node::Dir) => false,
            None => return Err(not_found(path)),
        };
        if !is_file {
            return Err(io::Error::other(format!(
                "{}: is a directory",
                path.display()
            )));
        }
        nodes.remove(path);
        Ok(())
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        self.check(FsOp::Stat, path)?;
        let kind = match self.nodes.borrow().get(path) {
            Some(Node::File(_)) => FileKind::File,
            Some(Node::Dir) => FileKind::Dir,
            None => return Err(not_found(path)),
        };
        Ok(FileInfo {
            name: name_of(path),
            kind,
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<FileInfo>> {
        self.check(FsOp::ReadDir, path)?;
        let nodes = self.nodes.borrow();
        match nodes.get(path) {
            Some(Node::Dir) => {}
            Some(Node::File(_)) => {
                return Err(io::Error::other(format!(
                    "{}: not a directory",
                    path.display()
                )));
            }
            None => return Err(not_found(path)),
        }
        self.read_dirs.borrow_mut().push(path.to_path_buf());
        Ok(nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(path) && child.as_path() != path)
            .map(|(child, node)| FileInfo {
                name: name_of(child),
                kind: match node {
                    Node::File(_) => FileKind::File,
                    Node::Dir => FileKind::Dir,
                },
            })
            .collect())
    }
}

/// [`TestRunner`] returning a fixed result and recording its invocations.
pub struct ScriptedRunner<'a> {
    output: String,
    success: bool,
    spawn_error: Option<String>,
    probe: Option<Box<dyn Fn() -> String + 'a>>,
    calls: RefCell<Vec<Vec<String>>>,
}

impl<'a> ScriptedRunner<'a> {
    /// Runner that exits with `success` after printing `output`.
    pub fn new(output: &str, success: bool) -> Self {
        Self {
            output: output.to_string(),
            success,
            spawn_error: None,
            probe: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Runner whose command cannot be started.
    pub fn spawn_error(message: &str) -> Self {
        Self {
            spawn_error: Some(message.to_string()),
            ..Self::new("", false)
        }
    }

    /// Append the probe's result to the output at run time.
    pub fn with_probe(mut self, probe: impl Fn() -> String + 'a) -> Self {
        self.probe = Some(Box::new(probe));
        self
    }

    /// Argument lists of every invocation.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }
}

impl TestRunner for ScriptedRunner<'_> {
    fn run(&self, args: &[String]) -> Result<RunOutput> {
        self.calls.borrow_mut().push(args.to_vec());
        if let Some(message) = &self.spawn_error {
            return Err(anyhow!("{message}"));
        }
        let mut output = self.output.clone();
        if let Some(probe) = &self.probe {
            output.push_str(&probe());
        }
        Ok(RunOutput {
            output: output.into_bytes(),
            code: Some(if self.success { 0 } else { 1 }),
            success: self.success,
        })
    }
}

/// Temporary directory holding a Go source tree.
pub struct GoTree {
    dir: TempDir,
}

impl GoTree {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir().context("create temp dir")?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Sorted paths of every file under the tree whose name ends with `suffix`.
    pub fn files_with_suffix(&self, suffix: &str) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let mut stack = vec![self.dir.path().to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(&dir).with_context(|| format!("read {}", dir.display()))? {
                let entry = entry?;
                let path = entry.path();
                if entry.file_type()?.is_dir() {
                    stack.push(path);
                } else if entry.file_name().to_string_lossy().ends_with(suffix) {
                    found.push(path);
                }
            }
        }
        found.sort();
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_filesystem_lists_immediate_children() {
        let fs = MemFilesystem::new();
        fs.add_file("/a/b/c.go", "x");
        fs.add_file("/a/d.go", "y");
        let mut names: Vec<String> = fs
            .read_dir(Path::new("/a"))
            .expect("read_dir")
            .into_iter()
            .map(|info| info.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["b", "d.go"]);
    }

    #[test]
    fn mem_writer_appends_to_created_file() {
        let fs = MemFilesystem::new();
        fs.add_dir("/a");
        {
            let mut w = fs.create(Path::new("/a/x")).expect("create");
            w.write_all(b"one ").expect("write");
            w.write_all(b"two").expect("write");
        }
        assert_eq!(fs.contents("/a/x").as_deref(), Some("one two"));
    }

    #[test]
    fn injected_failures_are_not_not_found() {
        let fs = MemFilesystem::new();
        fs.add_file("/a/x", "");
        fs.fail_on(FsOp::Remove, "/a/x");
        let err = fs.remove(Path::new("/a/x")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(fs.exists("/a/x"));
    }
}
