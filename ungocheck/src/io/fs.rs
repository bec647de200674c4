//! Filesystem capability consumed by the resolver and the rewrite engine.
//!
//! Components receive a [`Filesystem`] instead of calling `std::fs` directly,
//! so tests can substitute an in-memory implementation. Handles close when
//! dropped.

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

/// Kind of a directory entry or stat result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
    /// Symlinks (when listing a directory), devices, sockets.
    Other,
}

/// Metadata the adapter needs about a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Final path component.
    pub name: String,
    pub kind: FileKind,
}

impl FileInfo {
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }
}

/// Minimal filesystem surface used by the adapter.
pub trait Filesystem {
    /// Open an existing file for reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;

    /// Open a file for writing, creating or truncating it.
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>>;

    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Metadata for `path`, following symlinks.
    fn stat(&self, path: &Path) -> io::Result<FileInfo>;

    /// Immediate entries of a directory, in no particular order.
    ///
    /// Entries are not followed: a symlink is reported as [`FileKind::Other`].
    fn read_dir(&self, path: &Path) -> io::Result<Vec<FileInfo>>;
}

impl<F: Filesystem + ?Sized> Filesystem for &F {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        (**self).open(path)
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
        (**self).create(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        (**self).remove(path)
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        (**self).stat(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<FileInfo>> {
        (**self).read_dir(path)
    }
}

/// [`Filesystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(fs::File::open(path)?))
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + '_>> {
        Ok(Box::new(BufWriter::new(fs::File::create(path)?)))
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        let meta = fs::metadata(path)?;
        Ok(FileInfo {
            name: file_name(path),
            kind: kind_of(meta.file_type()),
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<FileInfo>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            entries.push(FileInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind: kind_of(entry.file_type()?),
            });
        }
        Ok(entries)
    }
}

fn kind_of(file_type: fs::FileType) -> FileKind {
    if file_type.is_file() {
        FileKind::File
    } else if file_type.is_dir() {
        FileKind::Dir
    } else {
        FileKind::Other
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
