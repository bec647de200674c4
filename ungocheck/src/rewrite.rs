//! Rewrite engine: gocheck test files in, shadow `go test` files out.

use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};

use crate::core::adaptation::Adaptation;
use crate::core::transform::LineRewriter;
use crate::io::fs::Filesystem;

/// Writes one shadow file per test file that contains suite tests.
pub struct RewriteEngine<'a, F: Filesystem + ?Sized> {
    fs: &'a F,
    adaptation: &'a Adaptation,
    rewriter: LineRewriter,
}

impl<'a, F: Filesystem + ?Sized> RewriteEngine<'a, F> {
    pub fn new(fs: &'a F, adaptation: &'a Adaptation) -> Self {
        Self {
            fs,
            adaptation,
            rewriter: LineRewriter::new(adaptation),
        }
    }

    /// Rewrite every file, keeping only shadows with at least one conversion.
    ///
    /// All-or-nothing: on error, every shadow written by this call is removed
    /// before the error is returned.
    #[instrument(skip_all, fields(files = sources.len()))]
    pub fn rewrite_all(&self, sources: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut shadows = Vec::new();
        for source in sources {
            match self.rewrite_one(source) {
                Ok((shadow, 0)) => {
                    debug!(source = %source.display(), "no suite tests, discarding shadow");
                    if let Err(err) = self.fs.remove(&shadow) {
                        self.rollback(&shadows);
                        return Err(err).with_context(|| format!("remove {}", shadow.display()));
                    }
                }
                Ok((shadow, converted)) => {
                    debug!(shadow = %shadow.display(), converted, "shadow written");
                    shadows.push(shadow);
                }
                Err(err) => {
                    if let Some(shadow) = self.adaptation.shadow_path(source) {
                        shadows.push(shadow);
                    }
                    self.rollback(&shadows);
                    return Err(err);
                }
            }
        }
        Ok(shadows)
    }

    /// Rewrite one test file, returning its shadow path and conversion count.
    ///
    /// A shadow is written even when nothing was converted; the caller decides
    /// whether to keep it.
    pub fn rewrite_one(&self, source: &Path) -> Result<(PathBuf, usize)> {
        let shadow = self
            .adaptation
            .shadow_path(source)
            .ok_or_else(|| anyhow!("{} is not a test file", source.display()))?;
        let reader = self
            .fs
            .open(source)
            .with_context(|| format!("open {}", source.display()))?;
        let mut writer = self
            .fs
            .create(&shadow)
            .with_context(|| format!("create {}", shadow.display()))?;
        let converted = self
            .transform(BufReader::new(reader), &mut writer)
            .with_context(|| format!("rewrite {} to {}", source.display(), shadow.display()))?;
        Ok((shadow, converted))
    }

    fn transform<R: BufRead>(&self, mut reader: R, writer: &mut dyn Write) -> Result<usize> {
        writer
            .write_all(self.rewriter.header().as_bytes())
            .context("write header")?;
        let mut converted = 0;
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).context("read line")? == 0 {
                break;
            }
            let rewritten = self.rewriter.rewrite(&line);
            if rewritten.is_conversion() {
                converted += 1;
            }
            writer
                .write_all(rewritten.as_str().as_bytes())
                .context("write line")?;
        }
        writer.flush().context("flush")?;
        Ok(converted)
    }

    fn rollback(&self, shadows: &[PathBuf]) {
        for shadow in shadows {
            match self.fs.remove(shadow) {
                Ok(()) => debug!(shadow = %shadow.display(), "rolled back shadow"),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(
                        shadow = %shadow.display(),
                        err = %err,
                        "failed to remove shadow during rollback"
                    );
                }
            }
        }
    }
}
