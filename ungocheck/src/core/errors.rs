//! Failure kinds collected across a run and their ordered aggregate.

use std::fmt;

use thiserror::Error;

/// A single failure, tagged with the phase that produced it.
#[derive(Debug, Error)]
pub enum Failure {
    /// Selector expansion failed (filesystem access or missing package).
    #[error("resolve packages: {0:#}")]
    Resolution(anyhow::Error),
    /// Transforming a test file failed.
    #[error("rewrite: {0:#}")]
    Rewrite(anyhow::Error),
    /// The test command failed or could not be invoked.
    #[error("go test: {0:#}")]
    Runner(anyhow::Error),
    /// A shadow file could not be removed.
    #[error("cleanup: {0:#}")]
    Cleanup(anyhow::Error),
}

/// Ordered collection of failures; empty means success.
#[derive(Debug, Default)]
pub struct ErrorList {
    failures: Vec<Failure>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, failure: Failure) {
        self.failures.push(failure);
    }

    /// Append every failure of `other`, preserving order.
    pub fn extend(&mut self, other: ErrorList) {
        self.failures.extend(other.failures);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Failure> {
        self.failures.iter()
    }

    /// Collapse into `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), ErrorList> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<Failure> for ErrorList {
    fn from(failure: Failure) -> Self {
        Self {
            failures: vec![failure],
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}
