//! Adapter configuration stored in `.ungocheck.toml` at the working directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::adaptation::{Adaptation, DEFAULT_TAG};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = ".ungocheck.toml";

/// Adapter configuration (TOML).
///
/// Missing fields default to the values `go test` users expect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AdapterConfig {
    /// Program invoked as `<go> test -tags=<tag> ...`.
    pub go: String,

    /// Build tag selecting shadow files; also names them (`*_<tag>_test.go`).
    pub tag: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            go: "go".to_string(),
            tag: DEFAULT_TAG.to_string(),
        }
    }
}

impl AdapterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.go.trim().is_empty() {
            return Err(anyhow!("go must be a non-empty command"));
        }
        if self.tag.is_empty()
            || !self
                .tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(anyhow!(
                "tag must be a non-empty identifier of [A-Za-z0-9_], got '{}'",
                self.tag
            ));
        }
        Ok(())
    }

    pub fn adaptation(&self) -> Adaptation {
        Adaptation::new(self.tag.as_str())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `AdapterConfig::default()`.
pub fn load_config(path: &Path) -> Result<AdapterConfig> {
    if !path.exists() {
        let cfg = AdapterConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AdapterConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid {}", path.display()))?;
    Ok(cfg)
}
