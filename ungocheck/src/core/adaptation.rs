//! Naming contract shared by the resolver, the rewrite engine and the runner.
//!
//! Every name derived from the adaptation tag lives here: the shadow file
//! suffix, the `-tags` flag passed to `go test`, the negated build constraint
//! stripped from sources and the header that gates shadow files.

use std::path::{Path, PathBuf};

/// Suffix `go test` uses to discover test files.
pub const TEST_SUFFIX: &str = "_test.go";

/// Tag used when no configuration overrides it.
pub const DEFAULT_TAG: &str = "ungocheck";

/// Build mode under which shadow files participate in `go test`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adaptation {
    tag: String,
    shadow_suffix: String,
}

impl Default for Adaptation {
    fn default() -> Self {
        Self::new(DEFAULT_TAG)
    }
}

impl Adaptation {
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let shadow_suffix = format!("_{tag}{TEST_SUFFIX}");
        Self { tag, shadow_suffix }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// `_<tag>_test.go`
    pub fn shadow_suffix(&self) -> &str {
        &self.shadow_suffix
    }

    /// Flag selecting the adaptation build mode, e.g. `-tags=ungocheck`.
    pub fn build_flag(&self) -> String {
        format!("-tags={}", self.tag)
    }

    /// Constraint term that excludes a file from the adaptation build mode.
    pub fn negated_constraint(&self) -> String {
        format!("!{}", self.tag)
    }

    /// Trailing comment marking lines the rewrite generated.
    pub fn marker(&self) -> String {
        format!("// {}", self.tag)
    }

    /// Build constraint written at the top of every shadow file.
    pub fn header(&self) -> String {
        format!("//go:build {tag}\n// +build {tag}\n\n", tag = self.tag)
    }

    /// Arguments for the test command: `test`, the build flag, then `args`.
    ///
    /// A `-tags` flag already present in `args` is extended with the
    /// adaptation tag instead of being overridden by a second `-tags`.
    pub fn runner_args<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        let mut out = vec!["test".to_string()];
        let mut merged = false;
        let mut args = args.iter().map(AsRef::<str>::as_ref);
        while let Some(arg) = args.next() {
            if arg == "-args" || arg == "--args" {
                out.push(arg.to_string());
                out.extend(args.by_ref().map(str::to_string));
                break;
            }
            let flag = arg
                .strip_prefix("--")
                .or_else(|| arg.strip_prefix('-'))
                .unwrap_or("");
            if flag == "tags" {
                if let Some(value) = args.next() {
                    out.push(self.merge_tags(value));
                    merged = true;
                    continue;
                }
            } else if let Some(value) = flag.strip_prefix("tags=") {
                out.push(self.merge_tags(value));
                merged = true;
                continue;
            }
            out.push(arg.to_string());
        }
        if !merged {
            out.insert(1, self.build_flag());
        }
        out
    }

    fn merge_tags(&self, value: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            return self.build_flag();
        }
        let separator = if value.contains(',') || !value.contains(' ') {
            ','
        } else {
            ' '
        };
        if value
            .split([',', ' '])
            .any(|existing| existing == self.tag)
        {
            return format!("-tags={value}");
        }
        format!("-tags={value}{separator}{}", self.tag)
    }

    /// True for `*_test.go` names that are not shadow files themselves.
    pub fn is_test_file(&self, name: &str) -> bool {
        name.ends_with(TEST_SUFFIX) && !self.is_shadow_file(name)
    }

    /// True for names produced by [`Adaptation::shadow_path`].
    pub fn is_shadow_file(&self, name: &str) -> bool {
        name.ends_with(&self.shadow_suffix)
    }

    /// Map `dir/foo_test.go` to `dir/foo_<tag>_test.go`.
    ///
    /// Returns `None` when the file name is not a test file.
    pub fn shadow_path(&self, source: &Path) -> Option<PathBuf> {
        let name = source.file_name()?.to_str()?;
        if !self.is_test_file(name) {
            return None;
        }
        let base = &name[..name.len() - TEST_SUFFIX.len()];
        Some(source.with_file_name(format!("{base}{}", self.shadow_suffix)))
    }

    /// Inverse of [`Adaptation::shadow_path`].
    pub fn source_path(&self, shadow: &Path) -> Option<PathBuf> {
        let name = shadow.file_name()?.to_str()?;
        let base = name.strip_suffix(self.shadow_suffix.as_str())?;
        Some(shadow.with_file_name(format!("{base}{TEST_SUFFIX}")))
    }
}
