//! Line rewrite rules turning a gocheck test file into a `go test` file.

use crate::core::adaptation::Adaptation;
use crate::core::decl::{TESTING_T, find_decl, retype_context};

/// Import injected after the package clause.
const TESTING_IMPORT: &str = "import \"testing\"\n";

/// Outcome of rewriting a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRewrite<'a> {
    /// Copied verbatim.
    Keep(&'a str),
    /// Removed from the output.
    Drop,
    /// Replaced by new text; `converted` is set for declaration rewrites.
    Replace { text: String, converted: bool },
}

impl LineRewrite<'_> {
    pub fn is_conversion(&self) -> bool {
        matches!(self, LineRewrite::Replace { converted: true, .. })
    }

    /// Text emitted for the line.
    pub fn as_str(&self) -> &str {
        match self {
            LineRewrite::Keep(line) => line,
            LineRewrite::Drop => "",
            LineRewrite::Replace { text, .. } => text,
        }
    }
}

/// Applies the rewrite rules line by line.
#[derive(Debug, Clone)]
pub struct LineRewriter {
    negated: String,
    marker: String,
    header: String,
}

impl LineRewriter {
    pub fn new(adaptation: &Adaptation) -> Self {
        Self {
            negated: adaptation.negated_constraint(),
            marker: adaptation.marker(),
            header: adaptation.header(),
        }
    }

    /// Text written before the first source line.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Rewrite one physical line (trailing newline included, if any).
    ///
    /// Rules in priority order: package clause, negated build constraint,
    /// suite-test declaration, context type reference, verbatim.
    pub fn rewrite<'a>(&self, line: &'a str) -> LineRewrite<'a> {
        if line.starts_with("package ") {
            let mut text = line.to_string();
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text.push('\n');
            text.push_str(TESTING_IMPORT);
            return LineRewrite::Replace {
                text,
                converted: false,
            };
        }
        if self.is_negated_constraint(line) {
            return LineRewrite::Drop;
        }
        if let Some(decl) = find_decl(line) {
            let rest = &line[decl.span.end..];
            let mut text = format!(
                "{}func {}({} {TESTING_T}) {{ {}\n",
                &line[..decl.span.start],
                decl.test_name(),
                decl.param,
                self.marker,
            );
            text.push_str(&format!("\t{}.Parallel() {}\n", decl.param, self.marker));
            if !rest.trim().is_empty() {
                text.push_str(rest.trim_start_matches([' ', '\t']));
                if !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            return LineRewrite::Replace {
                text,
                converted: true,
            };
        }
        if let Some(text) = retype_context(line) {
            return LineRewrite::Replace {
                text,
                converted: false,
            };
        }
        LineRewrite::Keep(line)
    }

    fn is_negated_constraint(&self, line: &str) -> bool {
        (line.contains("// +build") || line.contains("//go:build")) && line.contains(&self.negated)
    }
}
