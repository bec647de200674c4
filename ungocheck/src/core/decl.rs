//! Recognition of gocheck suite-method test declarations.
//!
//! The matcher inspects one physical line at a time. A declaration whose
//! signature spans several lines is not recognized; callers treat such lines
//! as ordinary code.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// `func (<receiver>) Test<Name>(<param> *C) {`, with `*check.C` accepted too.
static DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"func\s*\([^)]*\)\s*Test(\w+)\s*\(\s*(\w+)\s+\*(?:check\.)?C\s*\)\s*\{").unwrap()
});

/// References to the gocheck context type outside a declaration.
static CONTEXT_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(?:check\.)?C\b").unwrap());

/// Context type of the standard runner.
pub const TESTING_T: &str = "*testing.T";

/// A suite-method test declaration found on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteTestDecl<'a> {
    /// Name after the `Test` prefix (`Foo` for `TestFoo`).
    pub name: &'a str,
    /// Name of the context parameter.
    pub param: &'a str,
    /// Byte range of the matched signature, opening brace included.
    pub span: Range<usize>,
}

impl SuiteTestDecl<'_> {
    /// Full test function name, `Test` prefix included.
    pub fn test_name(&self) -> String {
        format!("Test{}", self.name)
    }
}

/// Find the first suite-method test declaration on `line`.
///
/// A signature preceded by a comment opener on the same line is commented
/// out and does not count.
pub fn find_decl(line: &str) -> Option<SuiteTestDecl<'_>> {
    let caps = DECL_RE.captures(line)?;
    let whole = caps.get(0)?;
    let prefix = &line[..whole.start()];
    if prefix.contains("//") || prefix.contains("/*") {
        return None;
    }
    Some(SuiteTestDecl {
        name: caps.get(1)?.as_str(),
        param: caps.get(2)?.as_str(),
        span: whole.range(),
    })
}

/// Replace every gocheck context type reference with `*testing.T`.
///
/// Returns `None` when the line has no such reference.
pub fn retype_context(line: &str) -> Option<String> {
    if !CONTEXT_TYPE_RE.is_match(line) {
        return None;
    }
    Some(CONTEXT_TYPE_RE.replace_all(line, TESTING_T).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_value_receiver() {
        let line = "func (s Suite) TestFoo(c *C) {\n";
        let decl = find_decl(line).expect("decl");
        assert_eq!(decl.name, "Foo");
        assert_eq!(decl.param, "c");
        assert_eq!(decl.test_name(), "TestFoo");
        assert_eq!(&line[decl.span.clone()], "func (s Suite) TestFoo(c *C) {");
    }

    #[test]
    fn matches_pointer_receiver_and_qualified_type() {
        let decl = find_decl("func (s *MySuite) TestBar_2(t *check.C) {").expect("decl");
        assert_eq!(decl.name, "Bar_2");
        assert_eq!(decl.param, "t");
    }

    #[test]
    fn ignores_plain_functions_and_other_methods() {
        assert_eq!(find_decl("func TestFoo(t *testing.T) {"), None);
        assert_eq!(find_decl("func (s Suite) SetUpTest(c *C) {"), None);
        assert_eq!(find_decl("func (s Suite) Test(c *C) {"), None);
        assert_eq!(find_decl("func (s Suite) TestFoo(c *C, x int) {"), None);
    }

    #[test]
    fn multi_line_signature_is_not_recognized() {
        assert_eq!(find_decl("func (s Suite) TestFoo("), None);
        assert_eq!(find_decl("\tc *C,"), None);
    }

    #[test]
    fn commented_out_declaration_is_ignored() {
        assert_eq!(find_decl("// func (s S) TestOld(c *C) {"), None);
        assert_eq!(find_decl("\t//func (s *S) TestOld(c *check.C) {"), None);
        assert_eq!(find_decl("/* func (s S) TestOld(c *C) { */"), None);
    }

    #[test]
    fn retypes_context_references() {
        assert_eq!(
            retype_context("func helper(c *C, d *check.C) {"),
            Some("func helper(c *testing.T, d *testing.T) {".to_string())
        );
        assert_eq!(retype_context("var x *Config"), None);
        assert_eq!(retype_context("c.Assert(x, Equals, 1)"), None);
    }
}
