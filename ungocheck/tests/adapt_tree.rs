//! End-to-end adapter runs against a real temporary Go tree.
//!
//! The `go` command is replaced by a scripted runner that snapshots the shadow
//! files while "tests" run, so the tests can check what `go test` would have
//! seen and that nothing is left behind afterwards.

use std::fs;
use std::path::PathBuf;

use ungocheck::core::adaptation::Adaptation;
use ungocheck::io::env::GoEnv;
use ungocheck::io::fs::OsFilesystem;
use ungocheck::resolve::Resolver;
use ungocheck::rewrite::RewriteEngine;
use ungocheck::run::Adapter;
use ungocheck::test_support::{GoTree, ScriptedRunner};

const GREET: &str = include_str!("fixtures/greet_test.go");
const SUITE: &str = include_str!("fixtures/suite_test.go");
const SHADOW_SUFFIX: &str = "_ungocheck_test.go";

fn snapshot(tree: &GoTree) -> String {
    let mut out = String::new();
    for path in tree.files_with_suffix(SHADOW_SUFFIX).expect("list shadows") {
        let rel = path.strip_prefix(tree.path()).expect("relative");
        out.push_str(&format!("== {}\n", rel.display()));
        out.push_str(&fs::read_to_string(&path).expect("read shadow"));
    }
    out
}

#[test]
fn fixture_rewrite_produces_parallel_standard_tests() {
    let tree = GoTree::new().expect("tree");
    let source = tree.write("greet/greet_test.go", GREET).expect("write");
    let adaptation = Adaptation::default();

    let (shadow, converted) = RewriteEngine::new(&OsFilesystem, &adaptation)
        .rewrite_one(&source)
        .expect("rewrite");
    assert_eq!(converted, 2);
    assert_eq!(shadow, tree.path().join("greet/greet_ungocheck_test.go"));

    let contents = fs::read_to_string(&shadow).expect("read");
    assert!(contents.starts_with(
        "//go:build ungocheck\n// +build ungocheck\n\n\npackage greet\n\nimport \"testing\"\n"
    ));
    assert!(!contents.contains("!ungocheck"));
    assert!(contents.contains("import \"testing\"\n"));
    assert!(contents.contains(
        "func TestHello(c *testing.T) { // ungocheck\n\tc.Parallel() // ungocheck\n"
    ));
    assert!(contents.contains(
        "func TestBye(c *testing.T) { // ungocheck\n\tc.Parallel() // ungocheck\n"
    ));
    assert!(contents.contains("func assertBye(c *testing.T, name string) {"));
    assert!(!contents.contains("*C"));
}

#[test]
fn recursive_run_adapts_every_package_and_cleans_up() {
    let tree = GoTree::new().expect("tree");
    tree.write("greet/greet_test.go", GREET).expect("write");
    tree.write("greet/suite_test.go", SUITE).expect("write");
    tree.write("greet/inner/greet_test.go", GREET).expect("write");
    tree.write("greet/.git/greet_test.go", GREET).expect("write");
    tree.write("greet/greet.go", "package greet\n").expect("write");

    let env = GoEnv::new(tree.path(), Vec::new());
    let runner = ScriptedRunner::new("", true).with_probe(|| snapshot(&tree));
    let adapter = Adapter::new(OsFilesystem, &runner, env, Adaptation::default());

    let mut out = Vec::new();
    adapter.run(&["-race", "./..."], &mut out).expect("run");
    let out = String::from_utf8(out).expect("utf8");

    let listed: Vec<&str> = out.lines().filter(|line| line.starts_with("== ")).collect();
    assert_eq!(
        listed,
        vec![
            "== greet/greet_ungocheck_test.go",
            "== greet/inner/greet_ungocheck_test.go",
        ]
    );
    assert_eq!(
        runner.calls(),
        vec![vec![
            "test".to_string(),
            "-tags=ungocheck".to_string(),
            "-race".to_string(),
            "./...".to_string(),
        ]]
    );
    assert!(tree.files_with_suffix(SHADOW_SUFFIX).expect("list").is_empty());
    assert!(tree.path().join("greet/greet_test.go").exists());
}

#[test]
fn gopath_package_resolves_under_src() {
    let tree = GoTree::new().expect("tree");
    tree.write("gopath/src/example.com/greet/greet_test.go", GREET)
        .expect("write");
    tree.write("gopath/src/example.com/greet/sub/other_test.go", GREET)
        .expect("write");
    let env = GoEnv::new(
        tree.path().join("elsewhere"),
        vec![tree.path().join("missing"), tree.path().join("gopath")],
    );
    let adaptation = Adaptation::default();

    let files = Resolver::new(&OsFilesystem, &env, &adaptation)
        .resolve(&["example.com/greet"])
        .expect("resolve");
    assert_eq!(
        files,
        vec![tree.path().join("gopath/src/example.com/greet/greet_test.go")]
    );

    let files = Resolver::new(&OsFilesystem, &env, &adaptation)
        .resolve(&["example.com/greet/..."])
        .expect("resolve");
    let expected: Vec<PathBuf> = vec![
        tree.path().join("gopath/src/example.com/greet/greet_test.go"),
        tree.path().join("gopath/src/example.com/greet/sub/other_test.go"),
    ];
    assert_eq!(files, expected);
}

#[test]
fn stale_shadow_files_are_not_adapted_again() {
    let tree = GoTree::new().expect("tree");
    tree.write("greet_test.go", GREET).expect("write");
    tree.write("greet_ungocheck_test.go", "stale").expect("write");
    let env = GoEnv::new(tree.path(), Vec::new());
    let adaptation = Adaptation::default();

    let files = Resolver::new(&OsFilesystem, &env, &adaptation)
        .resolve(&["."])
        .expect("resolve");
    assert_eq!(files, vec![tree.path().join("greet_test.go")]);
}
