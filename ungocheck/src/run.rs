//! Orchestration for a single `ungocheck` invocation.
//!
//! Resolve test files, write shadow files, run `go test`, then remove the
//! shadow files. Once shadow files exist, cleanup runs whatever happened
//! before it, and every failure is collected instead of short-circuiting.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument};

use crate::core::adaptation::Adaptation;
use crate::core::errors::{ErrorList, Failure};
use crate::core::selector::package_selectors;
use crate::io::config::AdapterConfig;
use crate::io::env::GoEnv;
use crate::io::fs::{Filesystem, OsFilesystem};
use crate::io::go::{GoTestRunner, TestRunner};
use crate::resolve::Resolver;
use crate::rewrite::RewriteEngine;

/// Stages of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolvingFiles,
    RewritingFiles,
    InvokingRunner,
    CleaningUp,
    Done,
}

/// Wires the filesystem, the test runner and the environment together.
pub struct Adapter<F = OsFilesystem, R = GoTestRunner> {
    fs: F,
    runner: R,
    env: GoEnv,
    adaptation: Adaptation,
}

impl Adapter {
    /// Adapter over the real filesystem, `go` and the process environment.
    pub fn from_env(config: &AdapterConfig) -> Result<Self> {
        let env = GoEnv::from_process()?;
        let runner = GoTestRunner::new(config.go.as_str(), env.workdir.clone());
        Ok(Self::new(OsFilesystem, runner, env, config.adaptation()))
    }
}

impl<F: Filesystem, R: TestRunner> Adapter<F, R> {
    pub fn new(fs: F, runner: R, env: GoEnv, adaptation: Adaptation) -> Self {
        Self {
            fs,
            runner,
            env,
            adaptation,
        }
    }

    /// Run `go test` over the adapted tree, forwarding its output to `out`.
    ///
    /// `args` are the invocation arguments without the program name.
    #[instrument(
        skip_all,
        fields(args = ?args.iter().map(AsRef::<str>::as_ref).collect::<Vec<_>>())
    )]
    pub fn run<S: AsRef<str>>(&self, args: &[S], out: &mut dyn Write) -> Result<(), ErrorList> {
        enter(Stage::ResolvingFiles);
        let selectors = package_selectors(args);
        let files = Resolver::new(&self.fs, &self.env, &self.adaptation)
            .resolve(&selectors)
            .map_err(Failure::Resolution)?;
        info!(files = files.len(), "resolved test files");

        enter(Stage::RewritingFiles);
        let shadows = RewriteEngine::new(&self.fs, &self.adaptation)
            .rewrite_all(&files)
            .map_err(Failure::Rewrite)?;
        info!(shadows = shadows.len(), "wrote shadow files");

        let mut errors = ErrorList::new();

        enter(Stage::InvokingRunner);
        if let Err(err) = self.invoke(args, out) {
            errors.push(Failure::Runner(err));
        }

        enter(Stage::CleaningUp);
        errors.extend(self.cleanup(&shadows));

        enter(Stage::Done);
        errors.into_result()
    }

    fn invoke<S: AsRef<str>>(&self, args: &[S], out: &mut dyn Write) -> Result<()> {
        let result = self.runner.run(&self.adaptation.runner_args(args))?;
        out.write_all(&result.output)
            .and_then(|()| out.flush())
            .context("forward test output")?;
        if !result.success {
            return Err(match result.code {
                Some(code) => anyhow!("exit status {code}"),
                None => anyhow!("terminated by signal"),
            });
        }
        Ok(())
    }

    /// Remove every shadow file, collecting failures without stopping.
    fn cleanup(&self, shadows: &[PathBuf]) -> ErrorList {
        let mut errors = ErrorList::new();
        for shadow in shadows {
            if let Err(err) = self.fs.remove(shadow) {
                let err = anyhow::Error::new(err).context(format!("remove {}", shadow.display()));
                errors.push(Failure::Cleanup(err));
            }
        }
        debug!(shadows = shadows.len(), failed = errors.len(), "cleanup finished");
        errors
    }
}

fn enter(stage: Stage) {
    debug!(?stage, "entering stage");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FsOp, MemFilesystem, ScriptedRunner};

    const SUITE: &str = "// +build !ungocheck\n\npackage p\n\nfunc (s S) TestA(c *C) {\n}\n";

    fn env() -> GoEnv {
        GoEnv::new("/work", vec![PathBuf::from("/gopath")])
    }

    fn shadow_listing(fs: &MemFilesystem) -> String {
        fs.paths_with_suffix("_ungocheck_test.go")
            .iter()
            .map(|path| format!("{}\n", path.display()))
            .collect()
    }

    #[test]
    fn shadows_exist_during_run_and_are_removed_after() {
        let fs = MemFilesystem::new();
        fs.add_file("/work/a_test.go", SUITE);
        fs.add_file("/work/b_test.go", "package p\n");
        let runner = ScriptedRunner::new("ok\n", true).with_probe(|| shadow_listing(&fs));
        let adapter = Adapter::new(&fs, &runner, env(), Adaptation::default());

        let mut out = Vec::new();
        adapter.run(&["-v"], &mut out).expect("run");

        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "ok\n/work/a_ungocheck_test.go\n"
        );
        assert_eq!(
            runner.calls(),
            vec![vec![
                "test".to_string(),
                "-tags=ungocheck".to_string(),
                "-v".to_string()
            ]]
        );
        assert!(fs.paths_with_suffix("_ungocheck_test.go").is_empty());
    }

    #[test]
    fn failing_tests_still_clean_up() {
        let fs = MemFilesystem::new();
        fs.add_file("/work/a_test.go", SUITE);
        let runner = ScriptedRunner::new("--- FAIL: TestA\n", false);
        let adapter = Adapter::new(&fs, &runner, env(), Adaptation::default());

        let mut out = Vec::new();
        let err = adapter.run::<&str>(&[], &mut out).unwrap_err();
        assert_eq!(err.to_string(), "go test: exit status 1");
        assert_eq!(out, b"--- FAIL: TestA\n");
        assert!(fs.paths_with_suffix("_ungocheck_test.go").is_empty());
    }

    #[test]
    fn runner_spawn_failure_still_cleans_up() {
        let fs = MemFilesystem::new();
        fs.add_file("/work/a_test.go", SUITE);
        let runner = ScriptedRunner::spawn_error("spawn command: no such file");
        let adapter = Adapter::new(&fs, &runner, env(), Adaptation::default());

        let err = adapter.run(&["."], &mut Vec::new()).unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(matches!(err.iter().next(), Some(Failure::Runner(_))));
        assert!(fs.paths_with_suffix("_ungocheck_test.go").is_empty());
    }

    #[test]
    fn cleanup_failures_are_collected_after_runner_failure() {
        let fs = MemFilesystem::new();
        fs.add_file("/work/a_test.go", SUITE);
        fs.add_file("/work/b_test.go", SUITE);
        fs.add_file("/work/c_test.go", SUITE);
        fs.fail_on(FsOp::Remove, "/work/a_ungocheck_test.go");
        fs.fail_on(FsOp::Remove, "/work/b_ungocheck_test.go");
        let runner = ScriptedRunner::new("", false);
        let adapter = Adapter::new(&fs, &runner, env(), Adaptation::default());

        let err = adapter.run(&["."], &mut Vec::new()).unwrap_err();
        let lines: Vec<String> = err.to_string().lines().map(str::to_string).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "go test: exit status 1");
        assert!(lines[1].starts_with("cleanup: remove /work/a_ungocheck_test.go"));
        assert!(lines[2].starts_with("cleanup: remove /work/b_ungocheck_test.go"));
        assert!(!fs.exists("/work/c_ungocheck_test.go"));
    }

    #[test]
    fn resolution_failure_skips_everything_else() {
        let fs = MemFilesystem::new();
        fs.add_dir("/work");
        let runner = ScriptedRunner::new("", true);
        let adapter = Adapter::new(&fs, &runner, env(), Adaptation::default());

        let err = adapter.run(&["-v", "missing/pkg"], &mut Vec::new()).unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(matches!(err.iter().next(), Some(Failure::Resolution(_))));
        assert!(err.to_string().contains("cannot find package \"missing/pkg\""));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn rewrite_failure_skips_runner() {
        let fs = MemFilesystem::new();
        fs.add_file("/work/a_test.go", SUITE);
        fs.add_file("/work/b_test.go", SUITE);
        fs.fail_on(FsOp::Create, "/work/b_ungocheck_test.go");
        let runner = ScriptedRunner::new("", true);
        let adapter = Adapter::new(&fs, &runner, env(), Adaptation::default());

        let err = adapter.run(&["."], &mut Vec::new()).unwrap_err();
        assert!(matches!(err.iter().next(), Some(Failure::Rewrite(_))));
        assert!(runner.calls().is_empty());
        assert!(fs.paths_with_suffix("_ungocheck_test.go").is_empty());
    }

    #[test]
    fn no_suite_tests_still_runs_go_test() {
        let fs = MemFilesystem::new();
        fs.add_file("/work/plain_test.go", "// +build !ungocheck\n");
        let runner = ScriptedRunner::new("ok\n", true).with_probe(|| shadow_listing(&fs));
        let adapter = Adapter::new(&fs, &runner, env(), Adaptation::default());

        let mut out = Vec::new();
        adapter.run(&["."], &mut out).expect("run");
        assert_eq!(out, b"ok\n");
        assert_eq!(runner.calls().len(), 1);
    }
}
