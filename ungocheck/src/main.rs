//! Run gocheck suites with plain `go test`.
//!
//! Accepts the same arguments as `go test`: flags are forwarded untouched and
//! the remaining arguments select packages (`.`, `./...`, `user/pkg`,
//! `user/pkg/...`).

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use ungocheck::exit_codes;
use ungocheck::io::config::{CONFIG_FILE, load_config};
use ungocheck::logging;
use ungocheck::run::Adapter;

#[derive(Parser)]
#[command(
    name = "ungocheck",
    version,
    about = "Run gocheck suites with plain `go test`",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// `go test` flags and package selectors, forwarded as given.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let code = match run(&cli.args) {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::FAILED
        }
    };
    std::process::exit(code);
}

fn run(args: &[String]) -> Result<()> {
    let config = load_config(Path::new(CONFIG_FILE)).context("load config")?;
    debug!(?config, "config loaded");
    let adapter = Adapter::from_env(&config)?;
    adapter.run(args, &mut io::stdout().lock())?;
    Ok(())
}
