//! kdbx-env - Run a command with secrets from a KeePass database
//!
//! Usage:
//!   kdbx-env --file <path> --vars <VAR1> <VAR2> -- <command> [args...]
//!
//! Exits with the command's own exit code, or 1 if the command could not be
//! run (missing flags, command or password, unreadable/locked database,
//! command not found).

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kdbx_env::cli::{parse_exit_code, Cli};
use kdbx_env::run::read_password_var;
use kdbx_env::{
    acquire_password, execute, Config, Environment, KdbxEnvError, KdbxOpener, ProcessLauncher,
};

fn main() {
    // Initialize logging to stderr (stdout belongs to the child)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = parse_exit_code(&e);
            // Help and version go to stdout, usage errors to stderr
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => match e.downcast_ref::<KdbxEnvError>() {
            // Top-level message only: an access failure must not show its cause
            Some(err) => {
                eprintln!("Error: {}", err);
                err.exit_code()
            }
            None => {
                eprintln!("Error: {:#}", e);
                1
            }
        },
    };

    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let config = Config::load()?;

    // Read once, up front
    let password_from_env = read_password_var(&config.password_env);
    let ambient = Environment::capture();

    let request = cli.into_request(&config);
    let code = execute(
        &request,
        || {
            acquire_password(password_from_env, || {
                rpassword::prompt_password("Enter KDBX password: ")
            })
        },
        &ambient,
        &KdbxOpener,
        &ProcessLauncher,
    )?;

    Ok(code)
}
