//! One kdbx-env run: validate, open, resolve, compose, launch
//!
//! Every stage runs once, in order. Any failure before launching aborts the
//! run without starting a child, so secrets are never partially injected.

use std::env::VarError;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::env::{compose, Environment};
use crate::error::{KdbxEnvError, Result};
use crate::launch::{CommandLine, Launcher};
use crate::resolve::{resolve, FieldSelection, RequestedNames};
use crate::store::{Credentials, Password, StoreOpener};

/// Stages of a run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Opening,
    Resolving,
    Composing,
    Launching,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Opening => "opening",
            Stage::Resolving => "resolving",
            Stage::Composing => "composing",
            Stage::Launching => "launching",
        };
        f.write_str(name)
    }
}

/// What the user asked for
#[derive(Debug, Clone)]
pub struct Request {
    pub file: PathBuf,
    pub keyfile: Option<PathBuf>,
    pub names: RequestedNames,
    pub fields: FieldSelection,
    /// Tokens after `--`
    pub command: Vec<String>,
}

/// Read the password variable. A value that is not valid UTF-8 is ignored
/// with a warning, so the user is prompted instead.
pub fn read_password_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => Some(value),
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(_)) => {
            tracing::warn!("{} is not valid UTF-8, ignoring it", name);
            None
        }
    }
}

/// Pick the password: the environment value if set and non-empty, otherwise
/// whatever the prompt returns. An empty password is refused.
pub fn acquire_password<P>(from_env: Option<String>, prompt: P) -> Result<Password>
where
    P: FnOnce() -> io::Result<String>,
{
    let password = match from_env.filter(|p| !p.is_empty()) {
        Some(password) => Password::new(password),
        None => Password::new(prompt().map_err(prompt_failed)?),
    };

    if password.is_empty() {
        return Err(KdbxEnvError::Config("Password is required.".to_string()));
    }

    Ok(password)
}

fn prompt_failed(e: io::Error) -> KdbxEnvError {
    KdbxEnvError::Config(format!("Failed to read password: {}", e))
}

/// Execute a run and return the child's exit code.
///
/// The command is validated and the password obtained before the store is
/// touched. `ambient` is the environment snapshot the child inherits.
pub fn execute<O, L, P>(
    request: &Request,
    password: P,
    ambient: &Environment,
    opener: &O,
    launcher: &L,
) -> Result<i32>
where
    O: StoreOpener,
    L: Launcher,
    P: FnOnce() -> Result<Password>,
{
    let command = CommandLine::from_tokens(&request.command)?;
    let credentials = Credentials {
        path: request.file.clone(),
        password: password()?,
        keyfile: request.keyfile.clone(),
    };

    tracing::debug!(stage = %Stage::Opening, file = %request.file.display());
    tracing::info!("Loading variables from KDBX...");
    let store = opener.open(&credentials)?;
    drop(credentials);

    tracing::debug!(stage = %Stage::Resolving, requested = request.names.len());
    let resolution = resolve(&store, &request.names, &request.fields);
    drop(store);

    if !resolution.is_complete() {
        tracing::warn!(
            "Could not find the following variables in the KDBX file: {}",
            resolution.missing.join(", ")
        );
    }

    tracing::debug!(stage = %Stage::Composing, found = resolution.values.len());
    let env = compose(ambient, &resolution);
    drop(resolution);

    tracing::debug!(stage = %Stage::Launching);
    tracing::info!("Running: {}", command.display());
    launcher.launch(&command, &env)
}
