//! kdbx-env - Run a command with KeePass secrets in its environment
//!
//! "Secrets should be invisible until you need them."
//!
//! Opens a KDBX database, pulls out only the entries that were asked for,
//! and hands them to exactly one child process as environment variables.
//! Nothing is written to disk and no secret value is logged.
//!
//! The flow is strictly sequential:
//! open ([`store`]) -> resolve ([`resolve`]) -> compose ([`env`]) -> launch ([`launch`]).

pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod launch;
pub mod resolve;
pub mod run;
pub mod store;
pub mod tree;

pub use config::Config;
pub use env::{compose, Environment};
pub use error::{KdbxEnvError, Result};
pub use launch::{CommandLine, Launcher, ProcessLauncher};
pub use resolve::{resolve, FieldSelection, RequestedNames, Resolution};
pub use run::{acquire_password, execute, Request, Stage};
pub use store::{Credentials, KdbxOpener, KdbxStore, Password, StoreOpener};
pub use tree::{Reveal, SecretEntry, SecretGroup, SecretStore};
