//! Process launching
//!
//! The child gets the composed environment as its entire environment and
//! inherits stdin, stdout and stderr, so nothing it reads or prints passes
//! through this process.

use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus, Stdio};

use crate::env::Environment;
use crate::error::{KdbxEnvError, Result};

/// The command to run and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Build from the tokens following `--`. At least one token is required.
    pub fn from_tokens(tokens: &[String]) -> Result<Self> {
        let (program, args) = tokens.split_first().ok_or_else(|| {
            KdbxEnvError::Config("No command specified to run. Use \"-- <command>\"".to_string())
        })?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// For log output
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Runs a command to completion and reports its exit code
pub trait Launcher {
    fn launch(&self, command: &CommandLine, env: &Environment) -> Result<i32>;
}

/// Spawns a real child process and waits for it
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, command: &CommandLine, env: &Environment) -> Result<i32> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .env_clear()
            .envs(env.iter())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| KdbxEnvError::Launch {
                program: command.program.clone(),
                source,
            })?;

        tracing::debug!("Started {} (pid {})", command.program, child.id());

        let status = child.wait().map_err(|source| KdbxEnvError::Launch {
            program: command.program.clone(),
            source,
        })?;

        Ok(exit_code(status))
    }
}

/// Exit code to relay for a finished child: its own code, `128 + N` when it
/// was killed by signal N, otherwise 0.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    if let Some(signal) = status.signal() {
        return 128 + signal;
    }
    0
}
