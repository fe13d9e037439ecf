//! CLI definitions

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::resolve::RequestedNames;
use crate::run::Request;

/// kdbx-env - Run a command with secrets from a KeePass database
#[derive(Parser, Debug)]
#[command(name = "kdbx-env")]
#[command(version)]
#[command(about = "Run a command with secrets from a KeePass (KDBX) database injected as environment variables")]
#[command(override_usage = "kdbx-env --file <path> --vars <VAR1> <VAR2> ... -- <command> [args...]")]
#[command(after_help = r#"PASSWORD:
    Read from $KDBX_PASSWORD (or the variable named by `password_env` in
    the config file). Prompted for without echo when not set.

CONFIG:
    ~/.config/kdbx-env/config.toml, or the path in $KDBX_ENV_CONFIG.
    Keys: password_env, keyfile, field, title_field.

EXAMPLES:
    kdbx-env -f secrets.kdbx -v DATABASE_URL API_KEY -- npm run dev
    kdbx-env -f secrets.kdbx -k vault.key -v TOKEN -- ./deploy.sh prod
    kdbx-env -f secrets.kdbx --field UserName -v DB_USER -- psql

Entries are matched by title (case-sensitive) in every group. When a title
appears more than once, the last one found wins."#)]
pub struct Cli {
    /// Path to .kdbx file
    #[arg(short = 'f', long)]
    pub file: PathBuf,

    /// Variable names to load, matched against entry titles (space separated)
    #[arg(short = 'v', long, required = true, num_args = 1..)]
    pub vars: Vec<String>,

    /// Path to key file
    #[arg(short = 'k', long)]
    pub keyfile: Option<PathBuf>,

    /// Entry field holding the value [default: Password]
    #[arg(long)]
    pub field: Option<String>,

    /// Command to run with the variables injected
    #[arg(last = true)]
    pub command: Vec<String>,
}

impl Cli {
    /// Merge with config into a run request. Flags win over config.
    pub fn into_request(self, config: &Config) -> Request {
        Request {
            file: self.file,
            keyfile: self.keyfile.or_else(|| config.keyfile.clone()),
            names: RequestedNames::new(self.vars),
            fields: config.fields(self.field.as_deref()),
            command: self.command,
        }
    }
}

/// Exit status for a failed parse: 0 when clap is only showing help or the
/// version, 1 for missing or invalid arguments.
pub fn parse_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        let cli = Cli::try_parse_from([
            "kdbx-env", "--file", "db.kdbx", "--vars", "A", "B", "--", "npm", "run", "dev",
        ])
        .unwrap();

        assert_eq!(cli.file, PathBuf::from("db.kdbx"));
        assert_eq!(cli.vars, vec!["A", "B"]);
        assert_eq!(cli.command, vec!["npm", "run", "dev"]);
        assert!(cli.keyfile.is_none());
        assert!(cli.field.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::try_parse_from([
            "kdbx-env", "-f", "db.kdbx", "-k", "key.file", "-v", "TOKEN", "--", "env",
        ])
        .unwrap();

        assert_eq!(cli.keyfile, Some(PathBuf::from("key.file")));
        assert_eq!(cli.vars, vec!["TOKEN"]);
        assert_eq!(cli.command, vec!["env"]);
    }

    #[test]
    fn test_cli_command_keeps_hyphen_args() {
        let cli = Cli::try_parse_from([
            "kdbx-env", "-f", "db.kdbx", "-v", "A", "--", "ls", "-la", "--color",
        ])
        .unwrap();
        assert_eq!(cli.command, vec!["ls", "-la", "--color"]);
    }

    #[test]
    fn test_cli_command_may_be_empty() {
        // Rejected later, before the store is opened
        let cli = Cli::try_parse_from(["kdbx-env", "-f", "db.kdbx", "-v", "A"]).unwrap();
        assert!(cli.command.is_empty());
    }

    #[test]
    fn test_cli_requires_file_and_vars() {
        assert!(Cli::try_parse_from(["kdbx-env", "-v", "A", "--", "env"]).is_err());
        assert!(Cli::try_parse_from(["kdbx-env", "-f", "db.kdbx", "--", "env"]).is_err());
    }

    #[test]
    fn test_missing_required_flag_exits_one() {
        let err = Cli::try_parse_from(["kdbx-env", "-v", "A", "--", "true"]).unwrap_err();
        assert_eq!(parse_exit_code(&err), 1);

        let err = Cli::try_parse_from(["kdbx-env", "-f", "x.kdbx", "--", "true"]).unwrap_err();
        assert_eq!(parse_exit_code(&err), 1);

        let err = Cli::try_parse_from(["kdbx-env", "-f", "x.kdbx", "-v", "A", "--bogus"])
            .unwrap_err();
        assert_eq!(parse_exit_code(&err), 1);
    }

    #[test]
    fn test_help_and_version_exit_zero() {
        let err = Cli::try_parse_from(["kdbx-env", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert_eq!(parse_exit_code(&err), 0);

        let err = Cli::try_parse_from(["kdbx-env", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert_eq!(parse_exit_code(&err), 0);
    }

    #[test]
    fn test_into_request_merges_config() {
        let config = Config {
            keyfile: Some(PathBuf::from("/cfg/vault.key")),
            field: "UserName".to_string(),
            ..Config::default()
        };

        let cli =
            Cli::try_parse_from(["kdbx-env", "-f", "db.kdbx", "-v", "A", "--", "env"]).unwrap();
        let request = cli.into_request(&config);
        assert_eq!(request.keyfile, Some(PathBuf::from("/cfg/vault.key")));
        assert_eq!(request.fields.value_field, "UserName");
        assert_eq!(request.names.as_slice(), ["A".to_string()]);

        let cli = Cli::try_parse_from([
            "kdbx-env", "-f", "db.kdbx", "-k", "cli.key", "--field", "URL", "-v", "A", "--", "env",
        ])
        .unwrap();
        let request = cli.into_request(&config);
        assert_eq!(request.keyfile, Some(PathBuf::from("cli.key")));
        assert_eq!(request.fields.value_field, "URL");
    }
}
