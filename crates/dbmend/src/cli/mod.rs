mod migrations;
mod sequences;

pub use migrations::MigrationsCommand;
pub use sequences::SequencesCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};

use dbmend_core::MendConfig;

/// dbmend - maintenance toolkit for Django deployments on PostgreSQL.
#[derive(Parser)]
#[command(name = "dbmend")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and repair primary-key sequences.
    Sequences(SequencesCommand),

    /// Inspect and reset generated migration files.
    Migrations(MigrationsCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Sequences(cmd) => cmd.execute().await,
            Commands::Migrations(cmd) => cmd.execute().await,
        }
    }
}

/// Default configuration file path, used when `--config` is not passed.
pub(crate) const DEFAULT_CONFIG: &str = "dbmend.toml";

/// Load the configuration file.
///
/// An explicitly passed path must exist and parse; it carries settings like
/// protected apps, so silently ignoring a typo'd path is not an option. Only
/// the implicit default path may be absent, yielding `None`.
pub(crate) fn load_config_file(path: Option<&str>) -> Result<Option<MendConfig>> {
    match path {
        Some(path) => Ok(Some(MendConfig::from_file(path)?)),
        None if std::path::Path::new(DEFAULT_CONFIG).exists() => {
            Ok(Some(MendConfig::from_file(DEFAULT_CONFIG)?))
        }
        None => Ok(None),
    }
}

/// Load configuration for database-touching commands, falling back to
/// `DATABASE_URL` when no config file is present.
pub(crate) fn load_config(path: Option<&str>, database_url: Option<&str>) -> Result<MendConfig> {
    let mut config = match load_config_file(path)? {
        Some(config) => config,
        None => {
            if let Some(url) = database_url {
                MendConfig::default_with_database_url(url)
            } else if let Ok(url) = std::env::var("DATABASE_URL") {
                MendConfig::default_with_database_url(&url)
            } else {
                anyhow::bail!(
                    "No configuration found: pass --config, --database-url, or set DATABASE_URL."
                );
            }
        }
    };

    // A flag beats the config file.
    if let Some(url) = database_url {
        config.database.url = url.to_string();
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_sequences_repair() {
        let cli = Cli::try_parse_from(["dbmend", "sequences", "repair"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_parse_sequences_repair_dry_run() {
        let cli = Cli::try_parse_from(["dbmend", "sequences", "repair", "--dry-run"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_parse_migrations_reset() {
        let cli = Cli::try_parse_from(["dbmend", "migrations", "reset", "--yes"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_rejects_unknown_command() {
        let cli = Cli::try_parse_from(["dbmend", "vacuum"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_load_config_from_url_flag() {
        let config = load_config(None, Some("postgres://localhost/flagdb")).unwrap();
        assert_eq!(config.database.url, "postgres://localhost/flagdb");
    }

    #[test]
    fn test_load_config_flag_overrides_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dbmend.toml");
        std::fs::write(
            &path,
            "[database]\nurl = \"postgres://localhost/filedb\"\n",
        )
        .unwrap();

        let config = load_config(
            Some(path.to_str().unwrap()),
            Some("postgres://localhost/flagdb"),
        )
        .unwrap();
        assert_eq!(config.database.url, "postgres://localhost/flagdb");
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        // A typo'd --config must not degrade to defaults; the file carries
        // the protected-apps list.
        let result = load_config_file(Some("/nonexistent/dbmend.toml"));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("/nonexistent/dbmend.toml"), "{}", err);

        let result = load_config(
            Some("/nonexistent/dbmend.toml"),
            Some("postgres://localhost/flagdb"),
        );
        assert!(result.is_err());
    }
}
