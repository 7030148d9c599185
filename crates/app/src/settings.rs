//! Settings for the command line front end.
//!
//! Sources are layered: the optional TOML file (`config/spendlens.toml` or
//! `--config`), then `SPENDLENS_*` environment variables (`__` separates
//! nested keys, e.g. `SPENDLENS_POLICY__MONTH_AFTER_DAYS`), then CLI flags.
use clap::{Parser, ValueEnum};
use engine::BucketPolicy;
use serde::Deserialize;

use crate::{commands::Command, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/spendlens.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub username: String,
    /// Opaque credential; only ever read from the file or the environment.
    pub password: String,
    /// JSON ledger loaded at session start.
    pub ledger: Option<String>,
    pub level: String,
    pub format: OutputFormat,
    pub policy: BucketPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: "local".to_string(),
            password: String::new(),
            ledger: None,
            level: "info".to_string(),
            format: OutputFormat::Text,
            policy: BucketPolicy::default(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "spendlens", disable_version_flag = true)]
#[command(about = "Income and spending summaries for a transaction ledger")]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<String>,
    /// Override username (password is never read from CLI).
    #[arg(long, global = true)]
    username: Option<String>,
    /// Override ledger path (JSON array of transactions).
    #[arg(long, global = true)]
    ledger: Option<String>,
    /// Override log level.
    #[arg(long, global = true)]
    level: Option<String>,
    /// Override output format.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,
    #[command(subcommand)]
    pub command: Command,
}

/// Parses the process arguments and resolves the settings.
pub fn load() -> Result<(Settings, Command)> {
    let args = Args::parse();
    let settings = resolve(&args)?;
    Ok((settings, args.command))
}

pub fn resolve(args: &Args) -> Result<Settings> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(
        config::Environment::with_prefix("SPENDLENS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );
    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if let Some(username) = &args.username {
        settings.username = username.clone();
    }
    if let Some(ledger) = &args.ledger {
        settings.ledger = Some(ledger.clone());
    }
    if let Some(level) = &args.level {
        settings.level = level.clone();
    }
    if let Some(format) = args.format {
        settings.format = format;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use super::*;

    #[test]
    fn file_values_are_overridden_by_flags() {
        let dir = env::temp_dir().join(format!("spendlens-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        fs::write(
            &path,
            "username = \"alice\"\nformat = \"json\"\n\n[policy]\nmonth_after_days = 90\n",
        )
        .unwrap();

        let path = path.display().to_string();
        let args = Args::try_parse_from([
            "spendlens",
            "--config",
            path.as_str(),
            "--username",
            "bob",
            "categories",
        ])
        .unwrap();
        let settings = resolve(&args).unwrap();

        assert_eq!(settings.username, "bob");
        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(settings.policy.month_after_days, 90);
        assert_eq!(settings.policy.week_after_days, None);
        assert_eq!(settings.level, "info");

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let args = Args::try_parse_from([
            "spendlens",
            "--config",
            "does/not/exist",
            "summary",
            "--from",
            "2025-01-01",
            "--to",
            "2025-01-31",
        ])
        .unwrap();
        let settings = resolve(&args).unwrap();
        assert_eq!(settings.policy, BucketPolicy::default());
        assert!(settings.ledger.is_none());
    }
}
