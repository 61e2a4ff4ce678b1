mod file_config;

pub use file_config::FileConfig;

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub data_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .or_else(|| cli.data_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("data_dir must be specified via --data-dir or in config file")
            })?;

        if !data_dir.exists() {
            bail!("Data directory does not exist: {:?}", data_dir);
        }
        if !data_dir.is_dir() {
            bail!("data_dir is not a directory: {:?}", data_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        Ok(Self {
            data_dir,
            port,
            logging_level,
            frontend_dir_path,
        })
    }

    pub fn history_file_path(&self) -> PathBuf {
        self.data_dir.join("notification-history.json")
    }
}

/// Mail transport configuration, read once from the environment at startup.
///
/// When `SMTP_HOST` is set the custom host/port/secure-flag mode is used;
/// otherwise the Gmail profile (smtp.gmail.com:587, STARTTLS) applies and
/// `SMTP_PORT`/`SMTP_SECURE` are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct SmtpSettings {
    pub user: String,
    pub pass: String,
    pub host: String,
    pub port: u16,
    /// Implicit TLS when true; STARTTLS otherwise
    pub secure: bool,
    pub from: String,
    /// The single fixed recipient every alert goes to
    pub recipient: String,
}

impl SmtpSettings {
    /// Returns None when SMTP_USER or SMTP_PASS is missing, in which case
    /// alert sending is disabled and requests fail fast with 503.
    pub fn from_env() -> Option<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Pure resolution over an environment snapshot, deterministic given the
    /// lookup function.
    pub fn resolve<F>(get: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user = get("SMTP_USER").filter(|s| !s.is_empty())?;
        let pass = get("SMTP_PASS").filter(|s| !s.is_empty())?;

        let custom_host = get("SMTP_HOST").filter(|s| !s.is_empty());
        let port = match &custom_host {
            Some(_) => get("SMTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            None => DEFAULT_SMTP_PORT,
        };
        let secure = custom_host.is_some() && get("SMTP_SECURE").as_deref() == Some("true");
        let host = custom_host.unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());

        let from = get("SMTP_FROM")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| user.clone());
        let recipient = get("ALERT_RECIPIENT")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| user.clone());

        Some(Self {
            user,
            pass,
            host,
            port,
            secure,
            from,
            recipient,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
