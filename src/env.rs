use std::fmt;
use std::path::Path;

use crate::reconcile::TrailingRows;

const DEFAULT_DATABASE_URL: &str = "sqlite://sports-hall.db?mode=rwc";
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_CDN_UPLOAD_URL: &str = "https://cdn.poehali.dev/upload";
const DEFAULT_UPLOAD_LIMIT_MIB: u64 = 20;

/// Loads the env files for the active profile and returns the ones found.
/// Runs before tracing is up, so callers log the result themselves.
pub fn load_environment() -> Result<Vec<&'static str>, dotenvy::Error> {
    let is_production =
        dotenvy::var("ROCKET_PROFILE").unwrap_or("development".to_string()) == "production";

    let env_files = if is_production {
        vec!["config/common.env", "config/prod.env", ".secrets.env"]
    } else {
        vec!["config/common.env", "config/dev.env", ".secrets.env"]
    };

    let mut loaded = Vec::new();
    for env_file in env_files {
        if load_env_file(env_file)? {
            loaded.push(env_file);
        }
    }

    Ok(loaded)
}

fn load_env_file(path: &str) -> Result<bool, dotenvy::Error> {
    if !Path::new(path).exists() {
        return Ok(false);
    }

    dotenvy::from_filename_override(path)?;
    Ok(true)
}

fn non_empty_var(key: &str) -> Option<String> {
    dotenvy::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub recipient: String,
}

impl SmtpSettings {
    /// `None` unless host, user and password are all set.
    pub fn from_env() -> Option<Self> {
        let host = non_empty_var("SMTP_HOST")?;
        let user = non_empty_var("SMTP_USER")?;
        let password = non_empty_var("SMTP_PASSWORD")?;

        let port = non_empty_var("SMTP_PORT")
            .and_then(|port| port.parse().ok())
            .unwrap_or(DEFAULT_SMTP_PORT);
        let recipient = non_empty_var("FEEDBACK_RECIPIENT").unwrap_or_else(|| user.clone());

        Some(Self {
            host,
            port,
            user,
            password,
            recipient,
        })
    }

    pub fn implicit_tls(&self) -> bool {
        self.port == DEFAULT_SMTP_PORT
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("recipient", &self.recipient)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct CdnSettings {
    pub api_key: String,
    pub project_id: String,
    pub upload_url: String,
}

impl CdnSettings {
    pub fn from_env() -> Option<Self> {
        let api_key = non_empty_var("CDN_API_KEY")?;
        let project_id = non_empty_var("PROJECT_ID")?;
        let upload_url =
            non_empty_var("CDN_UPLOAD_URL").unwrap_or_else(|| DEFAULT_CDN_UPLOAD_URL.to_string());

        Some(Self {
            api_key,
            project_id,
            upload_url,
        })
    }
}

impl fmt::Debug for CdnSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdnSettings")
            .field("project_id", &self.project_id)
            .field("upload_url", &self.upload_url)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Default)]
pub struct TelemetrySettings {
    pub otlp_endpoint: Option<String>,
    pub otlp_api_key: Option<String>,
}

impl TelemetrySettings {
    pub fn from_env() -> Self {
        Self {
            otlp_endpoint: non_empty_var("OTLP_ENDPOINT"),
            otlp_api_key: non_empty_var("OTLP_API_KEY"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub smtp: Option<SmtpSettings>,
    pub cdn: Option<CdnSettings>,
    pub trailing_rows: TrailingRows,
    pub upload_limit_mib: u64,
    pub telemetry: TelemetrySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            smtp: None,
            cdn: None,
            trailing_rows: TrailingRows::Retain,
            upload_limit_mib: DEFAULT_UPLOAD_LIMIT_MIB,
            telemetry: TelemetrySettings::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let prune = non_empty_var("SPORTS_PRUNE_TRAILING_ROWS")
            .map(|value| value.eq_ignore_ascii_case("true") || value == "1")
            .unwrap_or(false);

        Self {
            database_url: non_empty_var("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            smtp: SmtpSettings::from_env(),
            cdn: CdnSettings::from_env(),
            trailing_rows: if prune {
                TrailingRows::Prune
            } else {
                TrailingRows::Retain
            },
            upload_limit_mib: non_empty_var("UPLOAD_LIMIT_MIB")
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_UPLOAD_LIMIT_MIB),
            telemetry: TelemetrySettings::from_env(),
        }
    }
}
