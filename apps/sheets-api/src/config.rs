use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::sheets::{Action, SheetType, ValueInputOption};
use crate::validation::ValidationPolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0} not configured")]
    Missing(&'static str),
    #[error("Credentials file not found: {0}")]
    CredentialsNotFound(PathBuf),
    #[error("Invalid value for {name}: {value:?} (expected {expected})")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("Cannot determine working directory: {0}")]
    WorkingDir(#[from] std::io::Error),
}

/// Deployment flavour. Anything other than `development` runs strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Sheets proxy configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    /// Target spreadsheet. May be empty in development.
    pub spreadsheet_id: String,
    /// Absolute path of the service-account key file.
    pub credentials_path: PathBuf,
    /// Shared secret expected in `X-API-Key`.
    pub api_key: Option<String>,
    /// Origins allowed to call cross-site; `*` allows any.
    pub allowed_origins: Vec<String>,
    pub policy: ValidationPolicy,
    /// `tipo` values accepted by this deployment.
    pub sheet_types: Vec<SheetType>,
    /// Action used when the query string has none.
    pub default_action: Action,
    pub value_input_option: ValueInputOption,
    /// Mounts `GET /sheets/test`.
    pub diagnostics_enabled: bool,
    /// Port the HTTP server binds to.
    pub port: u16,
}

const DEFAULT_CREDENTIALS_PATH: &str = "credentials/google.json";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost";
const DEFAULT_SHEET_TYPES: &str = "logistica,contactos";

impl Config {
    /// Load configuration from the process environment, resolving relative
    /// paths against the working directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let root = std::env::current_dir()?;
        Self::from_lookup(|name| std::env::var(name).ok(), &root)
    }

    /// Load configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F, root: &Path) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let environment = match var("ENVIRONMENT").as_deref() {
            Some("development") => Environment::Development,
            Some("production") | None => Environment::Production,
            Some(other) => {
                tracing::warn!(environment = other, "unknown ENVIRONMENT, running as production");
                Environment::Production
            }
        };
        let is_dev = environment == Environment::Development;

        let credentials_path = resolve_path(
            &var("GOOGLE_CREDENTIALS_PATH").unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.to_string()),
            root,
        );

        let allowed_origins = var("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let policy = ValidationPolicy {
            require_api_key: parse_bool("REQUIRE_API_KEY", var("REQUIRE_API_KEY"), false)?,
            require_referer_match: parse_bool(
                "REQUIRE_REFERER_MATCH",
                var("REQUIRE_REFERER_MATCH"),
                true,
            )?,
        };

        let sheet_types = var("SHEET_TYPES")
            .unwrap_or_else(|| DEFAULT_SHEET_TYPES.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|name| {
                SheetType::from_wire(name).ok_or_else(|| ConfigError::Invalid {
                    name: "SHEET_TYPES",
                    value: name.to_string(),
                    expected: "logistica, contactos or usuarios",
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let default_action = match var("DEFAULT_ACTION") {
            None => Action::Write,
            Some(v) => Action::from_wire(&v).ok_or(ConfigError::Invalid {
                name: "DEFAULT_ACTION",
                value: v,
                expected: "read or write",
            })?,
        };

        let value_input_option = match var("VALUE_INPUT_OPTION") {
            None => ValueInputOption::UserEntered,
            Some(v) => ValueInputOption::from_wire(&v).ok_or(ConfigError::Invalid {
                name: "VALUE_INPUT_OPTION",
                value: v,
                expected: "RAW or USER_ENTERED",
            })?,
        };

        let port = match var("PORT") {
            None => 8080,
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: v,
                expected: "a port number",
            })?,
        };

        let config = Self {
            environment,
            spreadsheet_id: var("SPREADSHEET_ID").unwrap_or_default(),
            credentials_path,
            api_key: var("API_KEY"),
            allowed_origins,
            policy,
            sheet_types,
            default_action,
            value_input_option,
            diagnostics_enabled: parse_bool(
                "DIAGNOSTICS_ENABLED",
                var("DIAGNOSTICS_ENABLED"),
                is_dev,
            )?,
            port,
        };

        if !is_dev {
            config.check_required()?;
        }
        Ok(config)
    }

    /// Settings that must be present outside development.
    fn check_required(&self) -> Result<(), ConfigError> {
        if self.spreadsheet_id.is_empty() {
            return Err(ConfigError::Missing("SPREADSHEET_ID"));
        }
        if self.policy.require_api_key && self.api_key.is_none() {
            return Err(ConfigError::Missing("API_KEY"));
        }
        if !self.credentials_path.is_file() {
            return Err(ConfigError::CredentialsNotFound(self.credentials_path.clone()));
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

/// Load `.env` (without overriding the real environment), then
/// `.env.local` (overriding). Both files are optional.
pub fn load_env_files() {
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }
    let _ = dotenvy::from_filename_override(".env.local");
}

fn resolve_path(raw: &str, root: &Path) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() || raw.starts_with('/') || raw.starts_with('\\') {
        return path.to_path_buf();
    }
    let mut relative = raw;
    while let Some(rest) = relative.strip_prefix("./") {
        relative = rest;
    }
    root.join(relative)
}

fn parse_bool(name: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value,
            expected: "true or false",
        }),
    }
}
