use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_email_address, validate_non_empty_string, validate_required_field, validate_url,
    Validate,
};
use std::collections::HashMap;
use std::path::Path;

pub const SENDER_ADDRESS: &str = "MAIL_SENDER_ADDRESS";
pub const RECIPIENT_ADDRESS: &str = "MAIL_RECIPIENT_ADDRESS";
pub const CLIENT_ID: &str = "MAIL_CLIENT_ID";
pub const CLIENT_SECRET: &str = "MAIL_CLIENT_SECRET";
pub const TENANT_ID: &str = "MAIL_TENANT_ID";
pub const SERVER: &str = "MAIL_SERVER";
pub const AUTHORITY: &str = "MAIL_AUTHORITY";

pub const DEFAULT_SERVER: &str = "graph.microsoft.com";
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Raw mail settings as found at startup. Values stay optional here; they are
/// checked when a mail client is built, so a half-configured deployment still
/// starts and reports the problem on first use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailEnvironment {
    pub sender_address: Option<String>,
    pub recipient_address: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub tenant_id: Option<String>,
    pub server: Option<String>,
    pub authority: Option<String>,
}

/// Settings with every required value present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub sender_address: String,
    pub recipient_address: Option<String>,
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
    /// Base URL of the mail API, scheme included.
    pub server_url: String,
    /// Base URL of the identity provider, scheme included.
    pub authority_url: String,
}

impl MailEnvironment {
    /// Reads the process environment, then fills gaps from the optional TOML
    /// file at `env_file`. A variable that is already set is never replaced
    /// by the file. A file that cannot be read or parsed is skipped with a
    /// warning; problems with the values surface when a client is built.
    pub fn load(env_file: Option<&Path>) -> Self {
        Self::layered(|key| std::env::var(key).ok(), env_file)
    }

    /// Same as [`MailEnvironment::load`] with an injectable primary source.
    pub fn layered<E>(primary: E, env_file: Option<&Path>) -> Self
    where
        E: Fn(&str) -> Option<String>,
    {
        let file_values = match env_file {
            Some(path) if path.exists() => {
                tracing::info!("Loading fallback mail settings from {}", path.display());
                read_env_file(path).unwrap_or_else(|e| {
                    tracing::warn!("Ignoring settings file {}: {}", path.display(), e);
                    HashMap::new()
                })
            }
            Some(path) => {
                tracing::debug!("No settings file at {}, using environment only", path.display());
                HashMap::new()
            }
            None => HashMap::new(),
        };

        Self::from_lookup(|key| primary(key).or_else(|| file_values.get(key).cloned()))
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // 空字串視同未設定
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            sender_address: get(SENDER_ADDRESS),
            recipient_address: get(RECIPIENT_ADDRESS),
            client_id: get(CLIENT_ID),
            client_secret: get(CLIENT_SECRET),
            tenant_id: get(TENANT_ID),
            server: get(SERVER),
            authority: get(AUTHORITY),
        }
    }

    pub fn settings(&self) -> Result<MailSettings> {
        let settings = MailSettings {
            sender_address: validate_required_field(SENDER_ADDRESS, &self.sender_address)?.clone(),
            recipient_address: self.recipient_address.clone(),
            client_id: validate_required_field(CLIENT_ID, &self.client_id)?.clone(),
            client_secret: validate_required_field(CLIENT_SECRET, &self.client_secret)?.clone(),
            tenant_id: validate_required_field(TENANT_ID, &self.tenant_id)?.clone(),
            server_url: with_scheme(self.server.as_deref().unwrap_or(DEFAULT_SERVER)),
            authority_url: with_scheme(self.authority.as_deref().unwrap_or(DEFAULT_AUTHORITY)),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Logs what was found without revealing the client secret.
    pub fn log_summary(&self) {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "Not set".to_string());
        tracing::info!("Mail configuration (environment wins over settings file):");
        tracing::info!("  {}: {}", SENDER_ADDRESS, show(&self.sender_address));
        tracing::info!("  {}: {}", RECIPIENT_ADDRESS, show(&self.recipient_address));
        tracing::info!("  {}: {}", CLIENT_ID, show(&self.client_id));
        tracing::info!("  {}: {}", TENANT_ID, show(&self.tenant_id));
        tracing::info!(
            "  {}: {}",
            CLIENT_SECRET,
            self.client_secret
                .as_ref()
                .map(|s| "*".repeat(s.len()))
                .unwrap_or_else(|| "Not set".to_string())
        );
        tracing::info!(
            "  {}: {}",
            SERVER,
            self.server.as_deref().unwrap_or(DEFAULT_SERVER)
        );
    }
}

impl Validate for MailSettings {
    fn validate(&self) -> Result<()> {
        validate_email_address(SENDER_ADDRESS, &self.sender_address)?;
        validate_non_empty_string(CLIENT_ID, &self.client_id)?;
        validate_non_empty_string(TENANT_ID, &self.tenant_id)?;
        validate_url(SERVER, &self.server_url)?;
        validate_url(AUTHORITY, &self.authority_url)?;
        Ok(())
    }
}

fn with_scheme(host_or_url: &str) -> String {
    let trimmed = host_or_url.trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Parses a flat `KEY = "value"` TOML file. Non-string scalars are accepted
/// and stringified; tables and arrays are rejected.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&content).map_err(|e| {
        AppError::config(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    let mut values = HashMap::new();
    for (key, value) in table {
        let text = match value {
            toml::Value::String(s) => s,
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            other => {
                return Err(AppError::InvalidConfigValueError {
                    field: key,
                    value: other.to_string(),
                    reason: "Settings file values must be scalars".to_string(),
                })
            }
        };
        values.insert(key, text);
    }
    Ok(values)
}
