use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wizard::DEFAULT_WHATSAPP_NUMBER;

pub const DEFAULT_CONFIG_FILE: &str = "jesprec.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub server: ServerConfig,
    pub messaging: MessagingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub url: String,
    pub anon_key: SecretString,
    pub timeout_secs: u64,
    /// Serve from the in-process store instead of the hosted backend.
    pub offline: bool,
    pub offline_admin_email: Option<String>,
    pub offline_admin_password: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
    /// Quote wizard sessions untouched for this long are dropped.
    pub quote_session_idle_secs: u64,
}

#[derive(Clone, Debug)]
pub struct MessagingConfig {
    pub whatsapp_number: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub gateway_url: Option<String>,
    pub gateway_anon_key: Option<String>,
    pub gateway_offline: Option<bool>,
    pub server_port: Option<u16>,
    pub whatsapp_number: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig {
                url: "http://127.0.0.1:54321".to_string(),
                anon_key: String::new().into(),
                timeout_secs: 15,
                offline: false,
                offline_admin_email: None,
                offline_admin_password: None,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
                quote_session_idle_secs: 1800,
            },
            messaging: MessagingConfig { whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string() },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(gateway) = patch.gateway {
            if let Some(url) = gateway.url {
                self.gateway.url = url;
            }
            if let Some(anon_key_value) = gateway.anon_key {
                self.gateway.anon_key = secret_value(anon_key_value);
            }
            if let Some(timeout_secs) = gateway.timeout_secs {
                self.gateway.timeout_secs = timeout_secs;
            }
            if let Some(offline) = gateway.offline {
                self.gateway.offline = offline;
            }
            if let Some(email) = gateway.offline_admin_email {
                self.gateway.offline_admin_email = Some(email);
            }
            if let Some(password) = gateway.offline_admin_password {
                self.gateway.offline_admin_password = Some(secret_value(password));
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
            if let Some(idle_secs) = server.quote_session_idle_secs {
                self.server.quote_session_idle_secs = idle_secs;
            }
        }

        if let Some(messaging) = patch.messaging {
            if let Some(whatsapp_number) = messaging.whatsapp_number {
                self.messaging.whatsapp_number = whatsapp_number;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("JESPREC_GATEWAY_URL") {
            self.gateway.url = value;
        }
        if let Some(value) = read_env("JESPREC_GATEWAY_ANON_KEY") {
            self.gateway.anon_key = secret_value(value);
        }
        if let Some(value) = read_env("JESPREC_GATEWAY_TIMEOUT_SECS") {
            self.gateway.timeout_secs = parse_u64("JESPREC_GATEWAY_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("JESPREC_GATEWAY_OFFLINE") {
            self.gateway.offline = parse_bool("JESPREC_GATEWAY_OFFLINE", &value)?;
        }
        if let Some(value) = read_env("JESPREC_GATEWAY_OFFLINE_ADMIN_EMAIL") {
            self.gateway.offline_admin_email = Some(value);
        }
        if let Some(value) = read_env("JESPREC_GATEWAY_OFFLINE_ADMIN_PASSWORD") {
            self.gateway.offline_admin_password = Some(secret_value(value));
        }

        if let Some(value) = read_env("JESPREC_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("JESPREC_SERVER_PORT") {
            self.server.port = parse_u16("JESPREC_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("JESPREC_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("JESPREC_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }
        if let Some(value) = read_env("JESPREC_SERVER_QUOTE_SESSION_IDLE_SECS") {
            self.server.quote_session_idle_secs =
                parse_u64("JESPREC_SERVER_QUOTE_SESSION_IDLE_SECS", &value)?;
        }

        if let Some(value) = read_env("JESPREC_MESSAGING_WHATSAPP_NUMBER") {
            self.messaging.whatsapp_number = value;
        }

        let log_level =
            read_env("JESPREC_LOGGING_LEVEL").or_else(|| read_env("JESPREC_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("JESPREC_LOGGING_FORMAT").or_else(|| read_env("JESPREC_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(gateway_url) = overrides.gateway_url {
            self.gateway.url = gateway_url;
        }
        if let Some(anon_key) = overrides.gateway_anon_key {
            self.gateway.anon_key = secret_value(anon_key);
        }
        if let Some(offline) = overrides.gateway_offline {
            self.gateway.offline = offline;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(whatsapp_number) = overrides.whatsapp_number {
            self.messaging.whatsapp_number = whatsapp_number;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_gateway(&self.gateway)?;
        validate_server(&self.server)?;
        validate_messaging(&self.messaging)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from("config/jesprec.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_gateway(gateway: &GatewayConfig) -> Result<(), ConfigError> {
    let url = gateway.url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "gateway.url must start with http:// or https://".to_string(),
        ));
    }

    if gateway.timeout_secs == 0 || gateway.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "gateway.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if gateway.offline {
        let has_password = gateway
            .offline_admin_password
            .as_ref()
            .map(|value| !value.expose_secret().is_empty())
            .unwrap_or(false);
        if has_password && gateway.offline_admin_email.is_none() {
            return Err(ConfigError::Validation(
                "gateway.offline_admin_password is set but gateway.offline_admin_email is missing"
                    .to_string(),
            ));
        }
        return Ok(());
    }

    if gateway.anon_key.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "gateway.anon_key is required. Copy the anon/public key from your project's API settings, or set gateway.offline = true for local development".to_string()
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    if server.quote_session_idle_secs == 0 {
        return Err(ConfigError::Validation(
            "server.quote_session_idle_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_messaging(messaging: &MessagingConfig) -> Result<(), ConfigError> {
    let number = messaging.whatsapp_number.trim();
    let digits_only = !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
    if !digits_only || !(7..=15).contains(&number.len()) {
        return Err(ConfigError::Validation(
            "messaging.whatsapp_number must be 7-15 digits in international format without `+` (e.g. 2348000000000)".to_string(),
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    gateway: Option<GatewayPatch>,
    server: Option<ServerPatch>,
    messaging: Option<MessagingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayPatch {
    url: Option<String>,
    anon_key: Option<String>,
    timeout_secs: Option<u64>,
    offline: Option<bool>,
    offline_admin_email: Option<String>,
    offline_admin_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
    quote_session_idle_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct MessagingPatch {
    whatsapp_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
