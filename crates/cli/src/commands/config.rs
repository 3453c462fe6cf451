use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use jesprec_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct Field {
    key: &'static str,
    env_key: &'static str,
    value: String,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_key,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {} = {} (source: {source})", field.key, field.value));
    }
    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let field = |key, env_key, value: String| Field { key, env_key, value };
    let gateway = &config.gateway;
    vec![
        field("gateway.url", "JESPREC_GATEWAY_URL", gateway.url.clone()),
        field(
            "gateway.anon_key",
            "JESPREC_GATEWAY_ANON_KEY",
            redact_secret(gateway.anon_key.expose_secret()),
        ),
        field("gateway.timeout_secs", "JESPREC_GATEWAY_TIMEOUT_SECS", gateway.timeout_secs.to_string()),
        field("gateway.offline", "JESPREC_GATEWAY_OFFLINE", gateway.offline.to_string()),
        field(
            "gateway.offline_admin_email",
            "JESPREC_GATEWAY_OFFLINE_ADMIN_EMAIL",
            gateway.offline_admin_email.clone().unwrap_or_else(|| "<unset>".to_string()),
        ),
        field(
            "gateway.offline_admin_password",
            "JESPREC_GATEWAY_OFFLINE_ADMIN_PASSWORD",
            gateway
                .offline_admin_password
                .as_ref()
                .map(|password| redact_secret(password.expose_secret()))
                .unwrap_or_else(|| "<unset>".to_string()),
        ),
        field("server.bind_address", "JESPREC_SERVER_BIND_ADDRESS", config.server.bind_address.clone()),
        field("server.port", "JESPREC_SERVER_PORT", config.server.port.to_string()),
        field(
            "server.graceful_shutdown_secs",
            "JESPREC_SERVER_GRACEFUL_SHUTDOWN_SECS",
            config.server.graceful_shutdown_secs.to_string(),
        ),
        field(
            "server.quote_session_idle_secs",
            "JESPREC_SERVER_QUOTE_SESSION_IDLE_SECS",
            config.server.quote_session_idle_secs.to_string(),
        ),
        field(
            "messaging.whatsapp_number",
            "JESPREC_MESSAGING_WHATSAPP_NUMBER",
            config.messaging.whatsapp_number.clone(),
        ),
        field("logging.level", "JESPREC_LOGGING_LEVEL", config.logging.level.clone()),
        field("logging.format", "JESPREC_LOGGING_FORMAT", format!("{:?}", config.logging.format)),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("jesprec.toml"), PathBuf::from("config/jesprec.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

/// Keeps the first four characters so operators can tell keys apart.
fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }
    if trimmed.chars().count() <= 8 {
        return "<redacted>".to_string();
    }
    let prefix: String = trimmed.chars().take(4).collect();
    format!("{prefix}***")
}
