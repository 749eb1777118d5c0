//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `flowmail.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;

use serde::Deserialize;

use flowmail_adapter_mail_smtp_lettre::{SmtpConfig, SmtpSecurity};
use flowmail_app::execution_engine::{DEFAULT_MAX_STEPS, DEFAULT_SUBJECT, EngineConfig};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Outbound SMTP settings.
    pub mail: MailConfig,
    /// Execution engine tunables.
    pub engine: EngineSection,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Built editor frontend to serve at `/`.
    pub frontend_dir: Option<PathBuf>,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// SMTP configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender address on every email.
    pub from: String,
    pub security: SmtpSecurity,
}

/// `[engine]` table.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Subject line of every email an action step sends.
    pub subject: String,
    /// Steps one run may visit before it is stopped.
    pub max_steps: usize,
}

impl Config {
    /// Load configuration from `flowmail.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("FLOWMAIL_CONFIG").unwrap_or_else(|_| "flowmail.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides from `lookup`, later keys winning over earlier ones.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("FLOWMAIL_HOST") {
            self.server.host = val;
        }
        for key in ["PORT", "FLOWMAIL_PORT"] {
            if let Some(port) = lookup(key).and_then(|val| val.parse().ok()) {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("FLOWMAIL_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = lookup("FLOWMAIL_FRONTEND_DIR") {
            self.server.frontend_dir = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("FLOWMAIL_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = lookup("FLOWMAIL_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("SMTP_HOST") {
            self.mail.host = val;
        }
        if let Some(port) = lookup("SMTP_PORT").and_then(|val| val.parse().ok()) {
            self.mail.port = port;
        }
        if let Some(val) = lookup("SMTP_USER") {
            self.mail.username = Some(val);
        }
        if let Some(val) = lookup("SMTP_PASS") {
            self.mail.password = Some(val);
        }
        if let Some(val) = lookup("SMTP_FROM") {
            self.mail.from = val;
        }
        if let Some(security) = lookup("SMTP_SECURITY").and_then(|val| val.parse().ok()) {
            self.mail.security = security;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.mail.port == 0 {
            return Err(ConfigError::Validation(
                "mail.port must be non-zero".to_string(),
            ));
        }
        if self.engine.max_steps == 0 {
            return Err(ConfigError::Validation(
                "engine.max_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    #[must_use]
    pub fn smtp(&self) -> SmtpConfig {
        SmtpConfig {
            host: self.mail.host.clone(),
            port: self.mail.port,
            username: self.mail.username.clone(),
            password: self.mail.password.clone(),
            from: self.mail.from.clone(),
            security: self.mail.security,
        }
    }

    #[must_use]
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            subject: self.engine.subject.clone(),
            max_steps: self.engine.max_steps,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            frontend_dir: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:flowmail.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "flowmaild=info,flowmail=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        let smtp = SmtpConfig::default();
        Self {
            host: smtp.host,
            port: smtp.port,
            username: None,
            password: None,
            from: smtp.from,
            security: smtp.security,
        }
    }
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_env(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).cloned());
        config
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5001);
        assert!(config.server.frontend_dir.is_none());
        assert_eq!(config.database.url, "sqlite:flowmail.db?mode=rwc");
        assert_eq!(config.mail.host, "localhost");
        assert_eq!(config.mail.port, 587);
        assert_eq!(config.mail.from, "noreply@flowmail.com");
        assert_eq!(config.mail.security, SmtpSecurity::Opportunistic);
        assert_eq!(config.engine.subject, "FlowMail Automation");
        assert_eq!(config.engine.max_steps, 1000);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 5001);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [server]
            host = '127.0.0.1'
            port = 9090
            frontend_dir = 'flow-automator/dist'

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'

            [mail]
            host = 'smtp.example.com'
            port = 465
            username = 'mailer'
            password = 'secret'
            from = 'flows@example.com'
            security = 'tls'

            [engine]
            subject = 'Hello from FlowMail'
            max_steps = 50
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(
            config.server.frontend_dir,
            Some(PathBuf::from("flow-automator/dist"))
        );
        assert_eq!(config.database.url, "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.mail.host, "smtp.example.com");
        assert_eq!(config.mail.port, 465);
        assert_eq!(config.mail.username.as_deref(), Some("mailer"));
        assert_eq!(config.mail.security, SmtpSecurity::Tls);
        assert_eq!(config.engine.subject, "Hello from FlowMail");
        assert_eq!(config.engine.max_steps, 50);
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 5001);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_smtp_port() {
        let mut config = Config::default();
        config.mail.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_step_limit() {
        let mut config = Config::default();
        config.engine.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_format_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:5001");
    }

    #[test]
    fn should_return_database_url() {
        let config = Config::default();
        assert_eq!(config.database_url(), "sqlite:flowmail.db?mode=rwc");
    }

    #[test]
    fn should_prefer_flowmail_port_over_plain_port() {
        let config = with_env(&[("PORT", "8000"), ("FLOWMAIL_PORT", "8001")]);
        assert_eq!(config.server.port, 8001);
        let config = with_env(&[("PORT", "8000")]);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn should_apply_bind_override() {
        let config = with_env(&[("FLOWMAIL_BIND", "127.0.0.1:7000")]);
        assert_eq!(config.bind_addr(), "127.0.0.1:7000");
    }

    #[test]
    fn should_ignore_unparseable_port_override() {
        let config = with_env(&[("FLOWMAIL_PORT", "eighty")]);
        assert_eq!(config.server.port, 5001);
    }

    #[test]
    fn should_let_rust_log_win_over_flowmail_log() {
        let config = with_env(&[("FLOWMAIL_LOG", "warn"), ("RUST_LOG", "trace")]);
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_apply_smtp_overrides() {
        let config = with_env(&[
            ("SMTP_HOST", "mail.local"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USER", "u"),
            ("SMTP_PASS", "p"),
            ("SMTP_FROM", "me@mail.local"),
            ("SMTP_SECURITY", "none"),
        ]);
        let smtp = config.smtp();
        assert_eq!(smtp.host, "mail.local");
        assert_eq!(smtp.port, 2525);
        assert_eq!(smtp.username.as_deref(), Some("u"));
        assert_eq!(smtp.password.as_deref(), Some("p"));
        assert_eq!(smtp.from, "me@mail.local");
        assert_eq!(smtp.security, SmtpSecurity::None);
    }

    #[test]
    fn should_build_engine_config_from_section() {
        let config: Config = toml::from_str("[engine]\nmax_steps = 7").unwrap();
        let engine = config.engine();
        assert_eq!(engine.max_steps, 7);
        assert_eq!(engine.subject, "FlowMail Automation");
    }

    #[test]
    fn should_parse_partial_toml_with_defaults() {
        let toml = "
            [server]
            port = 8080
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.url, "sqlite:flowmail.db?mode=rwc");
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
