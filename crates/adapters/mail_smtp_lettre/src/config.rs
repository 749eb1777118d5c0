//! SMTP transport configuration.

use std::fmt;

use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, Tokio1Executor};
use serde::Deserialize;

use crate::error::MailError;
use crate::mailer::SmtpMailer;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 587;
pub const DEFAULT_FROM: &str = "noreply@flowmail.com";

/// How the connection to the SMTP server is secured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmtpSecurity {
    /// Plain connection, never upgraded.
    None,
    /// Upgrade with STARTTLS when the server offers it.
    #[default]
    Opportunistic,
    /// Implicit TLS from the first byte.
    Tls,
}

impl std::str::FromStr for SmtpSecurity {
    type Err = UnknownSecurity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "plain" => Ok(Self::None),
            "opportunistic" | "starttls" => Ok(Self::Opportunistic),
            "tls" | "ssl" => Ok(Self::Tls),
            other => Err(UnknownSecurity(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown SMTP security mode: {0}")]
pub struct UnknownSecurity(pub String);

/// Connection settings for [`SmtpMailer`].
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub security: SmtpSecurity,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            from: DEFAULT_FROM.to_string(),
            security: SmtpSecurity::default(),
        }
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("from", &self.from)
            .field("security", &self.security)
            .finish()
    }
}

impl SmtpConfig {
    fn credentials(&self) -> Option<Credentials> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        Some(Credentials::new(
            username.to_string(),
            self.password.clone().unwrap_or_default(),
        ))
    }

    /// Build the transport and wrap it in an [`SmtpMailer`].
    ///
    /// No connection is opened here; the first send connects.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Transport`] when TLS parameters cannot be built
    /// for `host`.
    pub fn build(self) -> Result<SmtpMailer, MailError> {
        let mut builder = match self.security {
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
            }
            SmtpSecurity::Opportunistic => {
                let params = TlsParameters::new(self.host.clone())?;
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
                    .tls(Tls::Opportunistic(params))
            }
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)?,
        }
        .port(self.port);
        if let Some(credentials) = self.credentials() {
            builder = builder.credentials(credentials);
        }
        tracing::debug!(host = %self.host, port = self.port, security = ?self.security, "SMTP transport configured");
        Ok(SmtpMailer::new(builder.build(), self.from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_local_submission_port_with_opportunistic_tls() {
        let config = SmtpConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 587);
        assert_eq!(config.from, "noreply@flowmail.com");
        assert_eq!(config.security, SmtpSecurity::Opportunistic);
    }

    #[test]
    fn should_parse_security_aliases() {
        assert_eq!("STARTTLS".parse(), Ok(SmtpSecurity::Opportunistic));
        assert_eq!("none".parse(), Ok(SmtpSecurity::None));
        assert_eq!(" ssl ".parse(), Ok(SmtpSecurity::Tls));
        assert!("maybe".parse::<SmtpSecurity>().is_err());
    }

    #[test]
    fn should_skip_credentials_without_username() {
        let config = SmtpConfig {
            username: Some(String::new()),
            password: Some("secret".to_string()),
            ..SmtpConfig::default()
        };
        assert!(config.credentials().is_none());
    }

    #[test]
    fn should_redact_password_in_debug_output() {
        let config = SmtpConfig {
            password: Some("hunter2".to_string()),
            ..SmtpConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("***"));
    }

    #[tokio::test]
    async fn should_build_transport_for_each_security_mode() {
        for security in [SmtpSecurity::None, SmtpSecurity::Opportunistic, SmtpSecurity::Tls] {
            let config = SmtpConfig {
                security,
                ..SmtpConfig::default()
            };
            assert!(config.build().is_ok(), "{security:?}");
        }
    }
}
