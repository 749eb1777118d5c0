//! # flowmail-adapter-mail-smtp-lettre
//!
//! Outbound email over SMTP using [lettre](https://docs.rs/lettre).
//!
//! ## Responsibilities
//! - Implement the `Mailer` port defined in `flowmail-app::ports`
//! - Build the SMTP transport once from [`SmtpConfig`]
//! - Render each message as plain text with an HTML alternative
//!
//! ## Dependency rule
//! Depends on `flowmail-app` (for the port trait) and `flowmail-domain`.
//! The `app` and `domain` crates must never reference this adapter.

mod config;
mod error;
mod mailer;

pub use config::{SmtpConfig, SmtpSecurity};
pub use error::MailError;
pub use mailer::SmtpMailer;
