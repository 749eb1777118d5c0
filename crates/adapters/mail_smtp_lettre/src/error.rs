//! Mail-specific error type wrapping lettre errors.

use flowmail_domain::error::FlowMailError;

/// Errors originating from the SMTP mail adapter.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The configured from-address or a recipient could not be parsed.
    #[error("invalid mailbox address")]
    Address(#[from] lettre::address::AddressError),

    /// The message could not be assembled.
    #[error("failed to build message")]
    Message(#[from] lettre::error::Error),

    /// Connecting, authenticating or delivering failed.
    #[error("SMTP transport error")]
    Transport(#[from] lettre::transport::smtp::Error),
}

impl From<MailError> for FlowMailError {
    fn from(err: MailError) -> Self {
        Self::Delivery(Box::new(err))
    }
}
