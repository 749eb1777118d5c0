//! Mailer port — sends one email to one recipient.

use std::future::Future;
use std::sync::Arc;

use flowmail_domain::email::EmailAddress;
use flowmail_domain::error::FlowMailError;

/// Outbound mail delivery.
///
/// A single attempt per call. Callers decide what a failure means; the
/// execution engine logs it and moves on.
pub trait Mailer {
    /// Send `body` to `to` with the given subject.
    fn send(
        &self,
        to: &EmailAddress,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), FlowMailError>> + Send;
}

impl<T: Mailer + Send + Sync> Mailer for Arc<T> {
    fn send(
        &self,
        to: &EmailAddress,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), FlowMailError>> + Send {
        (**self).send(to, subject, body)
    }
}
