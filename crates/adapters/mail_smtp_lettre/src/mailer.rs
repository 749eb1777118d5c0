//! [`Mailer`] implementation over an async lettre transport.

use lettre::message::{Mailbox, MultiPart};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use flowmail_app::ports::Mailer;
use flowmail_domain::email::EmailAddress;
use flowmail_domain::error::FlowMailError;

use crate::error::MailError;

/// Sends each email as one SMTP transaction, without retry.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub(crate) fn new(transport: AsyncSmtpTransport<Tokio1Executor>, from: String) -> Self {
        Self { transport, from }
    }
}

impl Mailer for SmtpMailer {
    #[tracing::instrument(skip_all, fields(to = %to))]
    async fn send(&self, to: &EmailAddress, subject: &str, body: &str) -> Result<(), FlowMailError> {
        let message = build_message(&self.from, to, subject, body)?;
        let response = self.transport.send(message).await.map_err(MailError::from)?;
        tracing::info!(code = %response.code(), "email sent");
        Ok(())
    }
}

fn build_message(
    from: &str,
    to: &EmailAddress,
    subject: &str,
    body: &str,
) -> Result<Message, MailError> {
    let from: Mailbox = from.parse()?;
    let to: Mailbox = to.as_str().parse()?;
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(MultiPart::alternative_plain_html(
            body.to_string(),
            html_body(body),
        ))?;
    Ok(message)
}

/// Wrap `text` in a paragraph, escaping markup.
fn html_body(text: &str) -> String {
    let mut html = String::with_capacity(text.len() + 7);
    html.push_str("<p>");
    for c in text.chars() {
        match c {
            '&' => html.push_str("&amp;"),
            '<' => html.push_str("&lt;"),
            '>' => html.push_str("&gt;"),
            '"' => html.push_str("&quot;"),
            '\'' => html.push_str("&#39;"),
            other => html.push(other),
        }
    }
    html.push_str("</p>");
    html
}
