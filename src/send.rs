//! Delivery of the composed message by email over SMTP.

use anyhow::{Context, Result};
use lettre::{
    Message, Transport, message::header::ContentType, transport::smtp::SmtpTransport,
    transport::smtp::authentication::Credentials,
};

use crate::config::EmailSettings;

const SUBJECT: &str = "Weather";

/// Plain-text UTF-8 message with the fixed subject.
pub fn build_email(from: &str, to: &str, body: &str) -> Result<Message> {
    let email = Message::builder()
        .from(from.parse().context("Failed to parse from address")?)
        .to(to.parse().context("Failed to parse to address")?)
        .subject(SUBJECT)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())?;
    Ok(email)
}

fn create_mailer(settings: &EmailSettings) -> Result<SmtpTransport> {
    let credentials = Credentials::new(settings.username.clone(), settings.password.clone());

    let mailer = SmtpTransport::starttls_relay(&settings.smtp_host)
        .with_context(|| format!("Failed to set up SMTP relay {}", settings.smtp_host))?
        .credentials(credentials)
        .build();

    Ok(mailer)
}

/// Send `body` to the configured recipient, usually an SMS gateway address.
pub fn send_message(settings: &EmailSettings, body: &str) -> Result<()> {
    let email = build_email(&settings.username, &settings.recipient, body)?;
    let mailer = create_mailer(settings)?;

    mailer.send(&email).context("Failed to send weather message")?;

    tracing::info!("Sent weather message to {}", settings.recipient);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_plain_text_message() {
        let email = build_email("me@example.com", "5551234567@vtext.com", "Seas 4 ft").unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();
        assert!(raw.contains("Subject: Weather"));
        assert!(raw.contains("To: 5551234567@vtext.com"));
        assert!(raw.contains("Seas 4 ft"));
    }

    #[test]
    fn rejects_bad_address() {
        assert!(build_email("not an address", "x@example.com", "hi").is_err());
    }
}
