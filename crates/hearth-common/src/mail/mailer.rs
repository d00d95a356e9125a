//! SMTP mailer with an explicit fallback relay
//!
//! Delivery order: try the primary relay; on error, try the fallback; if
//! that also errors, log and swallow. Mail failures are never surfaced to
//! the request that triggered them.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, warn};

use crate::config::{SmtpConfig, SmtpEndpoint};
use crate::error::AppError;

/// A plain-text mail ready for delivery
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub subject: String,
    pub body: String,
    pub to: Vec<String>,
}

impl OutgoingMail {
    /// Create a mail for a single recipient
    pub fn to_one(subject: impl Into<String>, body: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            to: vec![to.into()],
        }
    }
}

/// Mailer holding a primary transport and an optional fallback
#[derive(Clone)]
pub struct Mailer {
    from: Mailbox,
    primary: AsyncSmtpTransport<Tokio1Executor>,
    fallback: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl Mailer {
    /// Build a mailer from configuration
    ///
    /// # Errors
    /// Returns a config error when the from address or a relay host is
    /// malformed.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, AppError> {
        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|e| AppError::Config(format!("invalid MAIL_FROM: {e}")))?;

        let primary = Self::build_transport(&config.primary)?;
        let fallback = config
            .fallback
            .as_ref()
            .map(|ep| Self::build_transport(ep))
            .transpose()?;

        Ok(Self {
            from,
            primary,
            fallback,
        })
    }

    fn build_transport(
        endpoint: &SmtpEndpoint,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, AppError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&endpoint.host)
            .map_err(|e| AppError::Config(format!("invalid SMTP relay {}: {e}", endpoint.host)))?
            .port(endpoint.port);

        if let (Some(user), Some(pass)) = (&endpoint.username, &endpoint.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(builder.build())
    }

    /// Deliver a mail, falling back to the secondary relay on error.
    ///
    /// Never fails the caller: both relays erroring is logged and dropped.
    pub async fn send(&self, mail: &OutgoingMail) {
        let message = match self.compose(mail) {
            Ok(m) => m,
            Err(e) => {
                error!(error = %e, subject = %mail.subject, "Failed to compose mail");
                return;
            }
        };

        match self.primary.send(message.clone()).await {
            Ok(_) => {}
            Err(primary_err) => {
                warn!(
                    error = %primary_err,
                    subject = %mail.subject,
                    "Primary mail relay failed, trying fallback"
                );

                let Some(fallback) = &self.fallback else {
                    error!(subject = %mail.subject, "No fallback relay configured, mail dropped");
                    return;
                };

                if let Err(fallback_err) = fallback.send(message).await {
                    error!(
                        error = %fallback_err,
                        subject = %mail.subject,
                        "Fallback mail relay failed, mail dropped"
                    );
                }
            }
        }
    }

    fn compose(&self, mail: &OutgoingMail) -> Result<Message, AppError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(mail.subject.clone());

        for recipient in &mail.to {
            let mailbox = recipient
                .parse::<Mailbox>()
                .map_err(|e| AppError::Mail(format!("invalid recipient {recipient}: {e}")))?;
            builder = builder.to(mailbox);
        }

        builder
            .body(mail.body.clone())
            .map_err(|e| AppError::Mail(format!("failed to build message: {e}")))
    }
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("from", &self.from.to_string())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            from_address: "noreply@hearth.example".to_string(),
            primary: SmtpEndpoint {
                host: "smtp.example.com".to_string(),
                port: 587,
                username: Some("mailer".to_string()),
                password: Some("secret".to_string()),
            },
            fallback: Some(SmtpEndpoint {
                host: "smtp-backup.example.com".to_string(),
                port: 587,
                username: None,
                password: None,
            }),
        }
    }

    #[tokio::test]
    async fn test_from_config_builds_both_transports() {
        let mailer = Mailer::from_config(&config()).unwrap();
        assert!(mailer.fallback.is_some());
    }

    #[tokio::test]
    async fn test_invalid_from_address_rejected() {
        let mut cfg = config();
        cfg.from_address = "not an address".to_string();
        assert!(Mailer::from_config(&cfg).is_err());
    }

    #[tokio::test]
    async fn test_compose_rejects_bad_recipient() {
        let mailer = Mailer::from_config(&config()).unwrap();
        let mail = OutgoingMail::to_one("Hi", "body", "not an address");
        assert!(mailer.compose(&mail).is_err());
    }

    #[tokio::test]
    async fn test_compose_valid_mail() {
        let mailer = Mailer::from_config(&config()).unwrap();
        let mail = OutgoingMail::to_one("Verify your email", "Click here", "ada@example.com");
        assert!(mailer.compose(&mail).is_ok());
    }
}
