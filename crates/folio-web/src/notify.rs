//! Owner notifications for new contact submissions.
//!
//! Delivery never blocks or fails a submission: handlers spawn the call and
//! only log errors.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::dto::Contact;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn contact_received(&self, contact: &Contact) -> anyhow::Result<()>;
}

/// Used when no mail account is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn contact_received(&self, contact: &Contact) -> anyhow::Result<()> {
        tracing::info!(
            "New contact from {} <{}>: {}",
            contact.name,
            contact.email,
            contact.subject
        );
        Ok(())
    }
}

/// Mails each submission to the configured account, from that same account.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    mailbox: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let mailbox: Mailbox = config
            .username
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid SMTP username {:?}: {e}", config.username))?;

        // 465 speaks TLS from the first byte; anything else upgrades via STARTTLS
        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };
        let mailer = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { mailer, mailbox })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn contact_received(&self, contact: &Contact) -> anyhow::Result<()> {
        let (subject, body) = contact_email(contact);
        let message = Message::builder()
            .from(self.mailbox.clone())
            .to(self.mailbox.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.mailer.send(message).await?;
        tracing::debug!("Contact notification mailed: id={}", contact.id);
        Ok(())
    }
}

/// SMTP when credentials are configured, log-only otherwise.
pub fn from_config(config: &SmtpConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    if config.is_configured() {
        Ok(Arc::new(SmtpNotifier::new(config)?))
    } else {
        Ok(Arc::new(LogNotifier))
    }
}

fn contact_email(contact: &Contact) -> (String, String) {
    let subject = format!("New Contact Form Submission: {}", contact.subject);
    let body = format!(
        "You have received a new contact form submission:\n\n\
         Name: {}\n\
         Email: {}\n\
         Subject: {}\n\n\
         Message:\n{}\n\n\
         ---\n\
         This message was sent from your portfolio contact form.\n",
        contact.name, contact.email, contact.subject, contact.message
    );
    (subject, body)
}
