//! Forwards contact form messages to the site owner over SMTP.

use async_trait::async_trait;
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use utils::text::escape_html;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid e-mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// What a visitor submits through the contact form.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactMessage {
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactMessage {
    /// Trimmed copy, or the first missing field.
    pub fn validated(&self) -> Result<Self, MailError> {
        let fullname = self.fullname.trim();
        let email = self.email.trim();
        let message = self.message.trim();

        if fullname.is_empty() {
            return Err(MailError::MissingField("fullname"));
        }
        if email.is_empty() {
            return Err(MailError::MissingField("email"));
        }
        if message.is_empty() {
            return Err(MailError::MissingField("message"));
        }
        email.parse::<Address>()?;

        Ok(Self {
            fullname: fullname.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })
    }

    pub fn subject(&self) -> String {
        format!("New message from {}", self.fullname)
    }

    pub fn html_body(&self) -> String {
        let message = escape_html(&self.message).replace('\n', "<br>");
        format!(
            "<h3>New contact form message</h3>\n\
             <p><strong>Name:</strong> {}</p>\n\
             <p><strong>Email:</strong> {}</p>\n\
             <p><strong>Message:</strong></p>\n\
             <p>{}</p>",
            escape_html(&self.fullname),
            escape_html(&self.email),
            message
        )
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_contact(&self, message: &ContactMessage) -> Result<(), MailError>;
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Recipient of contact messages.
    pub admin_email: String,
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    /// Port 465 uses implicit TLS, any other port STARTTLS.
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let builder = if settings.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
        };
        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.expose_secret().to_string(),
            ))
            .build();

        Ok(Self {
            transport,
            from: Mailbox::new(
                Some("Portfolio contact form".to_string()),
                settings.username.parse()?,
            ),
            to: settings.admin_email.parse()?,
        })
    }

    fn build(&self, message: &ContactMessage) -> Result<Message, MailError> {
        let reply_to = Mailbox::new(Some(message.fullname.clone()), message.email.parse()?);
        Ok(Message::builder()
            .from(self.from.clone())
            .reply_to(reply_to)
            .to(self.to.clone())
            .subject(message.subject())
            .header(ContentType::TEXT_HTML)
            .body(message.html_body())?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_contact(&self, message: &ContactMessage) -> Result<(), MailError> {
        let email = self.build(message)?;
        self.transport.send(email).await?;
        info!(from = %message.email, "Contact message forwarded");
        Ok(())
    }
}
