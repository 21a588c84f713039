// src/contact/smtp.rs
use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use once_cell::sync::Lazy;
use regex::Regex;

use super::mailer::{local_message_id, render_subject, render_text, DeliveryReceipt, Mailer};
use super::ContactMessage;
use crate::config::ContactSettings;

static RE_QUEUED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)queued as\s+([A-Za-z0-9._-]+)").expect("queue id regex"));

pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    /// Reads SMTP_HOST / SMTP_USER / SMTP_PASS; addresses come from contact settings.
    pub fn from_env(settings: &ContactSettings) -> Result<Self> {
        let host = std::env::var("SMTP_HOST").context("SMTP_HOST missing")?;
        let user = std::env::var("SMTP_USER").context("SMTP_USER missing")?;
        let pass = std::env::var("SMTP_PASS").context("SMTP_PASS missing")?;

        let creds = Credentials::new(user, pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .context("invalid SMTP_HOST")?
            .credentials(creds)
            .build();

        let from = settings
            .from_email
            .parse()
            .context("invalid contact from address")?;
        let to = settings
            .to_email
            .parse()
            .context("invalid contact to address")?;

        Ok(Self { mailer, from, to })
    }
}

/// Provider id from an SMTP reply like `250 2.0.0 Ok: queued as 4ABC123`.
pub fn queue_id_from_reply(line: &str) -> Option<String> {
    RE_QUEUED
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, msg: &ContactMessage) -> Result<DeliveryReceipt> {
        let local_id = local_message_id(msg);
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(render_subject(msg))
            .message_id(Some(format!("<{local_id}@contact.form>")))
            .header(header::ContentType::TEXT_PLAIN);

        // A sender address that fails to parse just loses the Reply-To
        if let Ok(reply_to) = msg.email.parse::<Mailbox>() {
            builder = builder.reply_to(reply_to);
        }

        let email = builder.body(render_text(msg)).context("build email")?;
        let rsp = self.mailer.send(email).await.context("send email")?;

        let id = rsp
            .first_line()
            .and_then(queue_id_from_reply)
            .unwrap_or(local_id);
        Ok(DeliveryReceipt { id })
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
