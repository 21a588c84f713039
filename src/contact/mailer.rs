// src/contact/mailer.rs
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use super::{anon_hash, ContactMessage};
use crate::config::ContactSettings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReceipt {
    /// Id assigned by the mail provider (or generated locally when there is none).
    pub id: String,
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, msg: &ContactMessage) -> Result<DeliveryReceipt>;
    fn name(&self) -> &'static str;
}

pub fn render_subject(msg: &ContactMessage) -> String {
    format!("Contact Form: {}", msg.subject)
}

pub fn render_text(msg: &ContactMessage) -> String {
    format!(
        "New Contact Form Submission\n\n\
         Name: {}\nEmail: {}\nSubject: {}\n\n\
         Message:\n{}\n\n\
         --\nSent from the contact form. Client: {} | Time: {}\n",
        msg.name,
        msg.email,
        msg.subject,
        msg.message,
        anon_hash(&msg.client_id),
        msg.received_at.to_rfc3339()
    )
}

pub fn local_message_id(msg: &ContactMessage) -> String {
    let seed = format!(
        "{}|{}|{}",
        msg.email,
        msg.client_id,
        msg.received_at.timestamp_nanos_opt().unwrap_or_default()
    );
    format!("local-{}", anon_hash(&seed))
}

/// Used when no provider is configured: the submission is logged, not mailed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, msg: &ContactMessage) -> Result<DeliveryReceipt> {
        let id = local_message_id(msg);
        tracing::info!(
            target: "contact",
            %id,
            subject = %render_subject(msg),
            client = %anon_hash(&msg.client_id),
            "contact submission accepted (no mail provider configured)"
        );
        Ok(DeliveryReceipt { id })
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Pick a provider from the environment:
/// 1) RESEND_API_KEY → HTTP mail API
/// 2) SMTP_HOST      → SMTP relay
/// 3) otherwise      → log only
pub fn mailer_from_env(settings: &ContactSettings) -> Result<Arc<dyn Mailer>> {
    if let Ok(key) = std::env::var("RESEND_API_KEY") {
        if !key.trim().is_empty() {
            return Ok(Arc::new(super::resend::ResendMailer::new(settings, key)));
        }
    }
    if std::env::var("SMTP_HOST").is_ok() {
        return Ok(Arc::new(super::smtp::SmtpMailer::from_env(settings)?));
    }
    tracing::warn!("no mail provider configured; contact submissions will only be logged");
    Ok(Arc::new(LogMailer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn msg() -> ContactMessage {
        ContactMessage {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: "Hello".into(),
            message: "Let's build something.".into(),
            client_id: "203.0.113.9".into(),
            received_at: Utc.with_ymd_and_hms(2025, 9, 15, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn text_body_has_fields_but_not_raw_client_ip() {
        let body = render_text(&msg());
        assert!(body.contains("Name: Ada"));
        assert!(body.contains("Email: ada@example.com"));
        assert!(body.contains("Let's build something."));
        assert!(!body.contains("203.0.113.9"));
        assert_eq!(render_subject(&msg()), "Contact Form: Hello");
    }

    #[tokio::test]
    async fn log_mailer_returns_stable_local_id() {
        let a = LogMailer.send(&msg()).await.unwrap();
        let b = LogMailer.send(&msg()).await.unwrap();
        assert!(a.id.starts_with("local-"));
        assert_eq!(a, b);
    }
}
