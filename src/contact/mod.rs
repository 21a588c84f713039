// src/contact/mod.rs
//! Contact form: validation, honeypot, per-client cooldown, mail dispatch.

pub mod mailer;
pub mod rate_limit;
pub mod resend;
pub mod smtp;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::clock::Clock;
use crate::error::AppError;

pub use mailer::{DeliveryReceipt, LogMailer, Mailer};
pub use rate_limit::{MemoryStore, RateDecision, RateLimitStore, RateLimiter};

pub const MIN_MESSAGE_CHARS: usize = 10;

static RE_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Incoming form body. Absent fields behave like empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(deserialize_with = "trap_field")]
    pub honeypot: String,
}

/// Bots fill the trap field with whatever type they like. Any non-null value
/// is kept as text so it still trips the spam check.
fn trap_field<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Validated submission handed to the mailer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub client_id: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactAck {
    pub message: String,
    pub id: String,
}

pub fn is_valid_email(s: &str) -> bool {
    RE_EMAIL.is_match(s.trim())
}

impl ContactRequest {
    /// Honeypot first: a bot-filled form is rejected whatever else it holds.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.honeypot.is_empty() {
            return Err(AppError::Spam);
        }
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".into()));
        }
        if !is_valid_email(&self.email) {
            return Err(AppError::Validation("Invalid email address".into()));
        }
        if self.subject.trim().is_empty() {
            return Err(AppError::Validation("Subject is required".into()));
        }
        if self.message.trim().chars().count() < MIN_MESSAGE_CHARS {
            return Err(AppError::Validation(format!(
                "Message must be at least {MIN_MESSAGE_CHARS} characters"
            )));
        }
        Ok(())
    }

    pub fn into_message(self, client_id: &str, now: DateTime<Utc>) -> ContactMessage {
        ContactMessage {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
            client_id: client_id.to_string(),
            received_at: now,
        }
    }
}

pub struct ContactService {
    limiter: RateLimiter,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
}

impl ContactService {
    pub fn new(limiter: RateLimiter, mailer: Arc<dyn Mailer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            limiter,
            mailer,
            clock,
        }
    }

    pub async fn submit(
        &self,
        req: ContactRequest,
        client_id: &str,
    ) -> Result<ContactAck, AppError> {
        let client = anon_hash(client_id);

        if let Err(e) = req.validate() {
            let outcome = if matches!(e, AppError::Spam) {
                "spam"
            } else {
                "invalid"
            };
            tracing::info!(target: "contact", %client, outcome, reason = %e, "contact rejected");
            counter!("contact_submissions_total", "outcome" => outcome).increment(1);
            return Err(e);
        }

        let now = self.clock.now();
        let decision = self
            .limiter
            .check(&format!("contact_{client_id}"), now)
            .await;
        if !decision.is_allowed() {
            tracing::info!(target: "contact", %client, "contact rate limited");
            counter!("contact_submissions_total", "outcome" => "limited").increment(1);
            return Err(AppError::RateLimited {
                retry_after_secs: decision.retry_after_secs(),
            });
        }

        let msg = req.into_message(client_id, now);
        match self.mailer.send(&msg).await {
            Ok(receipt) => {
                tracing::info!(
                    target: "contact",
                    %client,
                    mailer = self.mailer.name(),
                    id = %receipt.id,
                    "contact message sent"
                );
                counter!("contact_submissions_total", "outcome" => "sent").increment(1);
                Ok(ContactAck {
                    message: "Message sent successfully".to_string(),
                    id: receipt.id,
                })
            }
            Err(e) => {
                counter!("contact_submissions_total", "outcome" => "failed").increment(1);
                Err(AppError::Mail(e))
            }
        }
    }
}

/// Short, stable fingerprint for logs; raw client addresses are never logged.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ContactRequest {
        ContactRequest {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            subject: "Collaboration".into(),
            message: "Would love to chat about analytical engines.".into(),
            honeypot: String::new(),
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn honeypot_wins_over_everything() {
        let mut r = valid();
        r.honeypot = "http://spam.example".into();
        assert!(matches!(r.validate(), Err(AppError::Spam)));

        let r = ContactRequest {
            honeypot: "x".into(),
            ..ContactRequest::default()
        };
        assert!(matches!(r.validate(), Err(AppError::Spam)));
    }

    #[test]
    fn field_rules() {
        let mut r = valid();
        r.name = "   ".into();
        assert!(matches!(r.validate(), Err(AppError::Validation(m)) if m == "Name is required"));

        let mut r = valid();
        r.email = "not-an-email".into();
        assert!(matches!(r.validate(), Err(AppError::Validation(_))));

        let mut r = valid();
        r.subject = String::new();
        assert!(matches!(r.validate(), Err(AppError::Validation(_))));

        let mut r = valid();
        r.message = "too short".into(); // 9 chars
        assert!(matches!(r.validate(), Err(AppError::Validation(_))));
        r.message = "just right".into(); // 10 chars
        assert!(r.validate().is_ok());
    }

    #[test]
    fn message_length_ignores_surrounding_whitespace() {
        let mut r = valid();
        r.message = "     short     ".into();
        assert!(matches!(r.validate(), Err(AppError::Validation(_))));
        r.message = "  just right  ".into();
        assert!(r.validate().is_ok());
        assert_eq!(r.into_message("c", chrono::Utc::now()).message, "just right");
    }

    #[test]
    fn non_string_honeypot_still_counts_as_filled() {
        for raw in [r#"{"honeypot": 1}"#, r#"{"honeypot": true}"#, r#"{"honeypot": ["x"]}"#] {
            let r: ContactRequest = serde_json::from_str(raw).unwrap();
            assert!(matches!(r.validate(), Err(AppError::Spam)), "{raw}");
        }
        let r: ContactRequest = serde_json::from_str(r#"{"honeypot": null}"#).unwrap();
        assert!(r.honeypot.is_empty());
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email(" first.last+tag@sub.example.org "));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.io"));
        assert!(!is_valid_email("@c.io"));
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        assert_eq!(anon_hash("1.2.3.4").len(), 12);
        assert_eq!(anon_hash("1.2.3.4"), anon_hash("1.2.3.4"));
        assert_ne!(anon_hash("1.2.3.4"), anon_hash("1.2.3.5"));
    }
}
