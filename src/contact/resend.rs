// src/contact/resend.rs
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::mailer::{render_subject, render_text, DeliveryReceipt, Mailer};
use super::ContactMessage;
use crate::config::ContactSettings;

/// Resend-compatible HTTP mail API (`POST /emails`, bearer key, `{ "id": ... }` reply).
#[derive(Clone)]
pub struct ResendMailer {
    api_url: String,
    api_key: String,
    from: String,
    to: String,
    client: Client,
    timeout: Duration,
}

impl ResendMailer {
    pub fn new(settings: &ContactSettings, api_key: String) -> Self {
        Self {
            api_url: settings.resend_api_url.clone(),
            api_key,
            from: settings.from_email.clone(),
            to: settings.to_email.clone(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    fn payload<'a>(&'a self, msg: &'a ContactMessage) -> SendEmailRequest<'a> {
        SendEmailRequest {
            from: &self.from,
            to: vec![&self.to],
            reply_to: &msg.email,
            subject: render_subject(msg),
            text: render_text(msg),
        }
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    reply_to: &'a str,
    subject: String,
    text: String,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

#[async_trait::async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, msg: &ContactMessage) -> Result<DeliveryReceipt> {
        let rsp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&self.payload(msg))
            .send()
            .await
            .context("mail api request")?;

        if let Err(e) = rsp.error_for_status_ref() {
            return Err(anyhow!("mail api HTTP error: {e}"));
        }

        let body: SendEmailResponse = rsp.json().await.context("mail api response body")?;
        let id = body.id.ok_or_else(|| anyhow!("mail api response has no id"))?;
        Ok(DeliveryReceipt { id })
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn payload_targets_configured_inbox_and_replies_to_sender() {
        let m = ResendMailer::new(&ContactSettings::default(), "re_test".into());
        let msg = ContactMessage {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: "Hi".into(),
            message: "A message long enough.".into(),
            client_id: "unknown".into(),
            received_at: Utc.with_ymd_and_hms(2025, 9, 15, 10, 0, 0).unwrap(),
        };
        let v = serde_json::to_value(m.payload(&msg)).unwrap();
        assert_eq!(v["to"][0], "jaibhatia1906@gmail.com");
        assert_eq!(v["reply_to"], "ada@example.com");
        assert_eq!(v["subject"], "Contact Form: Hi");
    }
}
