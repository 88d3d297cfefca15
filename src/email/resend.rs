use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use std::time::Duration;

use super::{ EmailMessage, EmailSender };
use crate::error::{ AppError, Result };

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Transactional email through the Resend HTTP API.
#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client
            ::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build email HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            from,
            endpoint: RESEND_API_URL.to_string(),
        })
    }
}

#[async_trait]
impl EmailSender for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let request = SendEmailRequest {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let resp = self.client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send().await
            .map_err(|e| AppError::External(format!("Email request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::External(format!("Email provider error {}: {}", status, body)));
        }

        let sent: SendEmailResponse = resp
            .json().await
            .map_err(|e| AppError::External(format!("Failed to parse email response: {}", e)))?;

        tracing::debug!(to = %message.to, id = %sent.id, "Email accepted by provider");
        Ok(())
    }
}
