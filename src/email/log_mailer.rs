use async_trait::async_trait;

use super::{ EmailMessage, EmailSender };
use crate::error::Result;

/// Writes outgoing mail to the log instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl EmailSender for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email delivery disabled, logging notification instead"
        );
        tracing::debug!(body = %message.html, "Email body");
        Ok(())
    }
}
