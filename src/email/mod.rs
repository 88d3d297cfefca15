use async_trait::async_trait;
use sea_orm::prelude::Decimal;

use crate::error::Result;

mod log_mailer;
mod resend;

pub use log_mailer::LogMailer;
pub use resend::ResendMailer;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Low-balance alert addressed to `to`. User-supplied labels are escaped.
pub fn low_balance_alert(
    to: &str,
    wallet_address: &str,
    wallet_nickname: Option<&str>,
    balance: Decimal,
    threshold: Decimal,
    symbol: &str
) -> EmailMessage {
    let short: String = wallet_address.chars().take(8).collect();
    let address = escape_html(wallet_address);
    let label = match wallet_nickname {
        Some(nickname) => format!("{} (<code>{}</code>)", escape_html(nickname), address),
        None => format!("<code>{}</code>", address),
    };

    EmailMessage {
        to: to.to_string(),
        subject: format!("Wallet Balance Alert - {}...", short),
        html: format!(
            "<h2>Low Balance Alert</h2>\n\
            <p>Your wallet {label} has a balance of <strong>{balance} {symbol}</strong>, \
            which is below your threshold of <strong>{threshold} {symbol}</strong>.</p>\n\
            <p>Consider topping up your wallet to avoid transaction failures.</p>",
            label = label,
            balance = format!("{:.2}", balance),
            threshold = threshold.normalize(),
            symbol = symbol
        ),
    }
}
