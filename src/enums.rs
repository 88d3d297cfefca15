use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use sea_orm::prelude::Decimal;
use serde::{ Deserialize, Serialize };

use crate::error::AppError;

// ─── NotificationFrequency ──────────────────────────────────────────

/// How often a below-threshold wallet may alert its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFrequency {
    #[default]
    Immediate,
    Hourly,
    Daily,
}

impl NotificationFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationFrequency::Immediate => "immediate",
            NotificationFrequency::Hourly => "hourly",
            NotificationFrequency::Daily => "daily",
        }
    }

    /// Minimum spacing between two alerts for the same wallet.
    /// `None` means every evaluation pass may alert.
    pub fn window(&self) -> Option<Duration> {
        match self {
            NotificationFrequency::Immediate => None,
            NotificationFrequency::Hourly => Some(Duration::hours(1)),
            NotificationFrequency::Daily => Some(Duration::hours(24)),
        }
    }
}

impl fmt::Display for NotificationFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationFrequency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "immediate" => Ok(NotificationFrequency::Immediate),
            "hourly" => Ok(NotificationFrequency::Hourly),
            "daily" => Ok(NotificationFrequency::Daily),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid notification frequency: {}. Supported: immediate, hourly, daily",
                s
            ))),
        }
    }
}

// ─── WalletStatus ───────────────────────────────────────────────────

/// Balances below `threshold * WARNING_MULTIPLIER` are reported as warnings.
pub const WARNING_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Health of a wallet derived from its current balance. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    Alert,
    Warning,
    Healthy,
    /// The balance could not be fetched.
    Unknown,
}

impl WalletStatus {
    pub fn from_balance(balance: Decimal, threshold: Decimal) -> Self {
        if balance < threshold {
            WalletStatus::Alert
        } else if balance < threshold * WARNING_MULTIPLIER {
            WalletStatus::Warning
        } else {
            WalletStatus::Healthy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WalletStatus::Alert => "alert",
            WalletStatus::Warning => "warning",
            WalletStatus::Healthy => "healthy",
            WalletStatus::Unknown => "unknown",
        }
    }

    /// Sort key: most urgent first.
    pub fn rank(&self) -> u8 {
        match self {
            WalletStatus::Alert => 0,
            WalletStatus::Warning => 1,
            WalletStatus::Healthy => 2,
            WalletStatus::Unknown => 3,
        }
    }
}

impl fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alert" => Ok(WalletStatus::Alert),
            "warning" => Ok(WalletStatus::Warning),
            "healthy" => Ok(WalletStatus::Healthy),
            "unknown" => Ok(WalletStatus::Unknown),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid wallet status: {}. Supported: alert, warning, healthy, unknown",
                s
            ))),
        }
    }
}
