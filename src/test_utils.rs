//! Shared helpers for unit tests: an in-memory database with the real
//! migrations applied, and recording fakes for the external collaborators.
#![allow(dead_code)]

use std::collections::{ HashMap, HashSet };
use std::str::FromStr;
use std::sync::{ Arc, Mutex };

use async_trait::async_trait;
use migration::{ Migrator, MigratorTrait };
use sea_orm::{ prelude::Decimal, ConnectOptions, Database, DatabaseConnection };
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

use crate::email::{ EmailMessage, EmailSender };
use crate::error::{ AppError, Result };
use crate::providers::BalanceFetcher;

pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber
        ::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
        )
        .with_test_writer()
        .try_init();
}

/// Fresh SQLite database living in a single pooled connection.
pub(crate) async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub(crate) fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("valid decimal literal")
}

// ── Balance fetcher fakes ───────────────────────────────────────────

/// Serves balances from a fixed table; unknown addresses fail like a
/// network error would.
#[derive(Default)]
pub(crate) struct FakeFetcher {
    balances: HashMap<String, Decimal>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub(crate) fn new(balances: &[(&str, &str)]) -> Self {
        Self {
            balances: balances
                .iter()
                .map(|(address, balance)| (address.to_string(), dec(balance)))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BalanceFetcher for FakeFetcher {
    async fn fetch_balance(&self, address: &str) -> Result<Decimal> {
        self.calls.lock().unwrap().push(address.to_string());
        self.balances
            .get(address)
            .copied()
            .ok_or_else(|| AppError::Rpc(format!("no balance for {}", address)))
    }

    fn symbol(&self) -> &'static str {
        "APT"
    }
}

/// Blocks inside `fetch_balance` until released, to hold an evaluation open.
pub(crate) struct GatedFetcher {
    pub(crate) entered: Arc<Notify>,
    pub(crate) release: Arc<Notify>,
    balance: Decimal,
}

impl GatedFetcher {
    pub(crate) fn new(balance: &str) -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            balance: dec(balance),
        }
    }
}

#[async_trait]
impl BalanceFetcher for GatedFetcher {
    async fn fetch_balance(&self, _address: &str) -> Result<Decimal> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.balance)
    }

    fn symbol(&self) -> &'static str {
        "APT"
    }
}

// ── Email fakes ─────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    failing: HashSet<String>,
}

impl RecordingMailer {
    /// A mailer that rejects every message addressed to one of `recipients`.
    pub(crate) fn failing_for(recipients: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: recipients
                .iter()
                .map(|r| r.to_string())
                .collect(),
        }
    }

    pub(crate) fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if self.failing.contains(&message.to) {
            return Err(AppError::External(format!("mailbox {} unavailable", message.to)));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
