use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::entity::wallet;
use crate::db::{ NewNotification, NotificationRepository, SettingsRepository, WalletRepository };
use crate::email::{ self, EmailSender };
use crate::enums::NotificationFrequency;
use crate::error::{ AppError, Result };
use crate::providers::BalanceFetcher;

/// Tally of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationReport {
    pub owners_scanned: u64,
    pub owners_skipped: u64,
    pub wallets_checked: u64,
    pub alerts_created: u64,
    pub alerts_suppressed: u64,
    pub emails_sent: u64,
    pub emails_failed: u64,
    pub fetch_failures: u64,
    pub write_failures: u64,
}

pub struct AlertEvaluator {
    wallets: Arc<WalletRepository>,
    settings: Arc<SettingsRepository>,
    notifications: Arc<NotificationRepository>,
    fetcher: Arc<dyn BalanceFetcher>,
    mailer: Arc<dyn EmailSender>,
    owner_page_size: u64,
    run_lock: Mutex<()>,
}

impl AlertEvaluator {
    pub fn new(
        wallets: Arc<WalletRepository>,
        settings: Arc<SettingsRepository>,
        notifications: Arc<NotificationRepository>,
        fetcher: Arc<dyn BalanceFetcher>,
        mailer: Arc<dyn EmailSender>,
        owner_page_size: u64
    ) -> Self {
        Self {
            wallets,
            settings,
            notifications,
            fetcher,
            mailer,
            owner_page_size: owner_page_size.max(1),
            run_lock: Mutex::new(()),
        }
    }

    /// One full pass over every owner and wallet.
    ///
    /// Only one pass runs at a time per process; a second call made while a
    /// pass is in flight fails with [`AppError::EvaluationInProgress`] instead
    /// of waiting. Per-wallet failures are logged and counted, never returned.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self) -> Result<EvaluationReport> {
        let _guard = self.run_lock.try_lock().map_err(|_| AppError::EvaluationInProgress)?;

        let started = Utc::now();
        let mut report = EvaluationReport::default();
        let mut page = 0;

        loop {
            let owners = self.wallets.list_owner_ids(page, self.owner_page_size).await?;
            let page_len = owners.len() as u64;

            for owner in owners {
                self.check_owner(owner, &mut report).await;
            }

            if page_len < self.owner_page_size {
                break;
            }
            page += 1;
        }

        tracing::info!(
            owners = report.owners_scanned,
            wallets = report.wallets_checked,
            alerts = report.alerts_created,
            suppressed = report.alerts_suppressed,
            elapsed_ms = (Utc::now() - started).num_milliseconds(),
            "Alert evaluation finished"
        );

        Ok(report)
    }

    #[tracing::instrument(skip(self, report))]
    async fn check_owner(&self, owner: Uuid, report: &mut EvaluationReport) {
        report.owners_scanned += 1;

        let settings = match self.settings.find_by_user(owner).await {
            Ok(Some(settings)) if settings.email_notifications => settings,
            Ok(_) => {
                tracing::debug!("Notifications disabled, skipping owner");
                report.owners_skipped += 1;
                return;
            }
            Err(e) => {
                tracing::error!("Failed to load settings: {}", e);
                report.owners_skipped += 1;
                return;
            }
        };

        let wallets = match self.wallets.find_by_user(owner).await {
            Ok(wallets) => wallets,
            Err(e) => {
                tracing::error!("Failed to load wallets: {}", e);
                report.owners_skipped += 1;
                return;
            }
        };

        for wallet in wallets {
            self.check_wallet(&wallet, settings.frequency(), settings.emails(), report).await;
        }
    }

    async fn check_wallet(
        &self,
        wallet: &wallet::Model,
        frequency: NotificationFrequency,
        recipients: &[String],
        report: &mut EvaluationReport
    ) {
        report.wallets_checked += 1;

        let balance = match self.fetcher.fetch_balance(&wallet.address).await {
            Ok(balance) => balance,
            Err(e) => {
                tracing::warn!(wallet_id = %wallet.id, address = %wallet.address, "Balance fetch failed: {}", e);
                report.fetch_failures += 1;
                return;
            }
        };

        if balance >= wallet.threshold {
            return;
        }

        if self.recently_alerted(wallet, frequency).await {
            tracing::debug!(wallet_id = %wallet.id, %frequency, "Alert suppressed by frequency window");
            report.alerts_suppressed += 1;
            return;
        }

        let record = NewNotification {
            user_id: wallet.user_id,
            wallet_id: wallet.id,
            wallet_address: wallet.address.clone(),
            wallet_nickname: wallet.nickname.clone(),
            balance,
            threshold: wallet.threshold,
        };
        if let Err(e) = self.notifications.create(record).await {
            tracing::error!(wallet_id = %wallet.id, "Failed to record notification: {}", e);
            report.write_failures += 1;
            return;
        }
        report.alerts_created += 1;

        tracing::info!(
            wallet_id = %wallet.id,
            balance = %balance,
            threshold = %wallet.threshold,
            recipients = recipients.len(),
            "Low balance alert"
        );

        for recipient in recipients {
            let message = email::low_balance_alert(
                recipient,
                &wallet.address,
                wallet.nickname.as_deref(),
                balance,
                wallet.threshold,
                self.fetcher.symbol()
            );

            match self.mailer.send(&message).await {
                Ok(()) => {
                    report.emails_sent += 1;
                }
                Err(e) => {
                    tracing::warn!(wallet_id = %wallet.id, to = %recipient, "Alert email failed: {}", e);
                    report.emails_failed += 1;
                }
            }
        }
    }

    /// Whether the wallet's last alert falls inside the frequency window.
    /// A failed lookup does not suppress.
    async fn recently_alerted(&self, wallet: &wallet::Model, frequency: NotificationFrequency) -> bool {
        let Some(window) = frequency.window() else {
            return false;
        };

        match self.notifications.last_sent_for_wallet(wallet.id).await {
            Ok(Some(last_sent)) => Utc::now() - last_sent < window,
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(wallet_id = %wallet.id, "Could not read last alert time: {}", e);
                false
            }
        }
    }
}
