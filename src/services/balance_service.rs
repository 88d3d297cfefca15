use sea_orm::prelude::Decimal;
use serde::{ Deserialize, Serialize };
use std::cmp::Ordering;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::entity::wallet;
use crate::db::WalletRepository;
use crate::enums::WalletStatus;
use crate::error::Result;
use crate::providers::BalanceFetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Name,
    Balance,
    Threshold,
    Status,
    #[default]
    Created,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverviewQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<WalletStatus>,
    #[serde(default)]
    pub sort: Option<SortField>,
    #[serde(default)]
    pub order: Option<SortOrder>,
}

/// A wallet together with its live balance. `balance` is `None` and
/// `status` is `unknown` when the lookup failed.
#[derive(Debug, Clone, Serialize)]
pub struct WalletBalance {
    #[serde(flatten)]
    pub wallet: wallet::Model,
    pub balance: Option<Decimal>,
    pub status: WalletStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub alert: usize,
    pub warning: usize,
    pub healthy: usize,
    pub unknown: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletOverview {
    pub wallets: Vec<WalletBalance>,
    pub wallet_count: usize,
    pub total_balance: Decimal,
    pub symbol: &'static str,
    pub counts: StatusCounts,
}

pub struct BalanceService {
    repository: Arc<WalletRepository>,
    fetcher: Arc<dyn BalanceFetcher>,
}

impl BalanceService {
    pub fn new(repository: Arc<WalletRepository>, fetcher: Arc<dyn BalanceFetcher>) -> Self {
        Self {
            repository,
            fetcher,
        }
    }

    pub async fn get_wallet_balance(&self, user_id: Uuid, wallet_id: Uuid) -> Result<WalletBalance> {
        let wallet = self.repository.find_for_user(user_id, wallet_id).await?;
        Ok(self.check(wallet).await)
    }

    /// All of a user's wallets with live balances, filtered and sorted.
    /// Totals and per-status counts cover every wallet, not just the filtered view.
    pub async fn overview(&self, user_id: Uuid, query: OverviewQuery) -> Result<WalletOverview> {
        let wallets = self.repository.find_by_user(user_id).await?;
        let wallet_count = wallets.len();

        let mut checked = Vec::with_capacity(wallet_count);
        for wallet in wallets {
            checked.push(self.check(wallet).await);
        }

        let mut counts = StatusCounts::default();
        let mut total_balance = Decimal::ZERO;
        for entry in &checked {
            match entry.status {
                WalletStatus::Alert => counts.alert += 1,
                WalletStatus::Warning => counts.warning += 1,
                WalletStatus::Healthy => counts.healthy += 1,
                WalletStatus::Unknown => counts.unknown += 1,
            }
            if let Some(balance) = entry.balance {
                total_balance += balance;
            }
        }

        let mut wallets = filter_wallets(checked, &query);
        sort_wallets(&mut wallets, query.sort.unwrap_or_default(), query.order);

        Ok(WalletOverview {
            wallets,
            wallet_count,
            total_balance,
            symbol: self.fetcher.symbol(),
            counts,
        })
    }

    async fn check(&self, wallet: wallet::Model) -> WalletBalance {
        match self.fetcher.fetch_balance(&wallet.address).await {
            Ok(balance) =>
                WalletBalance {
                    status: WalletStatus::from_balance(balance, wallet.threshold),
                    balance: Some(balance),
                    error: None,
                    wallet,
                },
            Err(e) => {
                tracing::warn!(wallet_id = %wallet.id, address = %wallet.address, "Balance lookup failed: {}", e);
                WalletBalance {
                    wallet,
                    balance: None,
                    status: WalletStatus::Unknown,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn filter_wallets(wallets: Vec<WalletBalance>, query: &OverviewQuery) -> Vec<WalletBalance> {
    let search = query.search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    wallets
        .into_iter()
        .filter(|entry| {
            let matches_search = match &search {
                Some(needle) =>
                    entry.wallet.address.to_lowercase().contains(needle) ||
                        entry.wallet.nickname
                            .as_deref()
                            .map(|n| n.to_lowercase().contains(needle))
                            .unwrap_or(false),
                None => true,
            };
            let matches_status = query.status.map(|s| s == entry.status).unwrap_or(true);
            matches_search && matches_status
        })
        .collect()
}

fn display_name(entry: &WalletBalance) -> String {
    entry.wallet.nickname.as_deref().unwrap_or(&entry.wallet.address).to_lowercase()
}

fn sort_wallets(wallets: &mut [WalletBalance], field: SortField, order: Option<SortOrder>) {
    let order = order.unwrap_or(match field {
        SortField::Created => SortOrder::Desc,
        _ => SortOrder::Asc,
    });

    let directed = |ordering: Ordering| {
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    };

    // Wallets whose balance could not be fetched stay at the end in either direction.
    wallets.sort_by(|a, b| {
        match field {
            SortField::Name => directed(display_name(a).cmp(&display_name(b))),
            SortField::Balance =>
                match (a.balance, b.balance) {
                    (Some(x), Some(y)) => directed(x.cmp(&y)),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            SortField::Threshold => directed(a.wallet.threshold.cmp(&b.wallet.threshold)),
            SortField::Status =>
                match (a.status, b.status) {
                    (WalletStatus::Unknown, WalletStatus::Unknown) => Ordering::Equal,
                    (_, WalletStatus::Unknown) => Ordering::Less,
                    (WalletStatus::Unknown, _) => Ordering::Greater,
                    (x, y) => directed(x.rank().cmp(&y.rank())),
                }
            SortField::Created => directed(a.wallet.created_at.cmp(&b.wallet.created_at)),
        }
    });
}
