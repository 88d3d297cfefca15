use async_trait::async_trait;
use sea_orm::prelude::Decimal;

use crate::error::Result;

/// Source of on-chain balances.
///
/// Implementations perform no address validation; callers are expected to
/// reject malformed input before asking for a balance. Every call is an
/// independent lookup with no caching and no retries.
#[async_trait]
pub trait BalanceFetcher: Send + Sync {
    /// Current spendable native balance of `address`, in whole tokens.
    async fn fetch_balance(&self, address: &str) -> Result<Decimal>;

    /// Ticker of the native token the balance is denominated in.
    fn symbol(&self) -> &'static str;
}
