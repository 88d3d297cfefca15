use sea_orm::prelude::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::entity::wallet;
use crate::db::{ WalletChanges, WalletRepository };
use crate::error::{ AppError, Result };

const ADDRESS_PREFIX: &str = "0x";
const MIN_ADDRESS_LEN: usize = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct NewWallet {
    pub address: String,
    pub threshold: Decimal,
    #[serde(default)]
    pub nickname: Option<String>,
}

/// Fields omitted from the request are left untouched. An empty nickname clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletUpdate {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub threshold: Option<Decimal>,
    #[serde(default)]
    pub nickname: Option<String>,
}

/// Cheap shape check only: `0x` prefix and a minimum length.
pub fn validate_address(address: &str) -> Result<()> {
    if !address.starts_with(ADDRESS_PREFIX) || address.len() < MIN_ADDRESS_LEN {
        return Err(AppError::InvalidAddress);
    }
    Ok(())
}

fn validate_threshold(threshold: Decimal) -> Result<()> {
    if threshold < Decimal::ZERO {
        return Err(AppError::InvalidInput("Threshold must not be negative".to_string()));
    }
    Ok(())
}

fn clean_nickname(nickname: Option<String>) -> Option<String> {
    nickname
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

pub struct WalletService {
    repository: Arc<WalletRepository>,
}

impl WalletService {
    pub fn new(repository: Arc<WalletRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_wallets(&self, user_id: Uuid) -> Result<Vec<wallet::Model>> {
        self.repository.find_by_user(user_id).await
    }

    pub async fn get_wallet(&self, user_id: Uuid, wallet_id: Uuid) -> Result<wallet::Model> {
        self.repository.find_for_user(user_id, wallet_id).await
    }

    pub async fn add_wallet(&self, user_id: Uuid, request: NewWallet) -> Result<wallet::Model> {
        let address = request.address.trim().to_string();
        validate_address(&address)?;
        validate_threshold(request.threshold)?;

        let wallet = self.repository.create(
            user_id,
            address,
            request.threshold,
            clean_nickname(request.nickname)
        ).await?;

        tracing::info!(user_id = %user_id, wallet_id = %wallet.id, "Wallet added");
        Ok(wallet)
    }

    pub async fn update_wallet(
        &self,
        user_id: Uuid,
        wallet_id: Uuid,
        update: WalletUpdate
    ) -> Result<wallet::Model> {
        let address = match update.address {
            Some(address) => {
                let address = address.trim().to_string();
                validate_address(&address)?;
                Some(address)
            }
            None => None,
        };

        if let Some(threshold) = update.threshold {
            validate_threshold(threshold)?;
        }

        let changes = WalletChanges {
            address,
            threshold: update.threshold,
            nickname: update.nickname.map(|n| clean_nickname(Some(n))),
        };

        self.repository.update(user_id, wallet_id, changes).await
    }

    pub async fn delete_wallet(&self, user_id: Uuid, wallet_id: Uuid) -> Result<()> {
        self.repository.delete(user_id, wallet_id).await?;
        tracing::info!(user_id = %user_id, wallet_id = %wallet_id, "Wallet deleted");
        Ok(())
    }
}
