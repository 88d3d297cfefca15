use chrono::Utc;
use sea_orm::{
    entity::prelude::*,
    DatabaseConnection,
    QueryOrder,
    QuerySelect,
    Set,
};
use uuid::Uuid;

use crate::error::{ AppError, Result };

pub mod entity;
pub use entity::*;

mod settings_repository;
pub use settings_repository::{ SettingsRepository, SettingsChanges };

mod notification_repository;
pub use notification_repository::{ NotificationRepository, NewNotification };

mod user_repository;
pub use user_repository::UserRepository;

/// Partial update for a wallet. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct WalletChanges {
    pub address: Option<String>,
    pub threshold: Option<Decimal>,
    /// `Some(None)` clears the nickname.
    pub nickname: Option<Option<String>>,
}

pub struct WalletRepository {
    db: DatabaseConnection,
}

impl WalletRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        address: String,
        threshold: Decimal,
        nickname: Option<String>
    ) -> Result<entity::wallet::Model> {
        let now = Utc::now();
        let wallet = entity::wallet::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            address: Set(address),
            nickname: Set(nickname),
            threshold: Set(threshold),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let wallet = wallet.insert(&self.db).await?;
        Ok(wallet)
    }

    /// Wallets owned by `user_id`, newest first.
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<entity::wallet::Model>> {
        let wallets = entity::wallet::Entity
            ::find()
            .filter(entity::wallet::Column::UserId.eq(user_id))
            .order_by_desc(entity::wallet::Column::CreatedAt)
            .all(&self.db).await?;

        Ok(wallets)
    }

    pub async fn find_for_user(&self, user_id: Uuid, id: Uuid) -> Result<entity::wallet::Model> {
        entity::wallet::Entity
            ::find_by_id(id)
            .filter(entity::wallet::Column::UserId.eq(user_id))
            .one(&self.db).await?
            .ok_or(AppError::WalletNotFound)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        changes: WalletChanges
    ) -> Result<entity::wallet::Model> {
        let wallet = self.find_for_user(user_id, id).await?;

        let mut active: entity::wallet::ActiveModel = wallet.into();
        if let Some(address) = changes.address {
            active.address = Set(address);
        }
        if let Some(threshold) = changes.threshold {
            active.threshold = Set(threshold);
        }
        if let Some(nickname) = changes.nickname {
            active.nickname = Set(nickname);
        }
        active.updated_at = Set(Utc::now());

        let wallet = active.update(&self.db).await?;
        Ok(wallet)
    }

    /// Deleting a wallet that is already gone is not an error.
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        entity::wallet::Entity
            ::delete_many()
            .filter(entity::wallet::Column::Id.eq(id))
            .filter(entity::wallet::Column::UserId.eq(user_id))
            .exec(&self.db).await?;
        Ok(())
    }

    /// One page of distinct wallet owners in a stable order.
    pub async fn list_owner_ids(&self, page: u64, page_size: u64) -> Result<Vec<Uuid>> {
        let owners: Vec<Uuid> = entity::wallet::Entity
            ::find()
            .select_only()
            .column(entity::wallet::Column::UserId)
            .distinct()
            .order_by_asc(entity::wallet::Column::UserId)
            .offset(page * page_size)
            .limit(page_size)
            .into_tuple()
            .all(&self.db).await?;

        Ok(owners)
    }
}
