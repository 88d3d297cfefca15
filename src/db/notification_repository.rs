use chrono::{ DateTime, Utc };
use sea_orm::{
    prelude::Decimal,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
};
use uuid::Uuid;

use crate::db::entity::{ notification, Notification };
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub wallet_id: Uuid,
    pub wallet_address: String,
    pub wallet_nickname: Option<String>,
    pub balance: Decimal,
    pub threshold: Decimal,
}

pub struct NotificationRepository {
    db: DatabaseConnection,
}

impl NotificationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewNotification) -> Result<notification::Model> {
        let model = notification::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new.user_id),
            wallet_id: Set(new.wallet_id),
            wallet_address: Set(new.wallet_address),
            wallet_nickname: Set(new.wallet_nickname),
            balance: Set(new.balance),
            threshold: Set(new.threshold),
            email_sent: Set(true),
            sent_at: Set(Utc::now()),
        };

        let notification = Notification::insert(model).exec_with_returning(&self.db).await?;
        Ok(notification)
    }

    /// Newest first, optionally capped at `limit` rows.
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        limit: Option<u64>
    ) -> Result<Vec<notification::Model>> {
        let mut query = Notification::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::SentAt);

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let notifications = query.all(&self.db).await?;
        Ok(notifications)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        Notification::delete_many()
            .filter(notification::Column::Id.eq(id))
            .filter(notification::Column::UserId.eq(user_id))
            .exec(&self.db).await?;
        Ok(())
    }

    /// When the most recent alert for `wallet_id` was written, if ever.
    pub async fn last_sent_for_wallet(&self, wallet_id: Uuid) -> Result<Option<DateTime<Utc>>> {
        let latest = Notification::find()
            .filter(notification::Column::WalletId.eq(wallet_id))
            .order_by_desc(notification::Column::SentAt)
            .one(&self.db).await?;

        Ok(latest.map(|n| n.sent_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ dec, setup_test_db };

    fn new_notification(user_id: Uuid, wallet_id: Uuid) -> NewNotification {
        NewNotification {
            user_id,
            wallet_id,
            wallet_address: "0xabcdef123456".to_string(),
            wallet_nickname: Some("treasury".to_string()),
            balance: dec("3"),
            threshold: dec("10"),
        }
    }

    #[tokio::test]
    async fn test_create_sets_sent_fields() {
        let db = setup_test_db().await;
        let repo = NotificationRepository::new(db);
        let owner = Uuid::new_v4();
        let wallet_id = Uuid::new_v4();

        let before = Utc::now();
        let created = repo.create(new_notification(owner, wallet_id)).await.unwrap();

        assert!(created.email_sent);
        assert!(created.sent_at >= before);
        assert_eq!(created.balance, dec("3"));
        assert_eq!(created.threshold, dec("10"));
        assert_eq!(repo.last_sent_for_wallet(wallet_id).await.unwrap(), Some(created.sent_at));
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_limited() {
        let db = setup_test_db().await;
        let repo = NotificationRepository::new(db);
        let owner = Uuid::new_v4();

        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(repo.create(new_notification(owner, Uuid::new_v4())).await.unwrap().id);
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let all = repo.find_by_user(owner, None).await.unwrap();
        assert_eq!(all.iter().map(|n| n.id).collect::<Vec<_>>(), vec![ids[2], ids[1], ids[0]]);

        let limited = repo.find_by_user(owner, Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, ids[2]);
    }

    #[tokio::test]
    async fn test_delete_is_scoped_to_owner() {
        let db = setup_test_db().await;
        let repo = NotificationRepository::new(db);
        let owner = Uuid::new_v4();

        let created = repo.create(new_notification(owner, Uuid::new_v4())).await.unwrap();

        repo.delete(Uuid::new_v4(), created.id).await.unwrap();
        assert_eq!(repo.find_by_user(owner, None).await.unwrap().len(), 1);

        repo.delete(owner, created.id).await.unwrap();
        assert!(repo.find_by_user(owner, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_last_sent_for_unknown_wallet() {
        let db = setup_test_db().await;
        let repo = NotificationRepository::new(db);

        assert_eq!(repo.last_sent_for_wallet(Uuid::new_v4()).await.unwrap(), None);
    }
}
