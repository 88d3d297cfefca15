use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::db::entity::user_settings::{ self, EmailList };
use crate::enums::NotificationFrequency;
use crate::error::{ AppError, Result };

/// Partial settings write. Fields left as `None` keep their stored value,
/// or take the default when the row is created.
#[derive(Debug, Clone, Default)]
pub struct SettingsChanges {
    pub email_notifications: Option<bool>,
    pub notification_frequency: Option<NotificationFrequency>,
    pub notification_emails: Option<Vec<String>>,
}

pub struct SettingsRepository {
    db: DatabaseConnection,
}

impl SettingsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// `None` when the user has never saved settings.
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<user_settings::Model>> {
        let settings = user_settings::Entity
            ::find()
            .filter(user_settings::Column::UserId.eq(user_id))
            .one(&self.db).await?;
        Ok(settings)
    }

    /// Create-or-update in a single statement keyed on `user_id`.
    pub async fn upsert(
        &self,
        user_id: Uuid,
        changes: SettingsChanges
    ) -> Result<user_settings::Model> {
        let now = Utc::now();

        let mut update_columns = vec![user_settings::Column::UpdatedAt];
        if changes.email_notifications.is_some() {
            update_columns.push(user_settings::Column::EmailNotifications);
        }
        if changes.notification_frequency.is_some() {
            update_columns.push(user_settings::Column::NotificationFrequency);
        }
        if changes.notification_emails.is_some() {
            update_columns.push(user_settings::Column::NotificationEmails);
        }

        let settings = user_settings::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            email_notifications: Set(changes.email_notifications.unwrap_or(true)),
            notification_frequency: Set(
                changes.notification_frequency.unwrap_or_default().to_string()
            ),
            notification_emails: Set(EmailList(changes.notification_emails.unwrap_or_default())),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user_settings::Entity
            ::insert(settings)
            .on_conflict(
                OnConflict::column(user_settings::Column::UserId)
                    .update_columns(update_columns)
                    .to_owned()
            )
            .exec_without_returning(&self.db).await?;

        self.find_by_user(user_id).await?.ok_or_else(||
            AppError::Internal("Settings row missing after upsert".to_string())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_get_missing_settings_is_none() {
        let db = setup_test_db().await;
        let repo = SettingsRepository::new(db);

        assert!(repo.find_by_user(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_creates_with_defaults() {
        let db = setup_test_db().await;
        let repo = SettingsRepository::new(db);
        let owner = Uuid::new_v4();

        let settings = repo
            .upsert(owner, SettingsChanges {
                notification_frequency: Some(NotificationFrequency::Daily),
                ..Default::default()
            }).await
            .unwrap();

        assert_eq!(settings.user_id, owner);
        assert!(settings.email_notifications);
        assert_eq!(settings.frequency(), NotificationFrequency::Daily);
        assert!(settings.emails().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_updates_only_given_fields() {
        let db = setup_test_db().await;
        let repo = SettingsRepository::new(db);
        let owner = Uuid::new_v4();

        let created = repo
            .upsert(owner, SettingsChanges {
                notification_emails: Some(vec!["ops@example.com".to_string()]),
                notification_frequency: Some(NotificationFrequency::Hourly),
                ..Default::default()
            }).await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = repo
            .upsert(owner, SettingsChanges {
                email_notifications: Some(false),
                ..Default::default()
            }).await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert!(!updated.email_notifications);
        assert_eq!(updated.frequency(), NotificationFrequency::Hourly);
        assert_eq!(updated.emails(), ["ops@example.com".to_string()]);
        assert!(updated.updated_at > created.updated_at);
    }
}
