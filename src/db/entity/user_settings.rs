use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{ Deserialize, Serialize };

use crate::enums::NotificationFrequency;

/// Ordered recipient list stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct EmailList(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub email_notifications: bool,
    pub notification_frequency: String, // "immediate", "hourly", "daily"
    #[sea_orm(column_type = "JsonBinary")]
    pub notification_emails: EmailList,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Stored frequency, falling back to `immediate` for unrecognised values.
    pub fn frequency(&self) -> NotificationFrequency {
        self.notification_frequency.parse().unwrap_or_default()
    }

    pub fn emails(&self) -> &[String] {
        &self.notification_emails.0
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
