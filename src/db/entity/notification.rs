use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// A fired low-balance alert. Wallet fields are snapshots taken at evaluation time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub wallet_id: Uuid,
    pub wallet_address: String,
    pub wallet_nickname: Option<String>,
    pub balance: Decimal,
    pub threshold: Decimal,
    pub email_sent: bool,
    pub sent_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
