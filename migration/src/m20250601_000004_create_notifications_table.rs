use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign key to wallets: rows outlive the wallet they describe
        manager.create_table(
            Table::create()
                .table(Notifications::Table)
                .if_not_exists()
                .col(ColumnDef::new(Notifications::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Notifications::UserId).uuid().not_null())
                .col(ColumnDef::new(Notifications::WalletId).uuid().not_null())
                .col(ColumnDef::new(Notifications::WalletAddress).string().not_null())
                .col(ColumnDef::new(Notifications::WalletNickname).string())
                .col(ColumnDef::new(Notifications::Balance).decimal().not_null())
                .col(ColumnDef::new(Notifications::Threshold).decimal().not_null())
                .col(
                    ColumnDef::new(Notifications::EmailSent).boolean().not_null().default(false)
                )
                .col(ColumnDef::new(Notifications::SentAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_notifications_user_sent_at")
                .table(Notifications::Table)
                .col(Notifications::UserId)
                .col(Notifications::SentAt)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_notifications_wallet_sent_at")
                .table(Notifications::Table)
                .col(Notifications::WalletId)
                .col(Notifications::SentAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Notifications::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserId,
    WalletId,
    WalletAddress,
    WalletNickname,
    Balance,
    Threshold,
    EmailSent,
    SentAt,
}
