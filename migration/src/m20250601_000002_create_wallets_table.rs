use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Wallets::Table)
                .if_not_exists()
                .col(ColumnDef::new(Wallets::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Wallets::UserId).uuid().not_null())
                .col(ColumnDef::new(Wallets::Address).string().not_null())
                .col(ColumnDef::new(Wallets::Nickname).string())
                .col(ColumnDef::new(Wallets::Threshold).decimal().not_null())
                .col(ColumnDef::new(Wallets::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Wallets::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        // Owner listing is always newest-first
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_wallets_user_created")
                .table(Wallets::Table)
                .col(Wallets::UserId)
                .col(Wallets::CreatedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Wallets::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Wallets {
    Table,
    Id,
    UserId,
    Address,
    Nickname,
    Threshold,
    CreatedAt,
    UpdatedAt,
}
