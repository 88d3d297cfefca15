use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(UserSettings::Table)
                .if_not_exists()
                .col(ColumnDef::new(UserSettings::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(UserSettings::UserId).uuid().not_null().unique_key())
                .col(
                    ColumnDef::new(UserSettings::EmailNotifications)
                        .boolean()
                        .not_null()
                        .default(true)
                )
                .col(
                    ColumnDef::new(UserSettings::NotificationFrequency)
                        .string()
                        .not_null()
                        .default("immediate")
                ) // "immediate", "hourly", "daily"
                .col(ColumnDef::new(UserSettings::NotificationEmails).json_binary().not_null())
                .col(ColumnDef::new(UserSettings::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(UserSettings::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserSettings::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UserSettings {
    Table,
    Id,
    UserId,
    EmailNotifications,
    NotificationFrequency,
    NotificationEmails,
    CreatedAt,
    UpdatedAt,
}
