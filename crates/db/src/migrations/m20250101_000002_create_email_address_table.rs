//! Create email address table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailAddress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmailAddress::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmailAddress::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(EmailAddress::Email)
                            .string_len(320)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(EmailAddress::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(EmailAddress::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_email_address_user")
                            .from(EmailAddress::Table, EmailAddress::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_email_address_user_id")
                    .table(EmailAddress::Table)
                    .col(EmailAddress::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailAddress::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum EmailAddress {
    Table,
    Id,
    UserId,
    Email,
    IsVerified,
    CreatedAt,
}

#[derive(Iden)]
pub enum User {
    Table,
    Id,
}
