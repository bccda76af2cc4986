//! Create OpenPGP key table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GpgKey::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GpgKey::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GpgKey::OwnerId).string_len(32).not_null())
                    .col(ColumnDef::new(GpgKey::KeyId).string_len(16).not_null())
                    .col(ColumnDef::new(GpgKey::PrimaryKeyId).string_len(16).null())
                    .col(ColumnDef::new(GpgKey::Content).text().not_null())
                    .col(ColumnDef::new(GpgKey::Emails).text().not_null())
                    .col(ColumnDef::new(GpgKey::CreatedUnix).big_integer().not_null())
                    .col(ColumnDef::new(GpgKey::ExpiresUnix).big_integer().null())
                    .col(ColumnDef::new(GpgKey::AddedUnix).big_integer().not_null())
                    .col(
                        ColumnDef::new(GpgKey::CanSign)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GpgKey::CanEncryptComms)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GpgKey::CanEncryptStorage)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GpgKey::CanCertify)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gpg_key_owner")
                            .from(GpgKey::Table, GpgKey::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: key_id, shared by primaries and subkeys
        manager
            .create_index(
                Index::create()
                    .name("idx_gpg_key_key_id")
                    .table(GpgKey::Table)
                    .col(GpgKey::KeyId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: primary_key_id (subkey lookups and cascade deletes)
        manager
            .create_index(
                Index::create()
                    .name("idx_gpg_key_primary_key_id")
                    .table(GpgKey::Table)
                    .col(GpgKey::PrimaryKeyId)
                    .to_owned(),
            )
            .await?;

        // Index: owner_id
        manager
            .create_index(
                Index::create()
                    .name("idx_gpg_key_owner_id")
                    .table(GpgKey::Table)
                    .col(GpgKey::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GpgKey::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum GpgKey {
    Table,
    Id,
    OwnerId,
    KeyId,
    PrimaryKeyId,
    Content,
    Emails,
    CreatedUnix,
    ExpiresUnix,
    AddedUnix,
    CanSign,
    CanEncryptComms,
    CanEncryptStorage,
    CanCertify,
}

#[derive(Iden)]
pub enum User {
    Table,
    Id,
}
