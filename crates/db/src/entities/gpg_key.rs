//! OpenPGP public key entity.
//!
//! One row per key: a primary key row has `primary_key_id = NULL`, a subkey
//! row points at its primary through `primary_key_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored primary key or subkey.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gpg_key")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Account that registered the key.
    pub owner_id: String,

    /// 16 upper-case hex digits; unique across primaries and subkeys.
    #[sea_orm(unique)]
    pub key_id: String,

    /// Key ID of the primary key (subkeys only).
    #[sea_orm(nullable)]
    pub primary_key_id: Option<String>,

    /// Base64 of the serialized public key packet.
    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Bound email addresses as a JSON array (empty for subkeys).
    #[sea_orm(column_type = "Text")]
    pub emails: String,

    /// Key creation time (seconds since the epoch).
    pub created_unix: i64,

    /// Key expiry (seconds since the epoch).
    #[sea_orm(nullable)]
    pub expires_unix: Option<i64>,

    /// When the key was registered (seconds since the epoch).
    pub added_unix: i64,

    pub can_sign: bool,
    pub can_encrypt_comms: bool,
    pub can_encrypt_storage: bool,
    pub can_certify: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
