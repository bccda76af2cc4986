//! Account email address entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An email address registered to an account.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_address")]
pub struct Model {
    /// Unique identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Account that registered this address.
    pub user_id: String,

    /// The address, as entered.
    #[sea_orm(unique)]
    pub email: String,

    /// Whether the account proved control of this address.
    #[sea_orm(default_value = false)]
    pub is_verified: bool,

    /// When this address was added.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
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
