//! Email address repository.

use std::sync::Arc;

use crate::entities::{EmailAddress, email_address};
use keyhold_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// Email address repository for database operations.
#[derive(Clone)]
pub struct EmailAddressRepository {
    db: Arc<DatabaseConnection>,
}

impl EmailAddressRepository {
    /// Create a new email address repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All addresses of a user, verified or not, oldest first.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Vec<email_address::Model>> {
        EmailAddress::find()
            .filter(email_address::Column::UserId.eq(user_id))
            .order_by_asc(email_address::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an address record by the address itself.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<email_address::Model>> {
        EmailAddress::find()
            .filter(email_address::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new address record.
    pub async fn create(
        &self,
        model: email_address::ActiveModel,
    ) -> AppResult<email_address::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark an address as verified.
    pub async fn mark_verified(&self, id: &str) -> AppResult<email_address::Model> {
        let model = EmailAddress::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("EmailAddress: {id}")))?;

        let mut active: email_address::ActiveModel = model.into();
        active.is_verified = Set(true);
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
