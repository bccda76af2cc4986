//! Account lookups consumed by key management.
//!
//! Key services only need two facts about accounts: which email addresses
//! an owner has (and whether each is verified) and whether a user is an
//! administrator. [`AccountDirectory`] is that boundary.

use async_trait::async_trait;
use keyhold_common::AppResult;
use keyhold_db::repositories::{EmailAddressRepository, UserRepository};
use serde::{Deserialize, Serialize};

/// An email address registered to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEmail {
    /// The address as the account registered it.
    pub email: String,
    /// Whether the account proved ownership of it.
    pub verified: bool,
}

impl AccountEmail {
    #[must_use]
    pub fn new(email: impl Into<String>, verified: bool) -> Self {
        Self {
            email: email.into(),
            verified,
        }
    }
}

/// Source of account facts.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// All email addresses of an account, verified or not.
    async fn account_emails(&self, owner_id: &str) -> AppResult<Vec<AccountEmail>>;

    /// Whether the user may act on other accounts' keys. Unknown users are
    /// not administrators.
    async fn is_admin(&self, user_id: &str) -> AppResult<bool>;
}

/// [`AccountDirectory`] backed by the `user` and `email_address` tables.
#[derive(Clone)]
pub struct DbAccountDirectory {
    user_repo: UserRepository,
    email_repo: EmailAddressRepository,
}

impl DbAccountDirectory {
    #[must_use]
    pub const fn new(user_repo: UserRepository, email_repo: EmailAddressRepository) -> Self {
        Self {
            user_repo,
            email_repo,
        }
    }
}

#[async_trait]
impl AccountDirectory for DbAccountDirectory {
    async fn account_emails(&self, owner_id: &str) -> AppResult<Vec<AccountEmail>> {
        Ok(self
            .email_repo
            .find_by_user_id(owner_id)
            .await?
            .into_iter()
            .map(|m| AccountEmail::new(m.email, m.is_verified))
            .collect())
    }

    async fn is_admin(&self, user_id: &str) -> AppResult<bool> {
        Ok(self
            .user_repo
            .find_by_id(user_id)
            .await?
            .is_some_and(|user| user.is_admin))
    }
}
