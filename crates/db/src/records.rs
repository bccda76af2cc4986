//! Materialised key records.
//!
//! [`KeyRecord`] is the shape services work with. Conversions to and from the
//! `gpg_key` row are plain functions; nothing here touches the database.

use chrono::{DateTime, Utc};
use keyhold_common::{AppError, AppResult};
use sea_orm::Set;

use crate::entities::gpg_key;

/// A stored primary key or subkey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    /// Record ID (lowercase ULID).
    pub id: String,
    /// Owning account.
    pub owner_id: String,
    /// OpenPGP key ID, 16 upper-case hex digits.
    pub key_id: String,
    /// `None` for primary keys.
    pub primary_key_id: Option<String>,
    /// Base64 of the key packet.
    pub content: String,
    /// Verified emails bound to a primary key; empty for subkeys.
    pub emails: Vec<String>,
    /// Creation time of the key packet.
    pub created_at: DateTime<Utc>,
    /// Expiry declared by the self-signature.
    pub expires_at: Option<DateTime<Utc>>,
    /// Registration time.
    pub added_at: DateTime<Utc>,
    /// May sign data.
    pub can_sign: bool,
    /// May encrypt communications.
    pub can_encrypt_comms: bool,
    /// May encrypt storage.
    pub can_encrypt_storage: bool,
    /// May certify other keys.
    pub can_certify: bool,
    /// Loaded explicitly; empty until attached.
    pub subkeys: Vec<KeyRecord>,
}

impl KeyRecord {
    #[must_use]
    pub const fn is_primary(&self) -> bool {
        self.primary_key_id.is_none()
    }

    #[must_use]
    pub fn with_subkeys(mut self, subkeys: Vec<Self>) -> Self {
        self.subkeys = subkeys;
        self
    }

    /// Build the row to insert. Attached subkeys are not included.
    pub fn to_active_model(&self) -> AppResult<gpg_key::ActiveModel> {
        Ok(gpg_key::ActiveModel {
            id: Set(self.id.clone()),
            owner_id: Set(self.owner_id.clone()),
            key_id: Set(self.key_id.clone()),
            primary_key_id: Set(self.primary_key_id.clone()),
            content: Set(self.content.clone()),
            emails: Set(encode_emails(&self.emails)?),
            created_unix: Set(to_unix(self.created_at)),
            expires_unix: Set(self.expires_at.map(to_unix)),
            added_unix: Set(to_unix(self.added_at)),
            can_sign: Set(self.can_sign),
            can_encrypt_comms: Set(self.can_encrypt_comms),
            can_encrypt_storage: Set(self.can_encrypt_storage),
            can_certify: Set(self.can_certify),
        })
    }
}

impl TryFrom<gpg_key::Model> for KeyRecord {
    type Error = AppError;

    fn try_from(model: gpg_key::Model) -> AppResult<Self> {
        Ok(Self {
            emails: decode_emails(&model.emails)?,
            created_at: from_unix(model.created_unix)?,
            expires_at: model.expires_unix.map(from_unix).transpose()?,
            added_at: from_unix(model.added_unix)?,
            id: model.id,
            owner_id: model.owner_id,
            key_id: model.key_id,
            primary_key_id: model.primary_key_id,
            content: model.content,
            can_sign: model.can_sign,
            can_encrypt_comms: model.can_encrypt_comms,
            can_encrypt_storage: model.can_encrypt_storage,
            can_certify: model.can_certify,
            subkeys: Vec::new(),
        })
    }
}

/// Seconds since the epoch; sub-second precision is dropped.
#[must_use]
pub const fn to_unix(at: DateTime<Utc>) -> i64 {
    at.timestamp()
}

/// Inverse of [`to_unix`].
pub fn from_unix(secs: i64) -> AppResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AppError::Database(format!("timestamp out of range: {secs}")))
}

/// JSON array text for the `emails` column.
pub fn encode_emails(emails: &[String]) -> AppResult<String> {
    serde_json::to_string(emails).map_err(|e| AppError::Internal(e.to_string()))
}

/// Parse the `emails` column.
pub fn decode_emails(column: &str) -> AppResult<Vec<String>> {
    serde_json::from_str(column)
        .map_err(|e| AppError::Database(format!("invalid emails column: {e}")))
}
