//! OpenPGP key service.
//!
//! Registration runs decode, identity binding and capability derivation
//! before touching storage, then hands the whole hierarchy to the
//! repository in one transaction.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use keyhold_common::{AppError, AppResult, IdGenerator, KeysConfig};
use keyhold_db::{KeyRecord, repositories::GpgKeyRepository};
use keyhold_openpgp::{ParsedKey, decode_armored};
use serde::{Deserialize, Serialize};

use super::account_directory::{AccountDirectory, AccountEmail};
use super::identity::bind_identities;

/// Email bound to a key, with its current verification state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpgKeyEmail {
    /// Address named by a user ID of the key.
    pub email: String,
    /// Whether the owner's address is verified right now.
    pub verified: bool,
}

/// API view of a stored key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpgKeyView {
    /// Record ID.
    pub id: String,
    /// Key ID of the primary key; `None` for primary keys.
    pub primary_key_id: Option<String>,
    /// OpenPGP key ID, 16 upper-case hex digits.
    pub key_id: String,
    /// Base64 of the key packet.
    pub public_key: String,
    /// Emails bound at registration.
    pub emails: Vec<GpgKeyEmail>,
    /// Subkeys of a primary key.
    pub subkeys: Vec<GpgKeyView>,
    /// May sign data.
    pub can_sign: bool,
    /// May encrypt communications.
    pub can_encrypt_comms: bool,
    /// May encrypt storage.
    pub can_encrypt_storage: bool,
    /// May certify other keys.
    pub can_certify: bool,
    /// Creation time of the key packet.
    pub created_at: DateTime<Utc>,
    /// Expiry, if the key declares one.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the key was registered.
    pub added_at: DateTime<Utc>,
}

impl GpgKeyView {
    /// Build a view; `verified` reflects the owner's current addresses.
    #[must_use]
    pub fn from_record(record: &KeyRecord, account_emails: &[AccountEmail]) -> Self {
        let emails = record
            .emails
            .iter()
            .map(|email| GpgKeyEmail {
                email: email.clone(),
                verified: account_emails
                    .iter()
                    .any(|a| a.verified && a.email == *email),
            })
            .collect();

        Self {
            id: record.id.clone(),
            primary_key_id: record.primary_key_id.clone(),
            key_id: record.key_id.clone(),
            public_key: record.content.clone(),
            emails,
            subkeys: record
                .subkeys
                .iter()
                .map(|sub| Self::from_record(sub, account_emails))
                .collect(),
            can_sign: record.can_sign,
            can_encrypt_comms: record.can_encrypt_comms,
            can_encrypt_storage: record.can_encrypt_storage,
            can_certify: record.can_certify,
            created_at: record.created_at,
            expires_at: record.expires_at,
            added_at: record.added_at,
        }
    }
}

/// Key management service.
#[derive(Clone)]
pub struct GpgKeyService {
    gpg_key_repo: GpgKeyRepository,
    accounts: Arc<dyn AccountDirectory>,
    keys_config: KeysConfig,
    id_gen: IdGenerator,
}

impl GpgKeyService {
    /// Create a new key service.
    #[must_use]
    pub fn new(
        gpg_key_repo: GpgKeyRepository,
        accounts: Arc<dyn AccountDirectory>,
        keys_config: KeysConfig,
    ) -> Self {
        Self {
            gpg_key_repo,
            accounts,
            keys_config,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register an armored public key for an account.
    ///
    /// Returns the primary record with its subkeys attached.
    pub async fn add_key(&self, owner_id: &str, armored: &str) -> AppResult<KeyRecord> {
        let limit = self.keys_config.max_armored_bytes;
        if armored.len() > limit {
            tracing::warn!(owner_id, size = armored.len(), limit, "Rejected oversized key");
            return Err(AppError::MalformedKey(format!(
                "armored key is larger than {limit} bytes"
            )));
        }

        let entity = decode_armored(armored).map_err(|e| {
            tracing::warn!(owner_id, error = %e, "Rejected malformed key");
            AppError::MalformedKey(e.to_string())
        })?;

        let account_emails = self.accounts.account_emails(owner_id).await?;
        let emails = bind_identities(&entity.identities, &account_emails).inspect_err(|e| {
            tracing::warn!(owner_id, error = %e, "Rejected key with unverified identity");
        })?;

        let added_at = Utc::now();
        let primary = self.new_record(owner_id, &entity.primary, None, emails, added_at);
        let subkeys: Vec<KeyRecord> = entity
            .subkeys
            .iter()
            .map(|sub| self.new_record(owner_id, sub, Some(&primary.key_id), Vec::new(), added_at))
            .collect();

        let mut seen = HashSet::new();
        if let Some(dup) = std::iter::once(&primary)
            .chain(&subkeys)
            .find(|r| !seen.insert(r.key_id.as_str()))
        {
            return Err(AppError::KeyIdConflict(dup.key_id.clone()));
        }

        self.gpg_key_repo.insert_hierarchy(&primary, &subkeys).await?;

        tracing::info!(
            owner_id,
            key_id = %primary.key_id,
            subkeys = subkeys.len(),
            "Added OpenPGP key"
        );
        Ok(primary.with_subkeys(subkeys))
    }

    /// Get a key by record ID; primaries come with their subkeys.
    pub async fn get_key(&self, id: &str) -> AppResult<KeyRecord> {
        let record = self.gpg_key_repo.get_by_id(id).await?;
        self.with_subkeys(record).await
    }

    /// Get a primary key or subkey by its OpenPGP key ID.
    pub async fn get_key_by_key_id(&self, key_id: &str) -> AppResult<KeyRecord> {
        let record = self
            .gpg_key_repo
            .find_by_key_id(&key_id.to_uppercase())
            .await?
            .ok_or_else(|| AppError::KeyNotFound(key_id.to_string()))?;
        self.with_subkeys(record).await
    }

    /// Primary keys of an account with their subkeys, oldest first.
    pub async fn list_keys(&self, owner_id: &str) -> AppResult<Vec<KeyRecord>> {
        let primaries = self.gpg_key_repo.find_primary_by_owner(owner_id).await?;
        tracing::debug!(owner_id, count = primaries.len(), "Listed OpenPGP keys");
        self.gpg_key_repo.attach_subkeys(primaries).await
    }

    /// Delete a key. Deleting a primary key deletes its subkeys too.
    ///
    /// Only the owner or an administrator may delete. Deleting a key that
    /// does not exist succeeds.
    pub async fn delete_key(&self, requestor_id: &str, id: &str) -> AppResult<()> {
        let Some(record) = self.gpg_key_repo.find_by_id(id).await? else {
            tracing::debug!(requestor_id, id, "Key already absent");
            return Ok(());
        };

        if record.owner_id != requestor_id && !self.accounts.is_admin(requestor_id).await? {
            tracing::warn!(requestor_id, id, owner_id = %record.owner_id, "Key deletion denied");
            return Err(AppError::AccessDenied(
                "only the owner or an administrator may delete this key".to_string(),
            ));
        }

        let removed = self.gpg_key_repo.delete_hierarchy(&record).await?;
        tracing::info!(
            requestor_id,
            key_id = %record.key_id,
            removed,
            "Deleted OpenPGP key"
        );
        Ok(())
    }

    /// Render a record for API consumers.
    pub async fn view(&self, record: &KeyRecord) -> AppResult<GpgKeyView> {
        let account_emails = self.accounts.account_emails(&record.owner_id).await?;
        Ok(GpgKeyView::from_record(record, &account_emails))
    }

    async fn with_subkeys(&self, record: KeyRecord) -> AppResult<KeyRecord> {
        if !record.is_primary() {
            return Ok(record);
        }
        let subkeys = self
            .gpg_key_repo
            .find_subkeys_of(std::slice::from_ref(&record.key_id))
            .await?;
        Ok(record.with_subkeys(subkeys))
    }

    fn new_record(
        &self,
        owner_id: &str,
        key: &ParsedKey,
        primary_key_id: Option<&str>,
        emails: Vec<String>,
        added_at: DateTime<Utc>,
    ) -> KeyRecord {
        let caps = key.capabilities();
        KeyRecord {
            id: self.id_gen.generate(),
            owner_id: owner_id.to_string(),
            key_id: key.key_id().to_string(),
            primary_key_id: primary_key_id.map(ToString::to_string),
            content: key.content(),
            emails,
            created_at: key.created_at(),
            expires_at: key.expires_at(),
            added_at,
            can_sign: caps.can_sign,
            can_encrypt_comms: caps.can_encrypt_comms,
            can_encrypt_storage: caps.can_encrypt_storage,
            can_certify: caps.can_certify,
            subkeys: Vec::new(),
        }
    }
}
