//! OpenPGP key repository.
//!
//! A registered key is a hierarchy: one primary row plus one row per subkey.
//! Hierarchies are written and removed as a unit inside a transaction.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{GpgKey, gpg_key};
use crate::records::KeyRecord;
use keyhold_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};

/// Repository for stored OpenPGP keys.
#[derive(Clone)]
pub struct GpgKeyRepository {
    db: Arc<DatabaseConnection>,
}

impl GpgKeyRepository {
    /// Create a new key repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a key record by ID. Subkeys are not attached.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<KeyRecord>> {
        GpgKey::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .map(KeyRecord::try_from)
            .transpose()
    }

    /// Get a key record by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<KeyRecord> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::KeyNotFound(id.to_string()))
    }

    /// Find a primary key or subkey by its OpenPGP key ID.
    pub async fn find_by_key_id(&self, key_id: &str) -> AppResult<Option<KeyRecord>> {
        GpgKey::find()
            .filter(gpg_key::Column::KeyId.eq(key_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .map(KeyRecord::try_from)
            .transpose()
    }

    /// Primary keys registered by an account, oldest first.
    pub async fn find_primary_by_owner(&self, owner_id: &str) -> AppResult<Vec<KeyRecord>> {
        GpgKey::find()
            .filter(gpg_key::Column::OwnerId.eq(owner_id))
            .filter(gpg_key::Column::PrimaryKeyId.is_null())
            .order_by_asc(gpg_key::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .into_iter()
            .map(KeyRecord::try_from)
            .collect()
    }

    /// Subkeys belonging to any of the given primary key IDs.
    pub async fn find_subkeys_of(&self, primary_key_ids: &[String]) -> AppResult<Vec<KeyRecord>> {
        if primary_key_ids.is_empty() {
            return Ok(Vec::new());
        }

        GpgKey::find()
            .filter(gpg_key::Column::PrimaryKeyId.is_in(primary_key_ids.iter().cloned()))
            .order_by_asc(gpg_key::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .into_iter()
            .map(KeyRecord::try_from)
            .collect()
    }

    /// Attach subkeys to each primary record with one query.
    ///
    /// Subkey records pass through unchanged.
    pub async fn attach_subkeys(&self, records: Vec<KeyRecord>) -> AppResult<Vec<KeyRecord>> {
        let primary_ids: Vec<String> = records
            .iter()
            .filter(|r| r.is_primary())
            .map(|r| r.key_id.clone())
            .collect();

        let mut by_primary: HashMap<String, Vec<KeyRecord>> = HashMap::new();
        for subkey in self.find_subkeys_of(&primary_ids).await? {
            if let Some(primary) = subkey.primary_key_id.clone() {
                by_primary.entry(primary).or_default().push(subkey);
            }
        }

        Ok(records
            .into_iter()
            .map(|record| {
                if record.is_primary() {
                    let subkeys = by_primary.remove(&record.key_id).unwrap_or_default();
                    record.with_subkeys(subkeys)
                } else {
                    record
                }
            })
            .collect())
    }

    /// Insert a primary key and its subkeys atomically.
    ///
    /// Fails with [`AppError::KeyIdConflict`] if any key ID is already
    /// stored, including when a concurrent writer wins the race.
    pub async fn insert_hierarchy(
        &self,
        primary: &KeyRecord,
        subkeys: &[KeyRecord],
    ) -> AppResult<()> {
        let key_ids: Vec<String> = std::iter::once(primary)
            .chain(subkeys)
            .map(|r| r.key_id.clone())
            .collect();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let existing = GpgKey::find()
            .filter(gpg_key::Column::KeyId.is_in(key_ids))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(existing) = existing {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Err(AppError::KeyIdConflict(existing.key_id));
        }

        if let Err(err) = insert_rows(&txn, primary, subkeys).await {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Err(err);
        }

        txn.commit()
            .await
            .map_err(|e| insert_error(&e, &primary.key_id))?;

        tracing::debug!(
            key_id = %primary.key_id,
            subkeys = subkeys.len(),
            "Inserted key hierarchy"
        );
        Ok(())
    }

    /// Delete a key record atomically. Deleting a primary key also deletes
    /// its subkeys; deleting a subkey leaves the primary in place.
    ///
    /// Returns the number of rows removed (0 if the record was already gone).
    pub async fn delete_hierarchy(&self, record: &KeyRecord) -> AppResult<u64> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(current) = GpgKey::find_by_id(record.id.as_str())
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        else {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(0);
        };

        let mut removed = 0;
        if current.primary_key_id.is_none() {
            removed += GpgKey::delete_many()
                .filter(gpg_key::Column::PrimaryKeyId.eq(current.key_id.as_str()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?
                .rows_affected;
        }

        removed += GpgKey::delete_by_id(current.id.as_str())
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .rows_affected;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(removed)
    }
}

async fn insert_rows(
    txn: &DatabaseTransaction,
    primary: &KeyRecord,
    subkeys: &[KeyRecord],
) -> AppResult<()> {
    for record in std::iter::once(primary).chain(subkeys) {
        record
            .to_active_model()?
            .insert(txn)
            .await
            .map_err(|e| insert_error(&e, &record.key_id))?;
    }
    Ok(())
}

fn insert_error(err: &DbErr, key_id: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::KeyIdConflict(key_id.to_string()),
        _ => AppError::Database(err.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_key(id: &str, key_id: &str, primary: Option<&str>) -> gpg_key::Model {
        gpg_key::Model {
            id: id.to_string(),
            owner_id: "42".to_string(),
            key_id: key_id.to_string(),
            primary_key_id: primary.map(ToString::to_string),
            content: "xsBNBF".to_string(),
            emails: if primary.is_some() {
                "[]".to_string()
            } else {
                r#"["alice@example.com"]"#.to_string()
            },
            created_unix: 1_500_000_000,
            expires_unix: None,
            added_unix: 1_700_000_000,
            can_sign: primary.is_none(),
            can_encrypt_comms: primary.is_some(),
            can_encrypt_storage: primary.is_some(),
            can_certify: primary.is_none(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let key = create_test_key("k1", "AAAAAAAAAAAAAAAA", None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[key]])
                .into_connection(),
        );

        let repo = GpgKeyRepository::new(db);
        let record = repo.find_by_id("k1").await.unwrap().unwrap();

        assert_eq!(record.key_id, "AAAAAAAAAAAAAAAA");
        assert_eq!(record.emails, vec!["alice@example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<gpg_key::Model>::new()])
                .into_connection(),
        );

        let repo = GpgKeyRepository::new(db);
        let err = repo.get_by_id("missing").await.unwrap_err();

        assert!(matches!(err, AppError::KeyNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_find_by_key_id_returns_subkey() {
        let subkey = create_test_key("k2", "BBBBBBBBBBBBBBBB", Some("AAAAAAAAAAAAAAAA"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[subkey]])
                .into_connection(),
        );

        let repo = GpgKeyRepository::new(db);
        let record = repo.find_by_key_id("BBBBBBBBBBBBBBBB").await.unwrap().unwrap();

        assert!(!record.is_primary());
        assert_eq!(record.primary_key_id.as_deref(), Some("AAAAAAAAAAAAAAAA"));
    }

    #[tokio::test]
    async fn test_attach_subkeys_groups_by_primary() {
        let first = create_test_key("k1", "AAAAAAAAAAAAAAAA", None);
        let second = create_test_key("k3", "CCCCCCCCCCCCCCCC", None);
        let sub = create_test_key("k2", "BBBBBBBBBBBBBBBB", Some("AAAAAAAAAAAAAAAA"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[first, second]])
                .append_query_results([[sub]])
                .into_connection(),
        );

        let repo = GpgKeyRepository::new(db);
        let primaries = repo.find_primary_by_owner("42").await.unwrap();
        let records = repo.attach_subkeys(primaries).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].subkeys.len(), 1);
        assert_eq!(records[0].subkeys[0].key_id, "BBBBBBBBBBBBBBBB");
        assert!(records[1].subkeys.is_empty());
    }

    #[tokio::test]
    async fn test_find_subkeys_of_nothing_skips_query() {
        // No query results are queued: a query would fail
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = GpgKeyRepository::new(db);
        assert!(repo.find_subkeys_of(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_hierarchy_conflict() {
        let existing = create_test_key("old", "AAAAAAAAAAAAAAAA", None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing.clone()]])
                .into_connection(),
        );

        let repo = GpgKeyRepository::new(db);
        let record = KeyRecord::try_from(create_test_key("new", "AAAAAAAAAAAAAAAA", None)).unwrap();
        let err = repo.insert_hierarchy(&record, &[]).await.unwrap_err();

        assert!(matches!(err, AppError::KeyIdConflict(id) if id == "AAAAAAAAAAAAAAAA"));
    }

    #[tokio::test]
    async fn test_delete_subkey_removes_one_row() {
        let sub = create_test_key("k2", "BBBBBBBBBBBBBBBB", Some("AAAAAAAAAAAAAAAA"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[sub.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = GpgKeyRepository::new(db);
        let record = KeyRecord::try_from(sub).unwrap();
        assert_eq!(repo.delete_hierarchy(&record).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_primary_removes_subkeys() {
        let primary = create_test_key("k1", "AAAAAAAAAAAAAAAA", None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[primary.clone()]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let repo = GpgKeyRepository::new(db);
        let record = KeyRecord::try_from(primary).unwrap();
        assert_eq!(repo.delete_hierarchy(&record).await.unwrap(), 3);
    }
}
