//! Per-user document store for read records.
//!
//! Each user owns one sled tree, `users/{uid}/readChapters`, holding one JSON
//! document per read chapter keyed by chapter id.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::ReadRecord;

#[async_trait]
pub trait ReadStore: Send + Sync {
    async fn get(&self, uid: &str, chapter_id: &str) -> Result<Option<ReadRecord>, StoreError>;
    async fn put(&self, uid: &str, record: &ReadRecord) -> Result<(), StoreError>;
    /// Returns whether a record was removed.
    async fn delete(&self, uid: &str, chapter_id: &str) -> Result<bool, StoreError>;
    /// Every document in the user's namespace as `(key, record)`, in key order.
    async fn list(&self, uid: &str) -> Result<Vec<(String, ReadRecord)>, StoreError>;
}

#[derive(Clone)]
pub struct SledReadStore {
    db: sled::Db,
}

impl SledReadStore {
    pub fn new(db: sled::Db) -> Self {
        Self { db }
    }

    fn tree(&self, uid: &str) -> Result<sled::Tree, StoreError> {
        Ok(self.db.open_tree(namespace(uid))?)
    }
}

pub fn namespace(uid: &str) -> String {
    format!("users/{}/readChapters", uid)
}

fn decode(key: &[u8], value: &[u8]) -> Result<ReadRecord, StoreError> {
    serde_json::from_slice(value).map_err(|source| StoreError::Decode {
        key: String::from_utf8_lossy(key).to_string(),
        source,
    })
}

#[async_trait]
impl ReadStore for SledReadStore {
    async fn get(&self, uid: &str, chapter_id: &str) -> Result<Option<ReadRecord>, StoreError> {
        let tree = self.tree(uid)?;
        match tree.get(chapter_id.as_bytes())? {
            Some(value) => Ok(Some(decode(chapter_id.as_bytes(), &value)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, uid: &str, record: &ReadRecord) -> Result<(), StoreError> {
        let tree = self.tree(uid)?;
        let value = serde_json::to_vec(record)?;
        tree.insert(record.id.as_bytes(), value)?;
        Ok(())
    }

    async fn delete(&self, uid: &str, chapter_id: &str) -> Result<bool, StoreError> {
        let tree = self.tree(uid)?;
        Ok(tree.remove(chapter_id.as_bytes())?.is_some())
    }

    async fn list(&self, uid: &str) -> Result<Vec<(String, ReadRecord)>, StoreError> {
        let tree = self.tree(uid)?;
        let mut records = Vec::new();
        for item in tree.iter() {
            let (key, value) = item?;
            let record = decode(&key, &value)?;
            records.push((String::from_utf8_lossy(&key).to_string(), record));
        }
        Ok(records)
    }
}
