use std::collections::BTreeMap;
use std::sync::Arc;

use gasdesk_core::{new_id, ServiceError};
use gasdesk_kv::{KVError, KVStore};

use crate::model::{Cylinder, CylinderFields, CylinderPatch};

/// KV key prefix: "{module}:{resource}:".
const PREFIX: &str = "cylinder:cylinder:";

fn make_key(id: &str) -> String {
    format!("{}{}", PREFIX, id)
}

fn kv_err(e: KVError) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("cylinder '{}' not found", id))
}

fn decode(bytes: &[u8]) -> Result<Cylinder, ServiceError> {
    serde_json::from_slice(bytes).map_err(|e| ServiceError::Internal(format!("deserialize: {}", e)))
}

fn encode(record: &Cylinder) -> Result<Vec<u8>, ServiceError> {
    serde_json::to_vec(record).map_err(|e| ServiceError::Internal(format!("serialize: {}", e)))
}

/// Persistent storage for cylinders, one JSON document per record.
///
/// Every method is a single backend call. Writes to one id are atomic: an
/// update never lands on a record that a concurrent delete already removed.
/// Concurrent updates to the same id apply in commit order.
pub struct CylinderStore {
    kv: Arc<dyn KVStore>,
}

impl CylinderStore {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }

    /// Every stored record, ordered by id.
    pub fn find_all(&self) -> Result<Vec<Cylinder>, ServiceError> {
        let entries = self.kv.scan(PREFIX).map_err(kv_err)?;
        entries.iter().map(|(_key, bytes)| decode(bytes)).collect()
    }

    /// Get a record by id. Returns None if not found.
    pub fn get(&self, id: &str) -> Result<Option<Cylinder>, ServiceError> {
        match self.kv.get(&make_key(id)).map_err(kv_err)? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Assign a fresh id, persist, and return the stored record.
    pub fn insert(&self, fields: CylinderFields) -> Result<Cylinder, ServiceError> {
        let record = fields.into_cylinder(new_id());
        let key = make_key(&record.id);

        if !self.kv.insert_new(&key, &encode(&record)?).map_err(kv_err)? {
            return Err(ServiceError::Conflict(format!(
                "cylinder '{}' already exists",
                record.id
            )));
        }
        Ok(record)
    }

    /// Merge `patch` into the stored record and return the result.
    ///
    /// The read and the write share one backend transaction, so a record
    /// deleted before the update commits stays deleted and the update
    /// reports NotFound.
    pub fn update_by_id(&self, id: &str, patch: &CylinderPatch) -> Result<Cylinder, ServiceError> {
        let mut outcome: Option<Result<Cylinder, ServiceError>> = None;

        self.kv
            .update(&make_key(id), &mut |bytes| {
                let step = decode(bytes).and_then(|mut record| {
                    if patch.is_empty() {
                        return Ok((record, None));
                    }
                    record.apply(patch);
                    let next = encode(&record)?;
                    Ok((record, Some(next)))
                });
                match step {
                    Ok((record, next)) => {
                        outcome = Some(Ok(record));
                        next
                    }
                    Err(e) => {
                        outcome = Some(Err(e));
                        None
                    }
                }
            })
            .map_err(kv_err)?;

        outcome.unwrap_or_else(|| Err(not_found(id)))
    }

    /// Remove a record and return what was removed.
    pub fn delete_by_id(&self, id: &str) -> Result<Cylinder, ServiceError> {
        let bytes = self
            .kv
            .take(&make_key(id))
            .map_err(kv_err)?
            .ok_or_else(|| not_found(id))?;
        decode(&bytes)
    }

    /// Number of records per status value.
    pub fn count_by_status(&self) -> Result<BTreeMap<String, usize>, ServiceError> {
        let mut counts = BTreeMap::new();
        for record in self.find_all()? {
            *counts.entry(record.status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
