//! The remote-callable procedure surface.
//!
//! Each procedure checks input shape with [`crate::schema`] and hands the
//! typed input to [`CylinderStore`]. No business rules live here.

use std::sync::Arc;

use gasdesk_core::ServiceError;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::model::{Cylinder, CylinderSummary};
use crate::schema;
use crate::store::CylinderStore;

pub struct CylinderProcedures {
    store: Arc<CylinderStore>,
}

/// Log a failed call at a level matching who is at fault, then pass it on.
fn report(procedure: &str, err: ServiceError) -> ServiceError {
    match &err {
        ServiceError::Storage(_) | ServiceError::Internal(_) => {
            error!(procedure, error = %err, "procedure failed");
        }
        _ => warn!(procedure, code = err.error_code(), error = %err, "procedure rejected"),
    }
    err
}

impl CylinderProcedures {
    pub fn new(store: Arc<CylinderStore>) -> Self {
        Self { store }
    }

    pub fn get_cylinders(&self) -> Result<Vec<Cylinder>, ServiceError> {
        let all = self
            .store
            .find_all()
            .map_err(|e| report("getCylinders", e))?;
        debug!(count = all.len(), "getCylinders");
        Ok(all)
    }

    pub fn create_cylinder(&self, input: &Value) -> Result<Cylinder, ServiceError> {
        let fields = schema::parse_create(input).map_err(|e| report("createCylinder", e))?;
        let created = self
            .store
            .insert(fields)
            .map_err(|e| report("createCylinder", e))?;
        info!(id = %created.id, status = %created.status, "cylinder created");
        Ok(created)
    }

    pub fn update_cylinder(&self, input: &Value) -> Result<Cylinder, ServiceError> {
        let (id, patch) = schema::parse_update(input).map_err(|e| report("updateCylinder", e))?;
        let updated = self
            .store
            .update_by_id(&id, &patch)
            .map_err(|e| report("updateCylinder", e))?;
        info!(id = %updated.id, "cylinder updated");
        Ok(updated)
    }

    pub fn delete_cylinder(&self, input: &Value) -> Result<Cylinder, ServiceError> {
        let id = schema::parse_delete(input).map_err(|e| report("deleteCylinder", e))?;
        let removed = self
            .store
            .delete_by_id(&id)
            .map_err(|e| report("deleteCylinder", e))?;
        info!(id = %removed.id, "cylinder deleted");
        Ok(removed)
    }

    pub fn get_cylinder_summary(&self) -> Result<CylinderSummary, ServiceError> {
        let by_status = self
            .store
            .count_by_status()
            .map_err(|e| report("getCylinderSummary", e))?;
        Ok(CylinderSummary {
            total: by_status.values().sum(),
            by_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::store::tests::{BrokenKv, DeleteBeforeUpdateKv};
    use serde_json::json;

    fn procedures() -> CylinderProcedures {
        let kv = Arc::new(gasdesk_kv::MemoryStore::new());
        CylinderProcedures::new(Arc::new(CylinderStore::new(kv)))
    }

    #[test]
    fn create_returns_input_fields_and_generated_id() {
        let p = procedures();
        let created = p
            .create_cylinder(&json!({"type": "Type A", "capacity": 50, "status": "Full"}))
            .unwrap();

        assert!(!created.id.is_empty());
        let json = serde_json::to_value(&created).unwrap();
        assert_eq!(
            json,
            json!({"id": created.id, "type": "Type A", "capacity": 50, "status": "Full"})
        );
    }

    #[test]
    fn created_ids_are_unique() {
        let p = procedures();
        let mut ids = HashSet::new();
        for i in 0..25 {
            let c = p
                .create_cylinder(&json!({"type": "Type B", "capacity": i, "status": "Empty"}))
                .unwrap();
            assert!(ids.insert(c.id), "duplicate id");
        }
        assert_eq!(p.get_cylinders().unwrap().len(), 25);
    }

    #[test]
    fn update_changes_only_the_given_field() {
        let p = procedures();
        let created = p
            .create_cylinder(&json!({
                "type": "Type A",
                "capacity": 50,
                "status": "Full",
                "location": "Depot 1",
                "customerId": "cust-1",
                "purchaseDate": "2023-03-01",
            }))
            .unwrap();

        let updated = p
            .update_cylinder(&json!({"id": created.id, "capacity": 99}))
            .unwrap();

        assert_eq!(updated.capacity, 99.0);
        assert_eq!(
            Cylinder {
                capacity: created.capacity,
                ..updated
            },
            created
        );
    }

    #[test]
    fn delete_then_list_excludes_the_id() {
        let p = procedures();
        let a = p
            .create_cylinder(&json!({"type": "Type A", "capacity": 50, "status": "Full"}))
            .unwrap();
        let b = p
            .create_cylinder(&json!({"type": "Type B", "capacity": 30, "status": "Empty"}))
            .unwrap();

        let removed = p.delete_cylinder(&json!(a.id)).unwrap();
        assert_eq!(removed, a);

        let ids: Vec<String> = p.get_cylinders().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![b.id]);
    }

    #[test]
    fn missing_id_leaves_store_untouched() {
        let p = procedures();
        p.create_cylinder(&json!({"type": "Type A", "capacity": 50, "status": "Full"}))
            .unwrap();
        let before = p.get_cylinders().unwrap();

        let err = p
            .update_cylinder(&json!({"id": "ghost", "status": "Empty"}))
            .unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");

        let err = p.delete_cylinder(&json!("ghost")).unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");

        assert_eq!(p.get_cylinders().unwrap(), before);
    }

    #[test]
    fn update_losing_to_delete_is_not_found() {
        let kv = DeleteBeforeUpdateKv(gasdesk_kv::MemoryStore::new());
        let p = CylinderProcedures::new(Arc::new(CylinderStore::new(Arc::new(kv))));
        let created = p
            .create_cylinder(&json!({"type": "Type A", "capacity": 50, "status": "Full"}))
            .unwrap();

        let err = p
            .update_cylinder(&json!({"id": created.id, "status": "Empty"}))
            .unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(p.get_cylinders().unwrap().is_empty());
        assert_eq!(p.get_cylinder_summary().unwrap().total, 0);
    }

    #[test]
    fn repeated_reads_are_identical() {
        let p = procedures();
        for status in ["Full", "Empty", "Refilling"] {
            p.create_cylinder(&json!({"type": "Type A", "capacity": 50, "status": status}))
                .unwrap();
        }
        assert_eq!(p.get_cylinders().unwrap(), p.get_cylinders().unwrap());
    }

    #[test]
    fn invalid_input_never_reaches_the_store() {
        let p = procedures();
        let err = p
            .create_cylinder(&json!({"type": "Type A", "status": "Full"}))
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
        assert!(p.get_cylinders().unwrap().is_empty());
    }

    #[test]
    fn summary_counts_by_status() {
        let p = procedures();
        for status in ["Full", "Full", "Empty", "Refilling"] {
            p.create_cylinder(&json!({"type": "Type A", "capacity": 50, "status": status}))
                .unwrap();
        }

        let summary = p.get_cylinder_summary().unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.by_status["Full"], 2);
        assert_eq!(summary.by_status["Empty"], 1);
        assert_eq!(summary.by_status["Refilling"], 1);
    }

    #[test]
    fn store_failure_propagates() {
        let p = CylinderProcedures::new(Arc::new(CylinderStore::new(Arc::new(BrokenKv))));
        assert_eq!(p.get_cylinders().unwrap_err().error_code(), "STORAGE_ERROR");
        assert_eq!(
            p.delete_cylinder(&json!("c1")).unwrap_err().error_code(),
            "STORAGE_ERROR"
        );
    }
}
