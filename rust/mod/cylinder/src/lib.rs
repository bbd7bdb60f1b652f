//! Cylinder inventory module: record store plus the procedure surface
//! (`getCylinders`, `createCylinder`, `updateCylinder`, `deleteCylinder`,
//! `getCylinderSummary`) served over HTTP.

pub mod api;
pub mod model;
pub mod procedures;
pub mod schema;
pub mod store;

use std::sync::Arc;

use axum::Router;
use gasdesk_core::Module;
use gasdesk_kv::KVStore;

use procedures::CylinderProcedures;
use store::CylinderStore;

pub use model::{Cylinder, CylinderFields, CylinderPatch, CylinderSummary};

/// The Cylinder module.
pub struct CylinderModule {
    procedures: Arc<CylinderProcedures>,
}

impl CylinderModule {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        let store = Arc::new(CylinderStore::new(kv));
        Self {
            procedures: Arc::new(CylinderProcedures::new(store)),
        }
    }

    /// Direct access to the procedures, for in-process callers.
    pub fn procedures(&self) -> &Arc<CylinderProcedures> {
        &self.procedures
    }
}

impl Module for CylinderModule {
    fn name(&self) -> &str {
        "cylinder"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.procedures))
    }
}
