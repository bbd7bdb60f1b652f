use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use gasdesk_core::ServiceError;
use serde_json::Value;

use crate::model::{Cylinder, CylinderSummary};
use crate::procedures::CylinderProcedures;

type ProcState = Arc<CylinderProcedures>;

/// Build the cylinder procedure router.
///
/// Routes:
/// - `GET  /trpc/getCylinders`       : list all cylinders
/// - `GET  /trpc/getCylinderSummary` : counts per status
/// - `POST /trpc/createCylinder`     : body: cylinder fields
/// - `POST /trpc/updateCylinder`     : body: `{id, ...changes}`
/// - `POST /trpc/deleteCylinder`     : body: `"<id>"`
pub fn router(procedures: Arc<CylinderProcedures>) -> Router {
    Router::new()
        .route("/trpc/getCylinders", get(get_cylinders))
        .route("/trpc/getCylinderSummary", get(get_cylinder_summary))
        .route("/trpc/createCylinder", post(create_cylinder))
        .route("/trpc/updateCylinder", post(update_cylinder))
        .route("/trpc/deleteCylinder", post(delete_cylinder))
        .with_state(procedures)
}

/// Decode a request body ourselves so malformed JSON comes back as a
/// structured validation error instead of axum's plain-text rejection.
fn parse_input(body: &[u8]) -> Result<Value, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ServiceError::invalid("input", "Required"));
    }
    serde_json::from_slice(body)
        .map_err(|e| ServiceError::invalid("input", format!("malformed JSON: {}", e)))
}

async fn get_cylinders(State(p): State<ProcState>) -> Result<Json<Vec<Cylinder>>, ServiceError> {
    Ok(Json(p.get_cylinders()?))
}

async fn get_cylinder_summary(
    State(p): State<ProcState>,
) -> Result<Json<CylinderSummary>, ServiceError> {
    Ok(Json(p.get_cylinder_summary()?))
}

async fn create_cylinder(
    State(p): State<ProcState>,
    body: Bytes,
) -> Result<Json<Cylinder>, ServiceError> {
    let input = parse_input(&body)?;
    Ok(Json(p.create_cylinder(&input)?))
}

async fn update_cylinder(
    State(p): State<ProcState>,
    body: Bytes,
) -> Result<Json<Cylinder>, ServiceError> {
    let input = parse_input(&body)?;
    Ok(Json(p.update_cylinder(&input)?))
}

async fn delete_cylinder(
    State(p): State<ProcState>,
    body: Bytes,
) -> Result<Json<Cylinder>, ServiceError> {
    let input = parse_input(&body)?;
    Ok(Json(p.delete_cylinder(&input)?))
}
