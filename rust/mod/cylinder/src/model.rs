use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Cylinder: one physical gas cylinder unit. PK = id.
///
/// `customer_id` and `industry_id` are weak references: nothing checks that
/// the referenced records exist, and deleting them has no effect here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cylinder {
    /// Server-assigned id. Never reused, never changed.
    pub id: String,

    #[serde(rename = "type")]
    pub cylinder_type: String,

    /// Capacity in whatever unit the operator uses.
    #[serde(serialize_with = "serialize_capacity")]
    pub capacity: f64,

    /// Free-form status, e.g. "Full", "Empty", "Refilling".
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refill_date: Option<DateTime<Utc>>,
}

/// Whole capacities go out as JSON integers (`50`, not `50.0`).
fn serialize_capacity<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Everything needed to create a cylinder. The id comes from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderFields {
    pub cylinder_type: String,
    pub capacity: f64,
    pub status: String,
    pub location: Option<String>,
    pub customer_id: Option<String>,
    pub industry_id: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub last_refill_date: Option<DateTime<Utc>>,
}

impl CylinderFields {
    /// Minimal record: the three required fields, nothing else.
    pub fn new(cylinder_type: impl Into<String>, capacity: f64, status: impl Into<String>) -> Self {
        Self {
            cylinder_type: cylinder_type.into(),
            capacity,
            status: status.into(),
            location: None,
            customer_id: None,
            industry_id: None,
            purchase_date: None,
            last_refill_date: None,
        }
    }

    pub fn into_cylinder(self, id: String) -> Cylinder {
        Cylinder {
            id,
            cylinder_type: self.cylinder_type,
            capacity: self.capacity,
            status: self.status,
            location: self.location,
            customer_id: self.customer_id,
            industry_id: self.industry_id,
            purchase_date: self.purchase_date,
            last_refill_date: self.last_refill_date,
        }
    }
}

/// A partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CylinderPatch {
    pub cylinder_type: Option<String>,
    pub capacity: Option<f64>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub customer_id: Option<String>,
    pub industry_id: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub last_refill_date: Option<DateTime<Utc>>,
}

impl CylinderPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Cylinder {
    /// Merge every field set in `patch` into this record. The id is never touched.
    pub fn apply(&mut self, patch: &CylinderPatch) {
        if let Some(v) = &patch.cylinder_type {
            self.cylinder_type = v.clone();
        }
        if let Some(v) = patch.capacity {
            self.capacity = v;
        }
        if let Some(v) = &patch.status {
            self.status = v.clone();
        }
        if let Some(v) = &patch.location {
            self.location = Some(v.clone());
        }
        if let Some(v) = &patch.customer_id {
            self.customer_id = Some(v.clone());
        }
        if let Some(v) = &patch.industry_id {
            self.industry_id = Some(v.clone());
        }
        if let Some(v) = patch.purchase_date {
            self.purchase_date = Some(v);
        }
        if let Some(v) = patch.last_refill_date {
            self.last_refill_date = Some(v);
        }
    }
}

/// Per-status counts for the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CylinderSummary {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
}
