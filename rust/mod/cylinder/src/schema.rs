//! Input schemas for the cylinder procedures.
//!
//! Each `parse_*` function checks the shape of a caller-supplied JSON value
//! and converts it into a typed input. All problems are collected and
//! reported together; the first one does not stop the check.
//!
//! Rules:
//! - required fields must be present and non-null
//! - optional fields may be absent, but `null` is rejected
//! - unknown keys are ignored (a client-sent `id` on create included)
//! - dates are RFC 3339 date-times or `YYYY-MM-DD` (midnight UTC)

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gasdesk_core::{ServiceError, ValidationErrors};
use serde_json::{Map, Value};

use crate::model::{CylinderFields, CylinderPatch};

const REQUIRED: &str = "Required";

/// JSON type name as reported in validation messages.
fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &str, got: &Value) -> String {
    format!("expected {}, received {}", expected, type_name(got))
}

/// Field reader over one input object, accumulating errors as it goes.
struct Reader<'a> {
    obj: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> Reader<'a> {
    fn new(input: &'a Value) -> Result<Self, ServiceError> {
        match input {
            Value::Object(obj) => Ok(Self {
                obj,
                errors: ValidationErrors::new(),
            }),
            other => Err(ServiceError::invalid("input", mismatch("object", other))),
        }
    }

    fn finish(self) -> Result<(), ServiceError> {
        self.errors.into_result()
    }

    fn optional_string(&mut self, field: &str) -> Option<String> {
        let obj = self.obj;
        match obj.get(field)? {
            Value::String(s) => Some(s.clone()),
            other => {
                self.errors.push(field, mismatch("string", other));
                None
            }
        }
    }

    fn required_string(&mut self, field: &str) -> Option<String> {
        if !self.obj.contains_key(field) {
            self.errors.push(field, REQUIRED);
            return None;
        }
        self.optional_string(field)
    }

    fn optional_number(&mut self, field: &str) -> Option<f64> {
        let obj = self.obj;
        match obj.get(field)? {
            Value::Number(n) => match n.as_f64() {
                Some(v) => Some(v),
                None => {
                    self.errors.push(field, "number out of range");
                    None
                }
            },
            other => {
                self.errors.push(field, mismatch("number", other));
                None
            }
        }
    }

    fn required_number(&mut self, field: &str) -> Option<f64> {
        if !self.obj.contains_key(field) {
            self.errors.push(field, REQUIRED);
            return None;
        }
        self.optional_number(field)
    }

    fn optional_date(&mut self, field: &str) -> Option<DateTime<Utc>> {
        let obj = self.obj;
        match obj.get(field)? {
            Value::String(s) => match parse_date(s) {
                Some(d) => Some(d),
                None => {
                    self.errors.push(field, format!("invalid date '{}'", s));
                    None
                }
            },
            other => {
                self.errors.push(field, mismatch("date", other));
                None
            }
        }
    }
}

/// Accept an RFC 3339 date-time, or a bare calendar date read as midnight UTC.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

/// Input of `createCylinder`.
pub fn parse_create(input: &Value) -> Result<CylinderFields, ServiceError> {
    let mut r = Reader::new(input)?;

    let cylinder_type = r.required_string("type");
    let capacity = r.required_number("capacity");
    let status = r.required_string("status");
    let location = r.optional_string("location");
    let customer_id = r.optional_string("customerId");
    let industry_id = r.optional_string("industryId");
    let purchase_date = r.optional_date("purchaseDate");
    let last_refill_date = r.optional_date("lastRefillDate");

    r.finish()?;
    // Past `finish`, every required field parsed.
    let (Some(cylinder_type), Some(capacity), Some(status)) = (cylinder_type, capacity, status)
    else {
        return Err(ServiceError::Internal("create input lost a required field".into()));
    };

    Ok(CylinderFields {
        cylinder_type,
        capacity,
        status,
        location,
        customer_id,
        industry_id,
        purchase_date,
        last_refill_date,
    })
}

/// Input of `updateCylinder`: the target id plus the fields to change.
pub fn parse_update(input: &Value) -> Result<(String, CylinderPatch), ServiceError> {
    let mut r = Reader::new(input)?;

    let id = r.required_string("id");
    let patch = CylinderPatch {
        cylinder_type: r.optional_string("type"),
        capacity: r.optional_number("capacity"),
        status: r.optional_string("status"),
        location: r.optional_string("location"),
        customer_id: r.optional_string("customerId"),
        industry_id: r.optional_string("industryId"),
        purchase_date: r.optional_date("purchaseDate"),
        last_refill_date: r.optional_date("lastRefillDate"),
    };

    r.finish()?;
    let id = id.ok_or_else(|| ServiceError::Internal("update input lost its id".into()))?;
    Ok((id, patch))
}

/// Input of `deleteCylinder`: a bare string id.
pub fn parse_delete(input: &Value) -> Result<String, ServiceError> {
    match input {
        Value::String(id) => Ok(id.clone()),
        other => Err(ServiceError::invalid("input", mismatch("string", other))),
    }
}
