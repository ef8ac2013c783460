//! Audit submission validation.
//!
//! Incoming audit payloads are checked as raw JSON rather than through a
//! typed `Deserialize` so that a missing or mistyped field can be reported
//! by name. The result, [`ValidatedAudit`], is the only input the
//! repository layer accepts for writes.

use serde_json::{Map, Value};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Audit passed inspection.
pub const STATUS_PASS: &str = "Pass";
/// Audit failed inspection.
pub const STATUS_FAIL: &str = "Fail";

/// All valid audit statuses.
pub const VALID_STATUSES: &[&str] = &[STATUS_PASS, STATUS_FAIL];

/// Outcome of an inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStatus {
    Pass,
    Fail,
}

impl AuditStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => STATUS_PASS,
            Self::Fail => STATUS_FAIL,
        }
    }

    /// Parse a status, ignoring ASCII case.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case(STATUS_PASS) {
            Some(Self::Pass)
        } else if s.eq_ignore_ascii_case(STATUS_FAIL) {
            Some(Self::Fail)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Validated types
// ---------------------------------------------------------------------------

/// Upper bound for the defect rate percentage.
pub const MAX_DEFECT_RATE: f64 = 100.0;

/// Most defect entries accepted on one audit.
pub const MAX_DEFECT_ENTRIES: usize = 500;

/// One defect line item that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct DefectInput {
    pub defect_category: String,
    pub defect_code: String,
    pub quantity: i32,
    pub location_category: Option<String>,
    pub defect_location: Option<String>,
}

/// An audit submission that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAudit {
    pub plant: String,
    pub module: String,
    pub shift: String,
    pub purchase_order: String,
    pub size: Option<String>,
    pub customer: Option<String>,
    pub style: Option<String>,
    pub color_code: Option<String>,
    pub color_description: Option<String>,
    pub customer_po_number: Option<String>,
    pub inspected_quantity: i32,
    pub defect_quantity: i32,
    pub status: AuditStatus,
    pub defect_rate: f64,
    pub remarks: Option<String>,
    pub audit_type: Option<String>,
    pub created_by: String,
    pub defects: Vec<DefectInput>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a raw audit payload.
///
/// Required: `plant`, `module`, `shift`, `purchaseOrder` (or legacy `po`),
/// `inspectedQuantity`, `defectQuantity`, `status`, `defectRate`,
/// `createdBy`. The defect list is read from `defectDetails`, falling back
/// to `defects`. Any bad defect entry rejects the whole submission.
pub fn validate_submission(payload: &Value) -> Result<ValidatedAudit, CoreError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| CoreError::invalid("payload", "must be a JSON object"))?;

    let plant = required_str(obj, "plant", &["plant"])?;
    let module = required_str(obj, "module", &["module"])?;
    let shift = required_str(obj, "shift", &["shift"])?;
    let purchase_order = required_str(obj, "purchaseOrder", &["purchaseOrder", "po"])?;
    let inspected_quantity = required_count(obj, "inspectedQuantity")?;
    let defect_quantity = required_count(obj, "defectQuantity")?;

    let status_raw = required_str(obj, "status", &["status"])?;
    let status = AuditStatus::parse(&status_raw).ok_or_else(|| {
        CoreError::invalid(
            "status",
            format!("'{status_raw}' is not one of {VALID_STATUSES:?}"),
        )
    })?;

    let defect_rate = required_rate(obj, "defectRate")?;
    let created_by = required_str(obj, "createdBy", &["createdBy"])?;

    if defect_quantity > inspected_quantity {
        return Err(CoreError::invalid(
            "defectQuantity",
            format!(
                "cannot exceed inspectedQuantity ({defect_quantity} > {inspected_quantity})"
            ),
        ));
    }

    let defects = match lookup(obj, &["defectDetails", "defects"]) {
        None => Vec::new(),
        Some(Value::Array(items)) if items.len() > MAX_DEFECT_ENTRIES => {
            return Err(CoreError::invalid(
                "defectDetails",
                format!("at most {MAX_DEFECT_ENTRIES} entries are allowed"),
            ))
        }
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| validate_defect_entry(index, item))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(CoreError::invalid("defectDetails", "must be an array")),
    };

    Ok(ValidatedAudit {
        plant,
        module,
        shift,
        purchase_order,
        size: optional_str(obj, "size")?,
        customer: optional_str(obj, "customer")?,
        style: optional_str(obj, "style")?,
        color_code: optional_str(obj, "colorCode")?,
        color_description: optional_str(obj, "colorDescription")?,
        customer_po_number: optional_str(obj, "customerPoNumber")?,
        inspected_quantity,
        defect_quantity,
        status,
        defect_rate,
        remarks: optional_str(obj, "remarks")?,
        audit_type: optional_str(obj, "type")?,
        created_by,
        defects,
    })
}

/// Fill `createdBy` from the caller's identity when the payload omits it.
///
/// An explicit non-empty `createdBy` in the payload is left untouched.
pub fn apply_identity_fallback(payload: &mut Value, identity: &str) {
    let Some(obj) = payload.as_object_mut() else {
        return;
    };
    let missing = match obj.get("createdBy") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    };
    if missing {
        obj.insert("createdBy".into(), Value::String(identity.to_string()));
    }
}

fn validate_defect_entry(index: usize, item: &Value) -> Result<DefectInput, CoreError> {
    let entry_err = |reason: &str| CoreError::InvalidDefectEntry {
        index,
        reason: reason.to_string(),
    };

    let obj = item.as_object().ok_or_else(|| entry_err("must be an object"))?;

    let defect_category = non_empty_str(obj.get("defectCategory"))
        .ok_or_else(|| entry_err("defectCategory is required"))?;
    let defect_code = non_empty_str(obj.get("defectCode"))
        .ok_or_else(|| entry_err("defectCode is required"))?;

    let quantity = obj
        .get("quantity")
        .and_then(Value::as_i64)
        .ok_or_else(|| entry_err("quantity must be an integer"))?;
    if quantity <= 0 {
        return Err(entry_err("quantity must be positive"));
    }
    let quantity = i32::try_from(quantity).map_err(|_| entry_err("quantity is too large"))?;

    let location_category = match obj.get("locationCategory") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => trimmed(s),
        Some(_) => return Err(entry_err("locationCategory must be a string")),
    };
    let defect_location = match obj.get("defectLocation") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => trimmed(s),
        Some(_) => return Err(entry_err("defectLocation must be a string")),
    };

    Ok(DefectInput {
        defect_category,
        defect_code,
        quantity,
        location_category,
        defect_location,
    })
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// First non-null value among `keys`.
fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn trimmed(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).and_then(trimmed)
}

fn required_str(
    obj: &Map<String, Value>,
    field: &'static str,
    keys: &[&str],
) -> Result<String, CoreError> {
    non_empty_str(lookup(obj, keys)).ok_or(CoreError::MissingField { field })
}

fn optional_str(obj: &Map<String, Value>, field: &'static str) -> Result<Option<String>, CoreError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(trimmed(s)),
        Some(_) => Err(CoreError::invalid(field, "must be a string")),
    }
}

/// A non-negative integer that fits an `INTEGER` column.
fn required_count(obj: &Map<String, Value>, field: &'static str) -> Result<i32, CoreError> {
    let value = obj
        .get(field)
        .filter(|v| v.is_number())
        .ok_or(CoreError::MissingField { field })?;

    let n = value
        .as_i64()
        .ok_or_else(|| CoreError::invalid(field, "must be an integer"))?;
    if n < 0 {
        return Err(CoreError::invalid(field, "must not be negative"));
    }
    i32::try_from(n).map_err(|_| CoreError::invalid(field, "is too large"))
}

fn required_rate(obj: &Map<String, Value>, field: &'static str) -> Result<f64, CoreError> {
    let rate = obj
        .get(field)
        .and_then(Value::as_f64)
        .ok_or(CoreError::MissingField { field })?;

    if !rate.is_finite() || !(0.0..=MAX_DEFECT_RATE).contains(&rate) {
        return Err(CoreError::invalid(
            field,
            format!("must be between 0 and {MAX_DEFECT_RATE}, got {rate}"),
        ));
    }
    Ok(rate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
