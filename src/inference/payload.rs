//! Parameter snapshot -> wire body.
//!
//! The key names are an external contract with the classification service. They
//! live in exactly one place, [`PayloadSchema`], so switching between naming
//! conventions (the service has accepted both `period_day` and `period_days`
//! over time) is a configuration change rather than a code edit.

use std::collections::HashSet;

use crate::domain::{ParameterField, ParameterSet, RequestPayload};
use crate::error::{AppError, EXIT_CONFIG};

/// Wire key per parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadSchema {
    keys: [(ParameterField, String); 6],
}

impl Default for PayloadSchema {
    fn default() -> Self {
        Self {
            keys: ParameterField::ALL.map(|f| (f, default_key(f).to_string())),
        }
    }
}

/// Keys accepted by the live service.
fn default_key(field: ParameterField) -> &'static str {
    match field {
        ParameterField::Period => "period_days",
        ParameterField::TransitDuration => "duration_hours",
        ParameterField::PlanetRadius => "rp_rearth",
        ParameterField::StarRadius => "rstar_rsun",
        ParameterField::Magnitude => "mag",
        ParameterField::Temperature => "teff_k",
    }
}

impl PayloadSchema {
    pub fn key(&self, field: ParameterField) -> &str {
        self.keys
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, k)| k.as_str())
            .unwrap_or_else(|| default_key(field))
    }

    /// Replace the wire key for one field.
    pub fn with_key(mut self, field: ParameterField, key: impl Into<String>) -> Self {
        let key = key.into();
        for slot in self.keys.iter_mut() {
            if slot.0 == field {
                slot.1 = key.trim().to_string();
            }
        }
        self
    }

    /// Check that every key is present and distinct.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut seen = HashSet::new();
        for (field, key) in &self.keys {
            if key.is_empty() {
                return Err(AppError::new(
                    EXIT_CONFIG,
                    format!("Payload schema has no wire key for {}.", field.label()),
                ));
            }
            if !seen.insert(key.as_str()) {
                return Err(AppError::new(
                    EXIT_CONFIG,
                    format!("Payload schema uses wire key '{key}' more than once."),
                ));
            }
        }
        Ok(())
    }
}

/// Build the request body for a snapshot.
///
/// Pure: the same schema and snapshot always give the same payload. Errors only
/// on a broken contract (invalid schema or a non-finite value).
pub fn build(schema: &PayloadSchema, snapshot: &ParameterSet) -> Result<RequestPayload, AppError> {
    schema.validate()?;

    let mut entries = Vec::with_capacity(ParameterField::ALL.len());
    for (field, value) in snapshot.iter() {
        if !value.is_finite() {
            return Err(AppError::new(
                EXIT_CONFIG,
                format!("{} is not a finite number.", field.label()),
            ));
        }
        entries.push((schema.key(field).to_string(), value));
    }

    Ok(RequestPayload::from_entries(entries))
}
