use crate::utils::error::{Result, SmartChargingError};
use std::fmt;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: String,
    pub value: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: &str, value: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = '{}': {}", self.field, self.value, self.reason)
    }
}

pub type FieldResult = std::result::Result<(), FieldViolation>;

/// Collects every violation of a command instead of stopping at the first.
#[derive(Debug, Default)]
pub struct Violations {
    entity: &'static str,
    items: Vec<FieldViolation>,
}

impl Violations {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            items: Vec::new(),
        }
    }

    pub fn check(&mut self, result: FieldResult) -> &mut Self {
        if let Err(violation) = result {
            self.items.push(violation);
        }
        self
    }

    /// Like [`check`](Self::check) for validators that also parse.
    pub fn check_value<T>(&mut self, result: std::result::Result<T, FieldViolation>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(violation) => {
                self.items.push(violation);
                None
            }
        }
    }

    pub fn into_result(self) -> Result<()> {
        if self.items.is_empty() {
            return Ok(());
        }
        Err(self.into_error())
    }

    /// Returns the parsed value only when no violation was recorded.
    pub fn into_value<T>(self, value: Option<T>) -> Result<T> {
        match value {
            Some(value) if self.items.is_empty() => Ok(value),
            _ => Err(self.into_error()),
        }
    }

    fn into_error(self) -> SmartChargingError {
        SmartChargingError::Validation {
            entity: self.entity,
            violations: self.items.iter().map(ToString::to_string).collect(),
        }
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> FieldResult {
    if value.trim().is_empty() {
        return Err(FieldViolation::new(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_positive_amps(field_name: &str, value: f64) -> FieldResult {
    if !value.is_finite() || value <= 0.0 {
        return Err(FieldViolation::new(
            field_name,
            value,
            "Value should be greater than 0",
        ));
    }
    Ok(())
}

pub fn validate_below(field_name: &str, value: f64, max: f64) -> FieldResult {
    if value >= max {
        return Err(FieldViolation::new(
            field_name,
            value,
            format!("Value must be less than {}", max),
        ));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> FieldResult {
    if path.is_empty() {
        return Err(FieldViolation::new(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(FieldViolation::new(
            field_name,
            path,
            "Path contains null bytes",
        ));
    }

    Ok(())
}
