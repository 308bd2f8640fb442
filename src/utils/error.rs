use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmartChargingError {
    #[error("{entity} validation failed: {}", .violations.join("; "))]
    Validation {
        entity: &'static str,
        violations: Vec<String>,
    },

    #[error("Cannot save {entity} since the {dependency} with Identifier '{identifier}' was not found")]
    NotFoundDependency {
        entity: &'static str,
        dependency: &'static str,
        identifier: String,
    },

    #[error("{entity} with Identifier '{identifier}' was not found")]
    NotFound {
        entity: &'static str,
        identifier: String,
    },

    #[error("Cannot add duplicate {entity} with {identifier}")]
    DuplicateEntity {
        entity: &'static str,
        identifier: String,
    },

    #[error(
        "Cannot save this Connector since adding 'MaxCurrentInAmps' delta of {attempted_delta} to the \
         current total of {current_total} will exceed the Group capacity of {capacity}"
    )]
    ConnectorCapacityExceeded {
        capacity: f64,
        current_total: f64,
        attempted_delta: f64,
    },

    #[error(
        "New Capacity of {new_capacity} for Group '{group}' cannot be lower than the current \
         total maximum current in Amps of {current_total}"
    )]
    CapacityDecreaseRejected {
        group: String,
        new_capacity: f64,
        current_total: f64,
    },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

/// Coarse grouping of failures by what the caller has to do about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    MissingDependency,
    Conflict,
    Capacity,
    Infrastructure,
}

impl SmartChargingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SmartChargingError::Validation { .. } => ErrorCategory::Validation,
            SmartChargingError::NotFoundDependency { .. } | SmartChargingError::NotFound { .. } => {
                ErrorCategory::MissingDependency
            }
            SmartChargingError::DuplicateEntity { .. } => ErrorCategory::Conflict,
            SmartChargingError::ConnectorCapacityExceeded { .. }
            | SmartChargingError::CapacityDecreaseRejected { .. } => ErrorCategory::Capacity,
            SmartChargingError::Storage { .. }
            | SmartChargingError::IoError(_)
            | SmartChargingError::SerializationError(_)
            | SmartChargingError::ConfigError { .. } => ErrorCategory::Infrastructure,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SmartChargingError::Validation { .. } => {
                "Correct the listed fields and retry".to_string()
            }
            SmartChargingError::NotFoundDependency { dependency, .. } => {
                format!("Create the {} first, then retry", dependency)
            }
            SmartChargingError::NotFound { entity, .. } => {
                format!("Check the {} identifier", entity)
            }
            SmartChargingError::DuplicateEntity { .. } => {
                "Use the update path or choose a new identifier".to_string()
            }
            SmartChargingError::ConnectorCapacityExceeded { .. } => {
                "Lower the 'MaxCurrentInAmps' and then retry, or remove another Connector and then retry"
                    .to_string()
            }
            SmartChargingError::CapacityDecreaseRejected { current_total, .. } => format!(
                "Use a value of at least {} as the new Capacity, or free capacity first",
                current_total
            ),
            SmartChargingError::Storage { .. } => "Check the storage backend".to_string(),
            SmartChargingError::IoError(_) => "Check that the file exists and is readable".to_string(),
            SmartChargingError::SerializationError(_) => "Check the output encoding".to_string(),
            SmartChargingError::ConfigError { .. } => "Fix the configuration file".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SmartChargingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_exceeded_message_carries_numbers() {
        let err = SmartChargingError::ConnectorCapacityExceeded {
            capacity: 10.0,
            current_total: 5.0,
            attempted_delta: 6.0,
        };
        let message = err.to_string();
        assert!(message.contains("capacity of 10"));
        assert!(message.contains("current total of 5"));
        assert!(message.contains("delta of 6"));
        assert_eq!(err.category(), ErrorCategory::Capacity);
    }

    #[test]
    fn test_validation_message_joins_all_violations() {
        let err = SmartChargingError::Validation {
            entity: "Group",
            violations: vec!["name: empty".to_string(), "capacity: negative".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Group validation failed: name: empty; capacity: negative"
        );
    }
}
