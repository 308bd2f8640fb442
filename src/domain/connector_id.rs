//! Connector identifier policy.
//!
//! A Connector is numbered within its ChargeStation and the only legal
//! numbers are `1..=5`. [`ConnectorId`] can only be built through
//! [`ConnectorId::new`], so an out-of-domain value never reaches storage.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::validation::FieldViolation;

pub const LEGAL_CONNECTOR_IDS: [u8; 5] = [1, 2, 3, 4, 5];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ConnectorId(u8);

impl ConnectorId {
    pub fn new(value: i64) -> Result<Self, FieldViolation> {
        LEGAL_CONNECTOR_IDS
            .iter()
            .copied()
            .find(|legal| i64::from(*legal) == value)
            .map(ConnectorId)
            .ok_or_else(|| {
                FieldViolation::new("identifier", value, legal_values_message())
            })
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// "For a Connector the only possible values for Identifier are - 1, 2, 3, 4, 5"
pub fn legal_values_message() -> String {
    let legal: Vec<String> = LEGAL_CONNECTOR_IDS.iter().map(ToString::to_string).collect();
    format!(
        "For a Connector the only possible values for Identifier are - {}",
        legal.join(", ")
    )
}

impl TryFrom<i64> for ConnectorId {
    type Error = FieldViolation;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        ConnectorId::new(value)
    }
}

impl From<ConnectorId> for i64 {
    fn from(id: ConnectorId) -> Self {
        i64::from(id.0)
    }
}

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
