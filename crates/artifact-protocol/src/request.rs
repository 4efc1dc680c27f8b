//! Signed-URL batch request types.

use serde::{Deserialize, Serialize};

/// Operation type for a signed-URL batch, serialized as an integer enum.
///
/// The numeric values are part of the wire contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OperationType {
    /// Guarded push: the hub issues a HEAD probe plus a PUT per key.
    Push,
    /// Forced push: one PUT per key, no existence probe.
    PushForce,
    /// Pull: one GET per object under the requested key or prefix.
    Pull,
    /// Yank: one URL per object to delete; the hub omits the method.
    Yank,
}

impl From<OperationType> for u8 {
    fn from(op: OperationType) -> u8 {
        match op {
            OperationType::Push => 0,
            OperationType::PushForce => 1,
            OperationType::Pull => 2,
            OperationType::Yank => 3,
        }
    }
}

impl TryFrom<u8> for OperationType {
    type Error = UnknownOperationType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OperationType::Push),
            1 => Ok(OperationType::PushForce),
            2 => Ok(OperationType::Pull),
            3 => Ok(OperationType::Yank),
            other => Err(UnknownOperationType(other)),
        }
    }
}

/// Error for an operation-type wire value outside the defined range.
#[derive(Debug, thiserror::Error)]
#[error("unknown operation type {0}")]
pub struct UnknownOperationType(pub u8);

/// Request body for the signed-URL batch endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateUrlsRequest {
    /// Remote keys (or, for pull/yank, key prefixes) to authorize.
    pub paths: Vec<String>,
    /// Operation the URLs will be used for.
    #[serde(rename = "type")]
    pub operation: OperationType,
}
