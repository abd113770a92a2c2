//! Error types for calbridge

use thiserror::Error;

use crate::{LifecycleState, TimeUnit};

/// Failures reported by the calendar authority or the host
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorityError {
    #[error("Authority call failed: {0}")]
    Failed(String),

    #[error("Authority rejected date: {0}")]
    InvalidDate(String),

    #[error("Operation not supported by authority: {0}")]
    Unsupported(String),
}

/// Core bridge errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Calendar authority unavailable")]
    AuthorityUnavailable,

    #[error("Conversion failed: {0}")]
    Conversion(#[from] AuthorityError),

    #[error("Privileged operation denied: {operation}")]
    PrivilegeDenied { operation: &'static str },

    #[error("Capability not supported: {capability}")]
    CapabilityMissing { capability: String },

    #[error("Invalid lifecycle: cannot {operation} while {from}")]
    InvalidLifecycle {
        from: LifecycleState,
        operation: &'static str,
    },

    #[error("Mutation failed: {0}")]
    Mutation(String),
}

impl BridgeError {
    pub fn missing_advance(unit: TimeUnit) -> Self {
        BridgeError::CapabilityMissing {
            capability: format!("advance-{unit}"),
        }
    }

    /// Write-path mapping: an `Unsupported` answer from the authority is a
    /// missing capability, anything else a failed mutation
    pub fn from_mutation(err: AuthorityError) -> Self {
        match err {
            AuthorityError::Unsupported(what) => BridgeError::CapabilityMissing { capability: what },
            other => BridgeError::Mutation(other.to_string()),
        }
    }
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
