use thiserror::Error;

use crate::error::ErrorKind;
use crate::state::{ChainId, StateError, ValidatorId};

/// Errors raised while submitting or aggregating claims.
#[derive(Error, Debug)]
pub enum AttestationError {
    #[error("{claimer} is not a bonded validator")]
    UnknownValidator { claimer: ValidatorId },

    #[error("non-contiguous event nonce on {chain}: expected {expected}, got {got}")]
    NonContiguousNonce {
        chain: ChainId,
        expected: u64,
        got: u64,
    },

    #[error("{claimer} already claimed different content for nonce {nonce} on {chain}")]
    ConflictingClaim {
        chain: ChainId,
        nonce: u64,
        claimer: ValidatorId,
    },

    #[error(transparent)]
    State(#[from] StateError),
}

impl AttestationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttestationError::UnknownValidator { .. } => ErrorKind::Unauthorized,
            AttestationError::NonContiguousNonce { .. } => ErrorKind::OrderingViolation,
            AttestationError::ConflictingClaim { .. } => ErrorKind::Conflict,
            AttestationError::State(e) => e.kind(),
        }
    }
}
