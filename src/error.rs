/*!
# Error Module

Crate-level error type for the settlement core. Each subsystem owns its own
error enum; this module folds them into one `Error` and classifies every
failure into the small taxonomy the transaction-ordering layer cares about.

All errors abort the current state transition atomically: a failed
precondition leaves no partial writes, and the host records the failure and
moves to the next externally submitted operation. Nothing here is retried
internally — retryable conditions (such as insufficient voting power) only
resolve through new, independent future submissions.
*/

use thiserror::Error;

use crate::attestation::AttestationError;
use crate::ledger::LedgerError;
use crate::outgoing::OutgoingError;
use crate::registry::RegistryError;
use crate::routing::RoutingError;
use crate::state::StateError;

/// Classification of a failure, independent of which subsystem raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unregistered chain, missing pool entry, batch, or mapping.
    NotFound,
    /// Conflicting claim content, duplicate confirmation, duplicate mapping.
    Conflict,
    /// Non-contiguous event nonce.
    OrderingViolation,
    /// Malformed address, non-positive amount, denomination mismatch.
    InvalidInput,
    /// Wrong sender attempting a cancel, or a module account where a user
    /// account is required.
    Unauthorized,
    /// Operating on an observed attestation or a closed batch.
    AlreadyFinalized,
    /// Store corruption or a collaborator failure with no user remedy.
    Internal,
}

/// Core settlement error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Data model or keyed store error
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// Chain registry error
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Claim or attestation error
    #[error("attestation error: {0}")]
    Attestation(#[from] AttestationError),

    /// Outgoing pool or batch error
    #[error("outgoing error: {0}")]
    Outgoing(#[from] OutgoingError),

    /// Inbound routing error
    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),

    /// Ledger collaborator error
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl Error {
    /// Classify the error for the host's failure bookkeeping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::State(e) => e.kind(),
            Error::Registry(e) => e.kind(),
            Error::Attestation(e) => e.kind(),
            Error::Outgoing(e) => e.kind(),
            Error::Routing(e) => e.kind(),
            Error::Ledger(_) => ErrorKind::Internal,
        }
    }
}
