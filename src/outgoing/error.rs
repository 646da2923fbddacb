use thiserror::Error;

use crate::error::ErrorKind;
use crate::state::{AccountId, ChainId, EthAddress, StateError};

/// Errors raised by the outgoing pool and batch pipeline.
#[derive(Error, Debug)]
pub enum OutgoingError {
    #[error("fee denom {fee} does not match transfer denom {amount}")]
    FeeDenomMismatch { amount: String, fee: String },

    #[error("transfer amount must be positive")]
    NonPositiveAmount,

    #[error("amount plus fee overflows")]
    AmountOverflow,

    #[error("destination {0} is invalid or blacklisted")]
    InvalidDestination(EthAddress),

    #[error("no pool entry {id} on {chain}")]
    PoolEntryNotFound { chain: ChainId, id: u64 },

    #[error("pool entry {id} on {chain} belongs to another sender, not {sender}")]
    NotPoolEntrySender {
        chain: ChainId,
        id: u64,
        sender: AccountId,
    },

    #[error("no pending transfers for contract {contract} on {chain}")]
    NothingToBatch { chain: ChainId, contract: EthAddress },

    #[error("batch size limit must be positive")]
    ZeroBatchSize,

    #[error("selection fee {selected} would not beat open batch fee {open}")]
    NotMoreProfitable { selected: u128, open: u128 },

    #[error("selection fee {fee} is below the required rate for amount {amount}")]
    FeeRateTooLow { fee: u128, amount: u128 },

    #[error("no batch with nonce {nonce} for contract {contract} on {chain}")]
    BatchNotFound {
        chain: ChainId,
        contract: EthAddress,
        nonce: u64,
    },

    #[error("{orchestrator} already confirmed batch {nonce} for {contract}")]
    DuplicateConfirmation {
        contract: EthAddress,
        nonce: u64,
        orchestrator: AccountId,
    },

    #[error(transparent)]
    State(#[from] StateError),
}

impl OutgoingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OutgoingError::FeeDenomMismatch { .. } => ErrorKind::InvalidInput,
            OutgoingError::NonPositiveAmount => ErrorKind::InvalidInput,
            OutgoingError::AmountOverflow => ErrorKind::InvalidInput,
            OutgoingError::InvalidDestination(_) => ErrorKind::InvalidInput,
            OutgoingError::PoolEntryNotFound { .. } => ErrorKind::NotFound,
            OutgoingError::NotPoolEntrySender { .. } => ErrorKind::Unauthorized,
            OutgoingError::NothingToBatch { .. } => ErrorKind::NotFound,
            OutgoingError::ZeroBatchSize => ErrorKind::InvalidInput,
            OutgoingError::NotMoreProfitable { .. } => ErrorKind::InvalidInput,
            OutgoingError::FeeRateTooLow { .. } => ErrorKind::InvalidInput,
            OutgoingError::BatchNotFound { .. } => ErrorKind::NotFound,
            OutgoingError::DuplicateConfirmation { .. } => ErrorKind::Conflict,
            OutgoingError::State(e) => e.kind(),
        }
    }
}
