use thiserror::Error;

use crate::error::ErrorKind;
use crate::state::StateError;

/// Errors raised while parsing or applying a routing instruction.
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("send_to_eth instruction is not a JSON object")]
    InstructionNotObject,

    #[error("send_to_eth instruction is missing field {0}")]
    MissingField(&'static str),

    #[error("send_to_eth field {field} is not a string")]
    FieldNotString { field: &'static str },

    #[error("invalid destination address {value}: {reason}")]
    InvalidDestination { value: String, reason: String },

    #[error("invalid amount {0}: must be a positive decimal integer")]
    InvalidAmount(String),

    #[error("transfer address cannot be a module account")]
    ModuleAccountRecipient,

    #[error("requested amount {requested} exceeds received amount {received}")]
    AmountExceedsReceived { requested: u128, received: u128 },

    #[error(transparent)]
    State(#[from] StateError),
}

impl RoutingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoutingError::InstructionNotObject => ErrorKind::InvalidInput,
            RoutingError::MissingField(_) => ErrorKind::InvalidInput,
            RoutingError::FieldNotString { .. } => ErrorKind::InvalidInput,
            RoutingError::InvalidDestination { .. } => ErrorKind::InvalidInput,
            RoutingError::InvalidAmount(_) => ErrorKind::InvalidInput,
            RoutingError::ModuleAccountRecipient => ErrorKind::Unauthorized,
            RoutingError::AmountExceedsReceived { .. } => ErrorKind::InvalidInput,
            RoutingError::State(e) => e.kind(),
        }
    }
}
