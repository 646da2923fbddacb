/*!
# Causeway Protocol

Cross-chain bridge settlement core: reconciles validator claims about
events observed on an external EVM-compatible chain, aggregates them into
chain-state consensus with strict nonce ordering, and manages the lifecycle
of outgoing token transfers — pool, batch, confirmation, execution — back
to that chain. An inbound routing adapter auto-forwards incoming
interchain transfers that carry a structured routing instruction.

The engine executes inside a replicated deterministic state machine: every
operation is a synchronous, in-process read-modify-write against a shared
keyed store, applied one at a time in the order the host's consensus layer
dictates. Balance bookkeeping and validator power live behind the
[`ledger::Ledger`] and [`attestation::ValidatorPowerOracle`] collaborator
traits.
*/

pub mod attestation;
pub mod config;
pub mod ledger;
pub mod metrics;
pub mod outgoing;
pub mod registry;
pub mod routing;
pub mod state;

// Re-exports
pub use attestation::{Attestation, AttestationEngine, Claim, ClaimPayload};
pub use config::BridgeParams;
pub use outgoing::{BatchBuilder, ConfirmationTracker, OutgoingTxBatch, OutgoingTxPool};
pub use registry::ChainRegistry;
pub use routing::InboundRouter;
pub use state::{ChainId, ChainInfo, KeyedStore};

// Core types
pub type Result<T> = std::result::Result<T, Error>;
pub use error::{Error, ErrorKind};

pub mod error;
