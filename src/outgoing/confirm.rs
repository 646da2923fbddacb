use std::sync::Arc;

use super::batch::batch_key;
use super::error::OutgoingError;
use super::BatchConfirmation;
use crate::error::Error;
use crate::registry::ChainRegistry;
use crate::state::store::{entity_key, u64_segment};
use crate::state::{keyspace, ChainId, EthAddress, KeyedStore};

/// Stores orchestrator signatures over open batches for external relayer
/// consumption. Storage contract only: signature verification belongs to
/// the external chain's contract.
#[derive(Clone)]
pub struct ConfirmationTracker {
    store: Arc<KeyedStore>,
    registry: ChainRegistry,
}

impl ConfirmationTracker {
    pub fn new(store: Arc<KeyedStore>, registry: ChainRegistry) -> Self {
        Self { store, registry }
    }

    /// Record one orchestrator's signature over an open batch.
    pub fn add_confirmation(
        &self,
        chain: &ChainId,
        confirmation: BatchConfirmation,
    ) -> Result<(), Error> {
        self.registry.require_chain(chain)?;
        if !self.store.contains(&batch_key(
            chain,
            &confirmation.token_contract,
            confirmation.batch_nonce,
        )) {
            return Err(OutgoingError::BatchNotFound {
                chain: chain.clone(),
                contract: confirmation.token_contract,
                nonce: confirmation.batch_nonce,
            }
            .into());
        }
        let key = confirmation_key(
            chain,
            &confirmation.token_contract,
            confirmation.batch_nonce,
            &confirmation.orchestrator,
        );
        if self.store.contains(&key) {
            return Err(OutgoingError::DuplicateConfirmation {
                contract: confirmation.token_contract,
                nonce: confirmation.batch_nonce,
                orchestrator: confirmation.orchestrator,
            }
            .into());
        }
        self.store.set(&key, &confirmation);
        Ok(())
    }

    /// All recorded signatures for one batch.
    pub fn confirmations(
        &self,
        chain: &ChainId,
        contract: &EthAddress,
        nonce: u64,
    ) -> Result<Vec<BatchConfirmation>, Error> {
        let mut prefix = crate::state::store::chain_prefix(keyspace::BATCH_CONFIRM, chain);
        prefix.extend_from_slice(contract.as_bytes());
        prefix.extend_from_slice(&u64_segment(nonce));
        let entries: Vec<(Vec<u8>, BatchConfirmation)> = self.store.iter_prefix(&prefix)?;
        Ok(entries.into_iter().map(|(_, conf)| conf).collect())
    }
}

fn confirmation_key(
    chain: &ChainId,
    contract: &EthAddress,
    nonce: u64,
    orchestrator: &crate::state::AccountId,
) -> Vec<u8> {
    let mut entity = Vec::with_capacity(20 + 8 + orchestrator.as_str().len());
    entity.extend_from_slice(contract.as_bytes());
    entity.extend_from_slice(&u64_segment(nonce));
    entity.extend_from_slice(orchestrator.as_str().as_bytes());
    entity_key(keyspace::BATCH_CONFIRM, chain, &entity)
}
