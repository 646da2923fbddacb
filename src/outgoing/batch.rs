use std::sync::Arc;

use tracing::info;

use super::error::OutgoingError;
use super::{OutgoingTransferTx, OutgoingTxBatch};
use crate::config::BridgeParams;
use crate::error::Error;
use crate::metrics;
use crate::registry::ChainRegistry;
use crate::state::store::{chain_prefix, entity_key, u64_segment};
use crate::state::{keyspace, ChainId, EthAddress, KeyedStore};

/// Packs pool entries into fee-maximizing batches and drives each batch
/// through its lifecycle: open, then executed or cancelled/timed out.
#[derive(Clone)]
pub struct BatchBuilder {
    store: Arc<KeyedStore>,
    registry: ChainRegistry,
    params: BridgeParams,
}

impl BatchBuilder {
    pub fn new(store: Arc<KeyedStore>, registry: ChainRegistry, params: BridgeParams) -> Self {
        Self {
            store,
            registry,
            params,
        }
    }

    /// Seal up to `max_elements` of the most profitable pool entries for
    /// `contract` into a new batch.
    ///
    /// Selection is fee-descending with ties broken by ascending id, so the
    /// earliest request wins among equal fees. The selection must beat any
    /// still-open batch for the same contract and clear the configured fee
    /// rate. Selected entries leave the pool in the same transition that
    /// writes the batch, so no entry can appear in two open batches.
    pub fn build_batch(
        &self,
        chain: &ChainId,
        contract: &EthAddress,
        max_elements: usize,
        height: u64,
    ) -> Result<OutgoingTxBatch, Error> {
        self.registry.require_chain(chain)?;
        if max_elements == 0 {
            return Err(OutgoingError::ZeroBatchSize.into());
        }

        let pool: Vec<(Vec<u8>, OutgoingTransferTx)> = self
            .store
            .iter_prefix(&chain_prefix(keyspace::POOL_TX, chain))?;
        let mut selected: Vec<OutgoingTransferTx> = pool
            .into_iter()
            .map(|(_, tx)| tx)
            .filter(|tx| &tx.erc20_token.contract == contract)
            .collect();
        selected.sort_by(|a, b| {
            b.erc20_fee
                .amount
                .cmp(&a.erc20_fee.amount)
                .then(a.id.cmp(&b.id))
        });
        selected.truncate(max_elements);
        if selected.is_empty() {
            return Err(OutgoingError::NothingToBatch {
                chain: chain.clone(),
                contract: *contract,
            }
            .into());
        }

        let batch = OutgoingTxBatch {
            batch_nonce: self.last_batch_nonce(chain, contract)? + 1,
            token_contract: *contract,
            transactions: selected,
            block_created: height,
            timeout_height: height + self.params.batch_timeout_window,
        };

        // A relayer only ever executes the most profitable open batch, so a
        // replacement that earns less than an existing one is pointless.
        if let Some(open) = self.latest_open_batch(chain, contract)? {
            if batch.total_fees() <= open.total_fees() {
                return Err(OutgoingError::NotMoreProfitable {
                    selected: batch.total_fees(),
                    open: open.total_fees(),
                }
                .into());
            }
        }
        let required_fee = batch
            .total_amount()
            .saturating_mul(self.params.batch_fee_rate_per_mille)
            / 1_000;
        if batch.total_fees() < required_fee {
            return Err(OutgoingError::FeeRateTooLow {
                fee: batch.total_fees(),
                amount: batch.total_amount(),
            }
            .into());
        }

        for tx in &batch.transactions {
            self.store
                .delete(&entity_key(keyspace::POOL_TX, chain, &u64_segment(tx.id)));
        }
        self.store.set(
            &chain_prefix_with_contract(keyspace::LAST_BATCH_NONCE, chain, contract),
            &batch.batch_nonce,
        );
        self.store
            .set(&batch_key(chain, contract, batch.batch_nonce), &batch);
        metrics::batch_built(chain);
        info!(
            chain = %chain,
            contract = %contract,
            nonce = batch.batch_nonce,
            txs = batch.transactions.len(),
            total_fees = batch.total_fees(),
            timeout_height = batch.timeout_height,
            "outgoing batch built"
        );
        Ok(batch)
    }

    /// Discard an open batch and return its transactions to the pool with
    /// their original ids and fields unchanged. Terminal: the batch row and
    /// its confirmations are deleted and the nonce is never reused.
    pub fn cancel_batch(
        &self,
        chain: &ChainId,
        contract: &EthAddress,
        nonce: u64,
    ) -> Result<(), Error> {
        self.registry.require_chain(chain)?;
        let key = batch_key(chain, contract, nonce);
        let batch: OutgoingTxBatch =
            self.store
                .get(&key)?
                .ok_or_else(|| OutgoingError::BatchNotFound {
                    chain: chain.clone(),
                    contract: *contract,
                    nonce,
                })?;
        for tx in &batch.transactions {
            self.store
                .set(&entity_key(keyspace::POOL_TX, chain, &u64_segment(tx.id)), tx);
        }
        self.store.delete(&key);
        self.delete_confirmations(chain, contract, nonce);
        info!(chain = %chain, contract = %contract, nonce, "batch cancelled; transfers returned to pool");
        Ok(())
    }

    /// Cancel every open batch whose timeout height has passed. Returns the
    /// number of batches swept; sweeping with nothing expired is a no-op.
    pub fn sweep_timed_out_batches(&self, chain: &ChainId, height: u64) -> Result<usize, Error> {
        self.registry.require_chain(chain)?;
        let expired: Vec<OutgoingTxBatch> = self
            .batches(chain)?
            .into_iter()
            .filter(|batch| batch.timeout_height < height)
            .collect();
        for batch in &expired {
            self.cancel_batch(chain, &batch.token_contract, batch.batch_nonce)?;
        }
        Ok(expired.len())
    }

    /// Settle a batch reported executed by an observed claim.
    ///
    /// The executed batch is deleted outright — its transfers now live on
    /// the external chain. Every still-open batch with a lower nonce for
    /// the same contract can no longer execute there, so those are
    /// cancelled and their transactions returned to the pool.
    pub fn batch_executed(
        &self,
        chain: &ChainId,
        contract: &EthAddress,
        nonce: u64,
    ) -> Result<(), Error> {
        let key = batch_key(chain, contract, nonce);
        let batch: OutgoingTxBatch =
            self.store
                .get(&key)?
                .ok_or_else(|| OutgoingError::BatchNotFound {
                    chain: chain.clone(),
                    contract: *contract,
                    nonce,
                })?;

        let superseded: Vec<OutgoingTxBatch> = self
            .batches(chain)?
            .into_iter()
            .filter(|other| {
                other.token_contract == *contract && other.batch_nonce < nonce
            })
            .collect();
        for other in &superseded {
            self.cancel_batch(chain, contract, other.batch_nonce)?;
        }

        self.store.delete(&key);
        self.delete_confirmations(chain, contract, nonce);
        metrics::batch_executed(chain);
        info!(
            chain = %chain,
            contract = %contract,
            nonce,
            txs = batch.transactions.len(),
            superseded = superseded.len(),
            "batch executed on external chain"
        );
        Ok(())
    }

    pub fn batch(
        &self,
        chain: &ChainId,
        contract: &EthAddress,
        nonce: u64,
    ) -> Result<Option<OutgoingTxBatch>, Error> {
        Ok(self.store.get(&batch_key(chain, contract, nonce))?)
    }

    /// All open batches for `chain`, ordered by contract then nonce.
    pub fn batches(&self, chain: &ChainId) -> Result<Vec<OutgoingTxBatch>, Error> {
        let entries: Vec<(Vec<u8>, OutgoingTxBatch)> =
            self.store.iter_prefix(&chain_prefix(keyspace::BATCH, chain))?;
        Ok(entries.into_iter().map(|(_, batch)| batch).collect())
    }

    fn latest_open_batch(
        &self,
        chain: &ChainId,
        contract: &EthAddress,
    ) -> Result<Option<OutgoingTxBatch>, Error> {
        let mut prefix = chain_prefix(keyspace::BATCH, chain);
        prefix.extend_from_slice(contract.as_bytes());
        let entries: Vec<(Vec<u8>, OutgoingTxBatch)> = self.store.iter_prefix(&prefix)?;
        Ok(entries.into_iter().map(|(_, batch)| batch).next_back())
    }

    fn last_batch_nonce(&self, chain: &ChainId, contract: &EthAddress) -> Result<u64, Error> {
        Ok(self
            .store
            .get(&chain_prefix_with_contract(
                keyspace::LAST_BATCH_NONCE,
                chain,
                contract,
            ))?
            .unwrap_or(0))
    }

    fn delete_confirmations(&self, chain: &ChainId, contract: &EthAddress, nonce: u64) {
        let mut prefix = chain_prefix(keyspace::BATCH_CONFIRM, chain);
        prefix.extend_from_slice(contract.as_bytes());
        prefix.extend_from_slice(&u64_segment(nonce));
        self.store.delete_prefix(&prefix);
    }
}

pub(crate) fn batch_key(chain: &ChainId, contract: &EthAddress, nonce: u64) -> Vec<u8> {
    let mut entity = Vec::with_capacity(20 + 8);
    entity.extend_from_slice(contract.as_bytes());
    entity.extend_from_slice(&u64_segment(nonce));
    entity_key(keyspace::BATCH, chain, &entity)
}

fn chain_prefix_with_contract(tag: u8, chain: &ChainId, contract: &EthAddress) -> Vec<u8> {
    entity_key(tag, chain, contract.as_bytes())
}
