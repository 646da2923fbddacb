use std::sync::Arc;

use tracing::info;

use super::error::OutgoingError;
use super::OutgoingTransferTx;
use crate::config::BridgeParams;
use crate::error::Error;
use crate::ledger::{module_account, Ledger};
use crate::metrics;
use crate::registry::ChainRegistry;
use crate::state::store::{chain_prefix, entity_key, u64_segment};
use crate::state::{keyspace, AccountId, ChainId, Coin, Erc20Token, EthAddress, KeyedStore};

/// Pending outgoing transfers per destination chain, keyed by a monotonic
/// transaction id. Entries leave the pool either by sender cancellation or
/// by inclusion in a batch.
#[derive(Clone)]
pub struct OutgoingTxPool {
    store: Arc<KeyedStore>,
    registry: ChainRegistry,
    ledger: Arc<dyn Ledger>,
    params: BridgeParams,
}

impl OutgoingTxPool {
    pub fn new(
        store: Arc<KeyedStore>,
        registry: ChainRegistry,
        ledger: Arc<dyn Ledger>,
        params: BridgeParams,
    ) -> Self {
        Self {
            store,
            registry,
            ledger,
            params,
        }
    }

    /// Queue a transfer for batching, escrowing amount plus fee.
    ///
    /// The fee is paid in the transferred asset, so the fee denom must match
    /// the transfer denom. Native assets stay escrowed in the module
    /// account; bridged vouchers are burned here and reminted on refund.
    /// All validation happens before the ledger moves anything, and the
    /// ledger moves before the store is touched: a failure anywhere aborts
    /// with no partial state.
    pub fn add(
        &self,
        chain: &ChainId,
        sender: &AccountId,
        dest: &EthAddress,
        amount: &Coin,
        fee: &Coin,
    ) -> Result<u64, Error> {
        self.registry.require_chain(chain)?;
        if amount.denom != fee.denom {
            return Err(OutgoingError::FeeDenomMismatch {
                amount: amount.denom.clone(),
                fee: fee.denom.clone(),
            }
            .into());
        }
        if amount.amount == 0 {
            return Err(OutgoingError::NonPositiveAmount.into());
        }
        if self.params.is_invalid_destination(dest) {
            return Err(OutgoingError::InvalidDestination(*dest).into());
        }
        let mapping = self.registry.denom_to_erc20(chain, &amount.denom)?;
        let total = amount
            .amount
            .checked_add(fee.amount)
            .ok_or(OutgoingError::AmountOverflow)?;
        let escrow = Coin::new(amount.denom.clone(), total);

        self.ledger.transfer(sender, &module_account(), &escrow)?;
        if !mapping.cosmos_originated {
            self.ledger.burn_from(&module_account(), &escrow)?;
        }

        let id = self.next_pool_id(chain)?;
        let tx = OutgoingTransferTx {
            id,
            sender: sender.clone(),
            dest_address: *dest,
            erc20_token: Erc20Token::new(mapping.erc20, amount.amount),
            erc20_fee: Erc20Token::new(mapping.erc20, fee.amount),
        };
        self.store
            .set(&entity_key(keyspace::POOL_TX, chain, &u64_segment(id)), &tx);
        metrics::pool_tx_added(chain);
        info!(chain = %chain, id, %sender, dest = %dest, %amount, %fee, "transfer added to outgoing pool");
        Ok(id)
    }

    /// Cancel a pending transfer and refund the sender.
    ///
    /// Only the original sender may cancel, and only while the entry is
    /// still in the pool — an entry claimed by a batch is immutable until
    /// the batch itself is cancelled.
    pub fn remove(
        &self,
        chain: &ChainId,
        sender: &AccountId,
        id: u64,
    ) -> Result<OutgoingTransferTx, Error> {
        self.registry.require_chain(chain)?;
        let key = entity_key(keyspace::POOL_TX, chain, &u64_segment(id));
        let tx: OutgoingTransferTx =
            self.store
                .get(&key)?
                .ok_or_else(|| OutgoingError::PoolEntryNotFound {
                    chain: chain.clone(),
                    id,
                })?;
        if &tx.sender != sender {
            return Err(OutgoingError::NotPoolEntrySender {
                chain: chain.clone(),
                id,
                sender: sender.clone(),
            }
            .into());
        }

        let mapping = self.registry.erc20_to_denom(chain, &tx.erc20_token.contract)?;
        let total = tx
            .erc20_token
            .amount
            .checked_add(tx.erc20_fee.amount)
            .ok_or(OutgoingError::AmountOverflow)?;
        let refund = Coin::new(mapping.denom, total);
        if !mapping.cosmos_originated {
            self.ledger.mint_to(&module_account(), &refund)?;
        }
        self.ledger.transfer(&module_account(), sender, &refund)?;

        self.store.delete(&key);
        info!(chain = %chain, id, %sender, "transfer cancelled and refunded");
        Ok(tx)
    }

    /// Snapshot of the pool for `chain`, id-ascending. Finite, and each
    /// call restarts from the lowest id.
    pub fn entries(&self, chain: &ChainId) -> Result<Vec<OutgoingTransferTx>, Error> {
        let entries: Vec<(Vec<u8>, OutgoingTransferTx)> = self
            .store
            .iter_prefix(&chain_prefix(keyspace::POOL_TX, chain))?;
        Ok(entries.into_iter().map(|(_, tx)| tx).collect())
    }

    /// Iterate the pool for `chain` in id order.
    pub fn iter(
        &self,
        chain: &ChainId,
    ) -> Result<impl Iterator<Item = OutgoingTransferTx>, Error> {
        Ok(self.entries(chain)?.into_iter())
    }

    fn next_pool_id(&self, chain: &ChainId) -> Result<u64, Error> {
        let key = chain_prefix(keyspace::LAST_POOL_ID, chain);
        let id = self.store.get::<u64>(&key)?.unwrap_or(0) + 1;
        self.store.set(&key, &id);
        Ok(id)
    }
}
