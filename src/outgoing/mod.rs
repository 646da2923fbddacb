/*!
# Outgoing Transfer Pipeline

Pending transfers accumulate in a per-chain pool until the batch builder
drains them into fee-maximizing, size-bounded batches for execution on the
external chain. Orchestrator signatures over open batches are collected for
relayer consumption, and an observed batch-executed claim settles the batch
and everything beneath it.
*/

pub mod batch;
pub mod confirm;
pub mod error;
pub mod pool;

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::state::{AccountId, Erc20Token, EthAddress};

pub use batch::BatchBuilder;
pub use confirm::ConfirmationTracker;
pub use error::OutgoingError;
pub use pool::OutgoingTxPool;

/// A pending transfer to the external chain.
///
/// Owned by the pool until claimed by a batch; the id is unique per chain
/// and assigned monotonically. The fee contract always equals the token
/// contract — fees are paid in the transferred asset.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq, Eq)]
pub struct OutgoingTransferTx {
    pub id: u64,
    pub sender: AccountId,
    pub dest_address: EthAddress,
    pub erc20_token: Erc20Token,
    pub erc20_fee: Erc20Token,
}

/// A sealed bundle of pool entries assigned one execution nonce.
///
/// The transaction set is immutable once created, ordered fee-descending.
/// Terminal states are deletion: executed via an observed claim, or
/// cancelled/timed out with the transactions returned to the pool.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq, Eq)]
pub struct OutgoingTxBatch {
    pub batch_nonce: u64,
    pub token_contract: EthAddress,
    pub transactions: Vec<OutgoingTransferTx>,
    pub block_created: u64,
    pub timeout_height: u64,
}

impl OutgoingTxBatch {
    /// Sum of member fees; what a relayer earns by executing the batch.
    pub fn total_fees(&self) -> u128 {
        self.transactions.iter().map(|tx| tx.erc20_fee.amount).sum()
    }

    /// Sum of member transfer amounts.
    pub fn total_amount(&self) -> u128 {
        self.transactions
            .iter()
            .map(|tx| tx.erc20_token.amount)
            .sum()
    }
}

/// One orchestrator's signature over a batch's execution payload.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq, Eq)]
pub struct BatchConfirmation {
    pub batch_nonce: u64,
    pub token_contract: EthAddress,
    pub orchestrator: AccountId,
    pub signature: Vec<u8>,
}
