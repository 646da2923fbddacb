/*!
# Attestation Engine

Turns many independent validator claims about the same external event into
a single finalized fact, exactly once, under Byzantine and partial-failure
conditions, with strict nonce ordering.

## Core Components

### Claim
One validator's assertion about an external-chain event: the chain prefix,
the event nonce, the external block height, and a typed payload. A claim is
immutable once stored and identical claims from different validators
collapse onto one attestation through the claim's content hash.

### Attestation
The aggregated view of one event: the set of validators that have vouched
for a given content hash at a given nonce, and whether the supermajority
threshold has been crossed (`observed`). An attestation's state-transition
effect is applied exactly once, at the moment it becomes observed, and the
chain's last-observed-nonce watermark then advances by exactly one.

### Ordering
Event nonces per chain are attested and observed strictly in increasing
order with no gaps. Contiguity is enforced per claimer: a validator's next
accepted nonce is one past its own watermark, which starts at the chain's
last observed nonce for validators that have never voted.
*/

pub mod aggregator;
pub mod error;
pub mod handler;
pub mod power;

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::state::{AccountId, ChainId, Erc20Token, EthAddress, ValidatorId};

pub use aggregator::AttestationEngine;
pub use error::AttestationError;
pub use handler::{BridgeClaimHandler, ClaimHandler};
pub use power::{StaticPowerTable, ValidatorPowerOracle};

/// Typed payload of a claim; the claim type determines the state-transition
/// effect applied when the attestation becomes observed.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq, Eq)]
pub enum ClaimPayload {
    /// Tokens were deposited to the bridge contract on the external chain.
    Deposit {
        token: Erc20Token,
        ethereum_sender: EthAddress,
        receiver: AccountId,
    },
    /// A previously built batch was executed by the external contract.
    BatchExecuted {
        batch_nonce: u64,
        token_contract: EthAddress,
    },
}

/// One validator's assertion about an external-chain event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claim {
    pub chain: ChainId,
    pub event_nonce: u64,
    pub eth_block_height: u64,
    pub claimer: ValidatorId,
    pub payload: ClaimPayload,
}

impl Claim {
    /// Content hash over everything except the claimer, so that identical
    /// observations collapse and any divergence forks the attestation.
    pub fn content_hash(&self) -> [u8; 32] {
        let encoded = (self.event_nonce, self.eth_block_height, &self.payload).encode();
        Sha256::digest(encoded).into()
    }
}

/// Aggregated claims for one `(chain, nonce, content hash)` triple.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq, Eq)]
pub struct Attestation {
    pub event_nonce: u64,
    pub content_hash: [u8; 32],
    pub eth_block_height: u64,
    pub observed: bool,
    pub votes: Vec<ValidatorId>,
    pub payload: ClaimPayload,
}

impl Attestation {
    fn from_claim(claim: &Claim) -> Self {
        Self {
            event_nonce: claim.event_nonce,
            content_hash: claim.content_hash(),
            eth_block_height: claim.eth_block_height,
            observed: false,
            votes: vec![claim.claimer.clone()],
            payload: claim.payload.clone(),
        }
    }

    pub fn has_voted(&self, validator: &ValidatorId) -> bool {
        self.votes.contains(validator)
    }
}
