use std::sync::Arc;

use tracing::info;

use super::{Attestation, ClaimPayload};
use crate::error::Error;
use crate::ledger::{module_account, Ledger};
use crate::outgoing::batch::BatchBuilder;
use crate::registry::ChainRegistry;
use crate::state::{ChainId, Coin};

/// Claim-type-specific state transition, invoked exactly once per observed
/// attestation.
pub trait ClaimHandler: Send + Sync {
    fn apply(&self, chain: &ChainId, attestation: &Attestation) -> Result<(), Error>;
}

/// Production claim effects: deposit crediting and batch settlement.
pub struct BridgeClaimHandler {
    registry: ChainRegistry,
    ledger: Arc<dyn Ledger>,
    batches: BatchBuilder,
}

impl BridgeClaimHandler {
    pub fn new(registry: ChainRegistry, ledger: Arc<dyn Ledger>, batches: BatchBuilder) -> Self {
        Self {
            registry,
            ledger,
            batches,
        }
    }
}

impl ClaimHandler for BridgeClaimHandler {
    fn apply(&self, chain: &ChainId, attestation: &Attestation) -> Result<(), Error> {
        match &attestation.payload {
            ClaimPayload::Deposit {
                token, receiver, ..
            } => {
                let mapping = self.registry.erc20_to_denom(chain, &token.contract)?;
                let coin = Coin::new(mapping.denom, token.amount);
                // Native assets sit escrowed in the module account; bridged
                // vouchers are created on entry.
                if mapping.cosmos_originated {
                    self.ledger.transfer(&module_account(), receiver, &coin)?;
                } else {
                    self.ledger.mint_to(receiver, &coin)?;
                }
                info!(chain = %chain, %receiver, %coin, "deposit credited");
                Ok(())
            }
            ClaimPayload::BatchExecuted {
                batch_nonce,
                token_contract,
            } => self
                .batches
                .batch_executed(chain, token_contract, *batch_nonce),
        }
    }
}
