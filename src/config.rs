use serde::{Deserialize, Serialize};

use crate::state::EthAddress;

/// Settlement core parameters.
///
/// Time only flows through the host's block-height counter, so the batch
/// timeout is expressed as a height offset rather than a duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeParams {
    /// Heights after creation at which an open batch becomes sweepable.
    pub batch_timeout_window: u64,

    /// Minimum total batch fee per thousand units of batched amount.
    /// Zero disables the gate.
    pub batch_fee_rate_per_mille: u128,

    /// Destination addresses transfers may never be sent to.
    pub blacklisted_addresses: Vec<EthAddress>,
}

impl Default for BridgeParams {
    fn default() -> Self {
        Self {
            batch_timeout_window: 1_000,
            batch_fee_rate_per_mille: 0,
            blacklisted_addresses: Vec::new(),
        }
    }
}

impl BridgeParams {
    /// A destination is unusable if it is the zero address or blacklisted.
    pub fn is_invalid_destination(&self, dest: &EthAddress) -> bool {
        dest.is_zero() || self.blacklisted_addresses.contains(dest)
    }
}
