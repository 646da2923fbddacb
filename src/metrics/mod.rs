//! Settlement counters, emitted through the `metrics` facade. The host
//! chooses the recorder; with none installed these are no-ops.

use metrics::increment_counter;

use crate::state::ChainId;

pub const ATTESTATIONS_OBSERVED: &str = "causeway_attestations_observed_total";
pub const POOL_TXS_ADDED: &str = "causeway_pool_txs_added_total";
pub const BATCHES_BUILT: &str = "causeway_batches_built_total";
pub const BATCHES_EXECUTED: &str = "causeway_batches_executed_total";

pub(crate) fn attestation_observed(chain: &ChainId) {
    increment_counter!(ATTESTATIONS_OBSERVED, "chain" => chain.to_string());
}

pub(crate) fn pool_tx_added(chain: &ChainId) {
    increment_counter!(POOL_TXS_ADDED, "chain" => chain.to_string());
}

pub(crate) fn batch_built(chain: &ChainId) {
    increment_counter!(BATCHES_BUILT, "chain" => chain.to_string());
}

pub(crate) fn batch_executed(chain: &ChainId) {
    increment_counter!(BATCHES_EXECUTED, "chain" => chain.to_string());
}
