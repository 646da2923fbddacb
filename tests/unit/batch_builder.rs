use causeway_protocol::config::BridgeParams;
use causeway_protocol::ErrorKind;
use pretty_assertions::assert_eq;

use crate::common::{chain_id, test_bridge, test_bridge_with_params, token_contract, TestBridge};

/// Pool with fees [10, 30, 30, 5] under ids [1, 2, 3, 4].
fn seeded_bridge() -> TestBridge {
    let bridge = test_bridge();
    bridge.seed_pool_entry("alice", 100, 10);
    bridge.seed_pool_entry("bob", 100, 30);
    bridge.seed_pool_entry("carol", 100, 30);
    bridge.seed_pool_entry("dave", 100, 5);
    bridge
}

#[test]
fn selection_is_fee_descending_with_id_tiebreak() {
    let bridge = seeded_bridge();

    let batch = bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 2, 500)
        .unwrap();
    let picked: Vec<u64> = batch.transactions.iter().map(|tx| tx.id).collect();
    assert_eq!(picked, vec![2, 3], "equal fees resolve to the earlier id");
    assert_eq!(batch.batch_nonce, 1);
    assert_eq!(batch.total_fees(), 60);
    assert_eq!(batch.block_created, 500);
    assert_eq!(
        batch.timeout_height,
        500 + BridgeParams::default().batch_timeout_window
    );

    let remaining: Vec<u64> = bridge
        .pool
        .iter(&chain_id())
        .unwrap()
        .map(|tx| tx.id)
        .collect();
    assert_eq!(remaining, vec![1, 4], "selected entries left the pool");
}

#[test]
fn empty_selection_and_zero_size_are_errors() {
    let bridge = test_bridge();

    let err = bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 10, 500)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound, "nothing to batch");

    bridge.seed_pool_entry("alice", 100, 10);
    let err = bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 0, 500)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn replacement_batch_must_be_more_profitable() {
    let bridge = seeded_bridge();
    bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 2, 500)
        .unwrap();

    // Remaining fees are [10, 5]; 15 does not beat the open 60.
    let err = bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 2, 501)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    // A richer entry arrives and the next batch clears the bar.
    bridge.seed_pool_entry("erin", 100, 100);
    let batch = bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 3, 502)
        .unwrap();
    assert_eq!(batch.batch_nonce, 2, "nonces are strictly increasing");
    assert_eq!(batch.total_fees(), 115);
}

#[test]
fn fee_rate_gate_applies_when_configured() {
    let params = BridgeParams {
        batch_fee_rate_per_mille: 50,
        ..Default::default()
    };
    let bridge = test_bridge_with_params(params);

    // 4 per 100 is under the 50-per-mille floor of 5.
    bridge.seed_pool_entry("alice", 100, 4);
    let err = bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 10, 500)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    // A second transfer lifts the total fee to exactly the floor.
    bridge.seed_pool_entry("bob", 100, 6);
    let batch = bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 10, 500)
        .unwrap();
    assert_eq!(batch.total_fees(), 10);
}

#[test]
fn cancel_returns_transactions_unchanged() {
    let bridge = seeded_bridge();
    let before = bridge.pool.entries(&chain_id()).unwrap();

    let batch = bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 4, 500)
        .unwrap();
    bridge
        .batches
        .cancel_batch(&chain_id(), &token_contract(), batch.batch_nonce)
        .unwrap();

    let after = bridge.pool.entries(&chain_id()).unwrap();
    assert_eq!(after, before, "original ids and fields round-trip");
    assert!(bridge.batches.batches(&chain_id()).unwrap().is_empty());

    let err = bridge
        .batches
        .cancel_batch(&chain_id(), &token_contract(), batch.batch_nonce)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound, "terminal states are final");
}

#[test]
fn cancelling_a_batched_entry_from_the_pool_fails() {
    let bridge = seeded_bridge();
    bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 2, 500)
        .unwrap();

    // Entry 2 is sealed in the batch; the pool no longer owns it.
    let err = bridge
        .pool
        .remove(&chain_id(), &crate::common::acct("bob"), 2)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn no_entry_is_ever_in_two_open_batches() {
    let bridge = seeded_bridge();
    let first = bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 2, 500)
        .unwrap();
    bridge.seed_pool_entry("erin", 100, 100);
    let second = bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 10, 501)
        .unwrap();

    for tx in &first.transactions {
        assert!(
            !second.transactions.iter().any(|other| other.id == tx.id),
            "id {} appears in two open batches",
            tx.id
        );
    }
}

#[test]
fn executed_batch_prunes_lower_nonces_back_to_pool() {
    let bridge = seeded_bridge();
    let first = bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 2, 500)
        .unwrap();
    assert_eq!(first.batch_nonce, 1);
    bridge.seed_pool_entry("erin", 100, 100);
    let second = bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 1, 501)
        .unwrap();
    assert_eq!(second.batch_nonce, 2);

    bridge
        .batches
        .batch_executed(&chain_id(), &token_contract(), second.batch_nonce)
        .unwrap();

    assert!(bridge.batches.batches(&chain_id()).unwrap().is_empty());
    let pool_ids: Vec<u64> = bridge
        .pool
        .iter(&chain_id())
        .unwrap()
        .map(|tx| tx.id)
        .collect();
    // The executed batch's transfer is settled; the superseded batch's
    // transfers (ids 2, 3) rejoin the unbatched ids 1 and 4.
    assert_eq!(pool_ids, vec![1, 2, 3, 4]);
}

#[test]
fn sweep_cancels_only_expired_batches() {
    let bridge = seeded_bridge();
    let batch = bridge
        .batches
        .build_batch(&chain_id(), &token_contract(), 2, 500)
        .unwrap();

    let swept = bridge
        .batches
        .sweep_timed_out_batches(&chain_id(), batch.timeout_height)
        .unwrap();
    assert_eq!(swept, 0, "timeout height itself is not yet expired");

    let swept = bridge
        .batches
        .sweep_timed_out_batches(&chain_id(), batch.timeout_height + 1)
        .unwrap();
    assert_eq!(swept, 1);
    assert_eq!(bridge.pool.entries(&chain_id()).unwrap().len(), 4);

    let swept = bridge
        .batches
        .sweep_timed_out_batches(&chain_id(), batch.timeout_height + 1)
        .unwrap();
    assert_eq!(swept, 0, "sweeping again is a no-op");
}
