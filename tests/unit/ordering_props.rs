use proptest::prelude::*;

use crate::common::{
    acct, chain_id, deposit_claim, test_bridge, token_contract, val, DENOM,
};

proptest! {
    /// For any interleaving of per-validator-ordered claim streams, the
    /// observed nonce sequence is exactly 1..=k — gapless, each effect
    /// applied exactly once.
    #[test]
    fn watermark_is_gapless_under_any_interleaving(
        powers in prop::collection::vec(1u64..50, 2..5),
        k in 1u64..6,
        draws in prop::collection::vec(0usize..5, 0..64),
    ) {
        let bridge = test_bridge();
        let names: Vec<String> = (0..powers.len()).map(|i| format!("val-{i}")).collect();
        for (name, power) in names.iter().zip(&powers) {
            bridge.power.set_power(val(name), *power);
        }

        let mut next_nonce: Vec<u64> = vec![1; names.len()];
        let mut submit = |idx: usize, next_nonce: &mut Vec<u64>| {
            if next_nonce[idx] <= k {
                let claim = deposit_claim(next_nonce[idx], &names[idx], 10 + u128::from(next_nonce[idx]), "alice");
                bridge.engine.submit_claim(&claim).expect("in-order claim");
                next_nonce[idx] += 1;
            }
        };

        for draw in draws {
            submit(draw % names.len(), &mut next_nonce);
        }
        // Flush: every validator finishes its stream.
        for idx in 0..names.len() {
            while next_nonce[idx] <= k {
                submit(idx, &mut next_nonce);
            }
        }

        prop_assert_eq!(bridge.engine.last_observed_nonce(&chain_id()).unwrap(), k);
        let expected: u128 = (1..=k).map(|n| 10 + u128::from(n)).sum();
        prop_assert_eq!(
            bridge.ledger.balance_of(&acct("alice"), DENOM),
            expected,
            "each deposit credited exactly once"
        );
        for att in bridge.engine.attestations(&chain_id()).unwrap() {
            prop_assert!(att.observed);
            prop_assert_eq!(att.votes.len(), names.len());
        }
    }

    /// Batch selection is fee-descending with ascending-id tiebreak, takes
    /// at most `max` entries, and partitions the pool: nothing is lost and
    /// nothing is referenced twice.
    #[test]
    fn batch_selection_is_ordered_and_partitions_the_pool(
        fees in prop::collection::vec(0u128..100, 1..8),
        max in 1usize..10,
    ) {
        let bridge = test_bridge();
        let mut all_ids = Vec::new();
        for (i, fee) in fees.iter().enumerate() {
            all_ids.push(bridge.seed_pool_entry(&format!("sender-{i}"), 100, *fee));
        }

        let batch = bridge
            .batches
            .build_batch(&chain_id(), &token_contract(), max, 500)
            .expect("non-empty pool always batches");

        prop_assert!(batch.transactions.len() <= max);
        prop_assert_eq!(batch.transactions.len(), max.min(fees.len()));
        for pair in batch.transactions.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                a.erc20_fee.amount > b.erc20_fee.amount
                    || (a.erc20_fee.amount == b.erc20_fee.amount && a.id < b.id),
                "selection must be fee-descending with id tiebreak"
            );
        }

        let mut seen: Vec<u64> = batch.transactions.iter().map(|tx| tx.id).collect();
        seen.extend(bridge.pool.iter(&chain_id()).unwrap().map(|tx| tx.id));
        seen.sort_unstable();
        prop_assert_eq!(seen, all_ids, "batch and pool partition the entries");
    }
}
