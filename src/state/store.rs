/*!
# Keyed Store

The persistence layer of the settlement core: an ordered key-value store in
which every entity lives under a `(namespace tag, chain prefix, entity key)`
key and every value crosses an opaque SCALE encode/decode boundary.

## Layout

Keys are built as `[tag, chain-prefix-length] ++ chain-prefix ++ entity-key`.
The embedded length keeps prefixes unambiguous when chain prefixes share a
leading substring. Per-chain scalars use an empty entity key; multi-entry
namespaces append the entity's own unique key. Numeric key segments are
big-endian so lexicographic iteration is numeric iteration.

Ownership is expressed purely through key-namespace membership: removing a
chain is a prefix-ranged delete per namespace, with no object graph to walk.
*/

use std::collections::BTreeMap;

use parity_scale_codec::{Decode, Encode};
use parking_lot::RwLock;

use super::error::StateError;
use super::types::ChainId;

/// Namespace tags for every key family the settlement core owns.
pub mod keyspace {
    /// Registered chain identities.
    pub const CHAIN_INFO: u8 = 0x01;
    /// Per-chain scalar: highest observed event nonce.
    pub const LAST_OBSERVED_NONCE: u8 = 0x02;
    /// Per-chain scalar: external block height of the latest observation.
    pub const LAST_OBSERVED_HEIGHT: u8 = 0x03;
    /// Per-chain scalar: last assigned outgoing pool id.
    pub const LAST_POOL_ID: u8 = 0x04;
    /// Last assigned batch nonce, keyed by token contract.
    pub const LAST_BATCH_NONCE: u8 = 0x05;
    /// Attestations, keyed by event nonce and content hash.
    pub const ATTESTATION: u8 = 0x06;
    /// Per-validator claim watermark, keyed by validator id.
    pub const LAST_EVENT_NONCE_BY_VALIDATOR: u8 = 0x07;
    /// Pending outgoing transfers, keyed by pool id.
    pub const POOL_TX: u8 = 0x08;
    /// Open batches, keyed by token contract and batch nonce.
    pub const BATCH: u8 = 0x09;
    /// Orchestrator batch confirmations, keyed by contract, nonce, orchestrator.
    pub const BATCH_CONFIRM: u8 = 0x0a;
    /// Local denomination to external token contract mapping.
    pub const DENOM_TO_ERC20: u8 = 0x0b;
    /// External token contract to local denomination mapping.
    pub const ERC20_TO_DENOM: u8 = 0x0c;

    /// Every chain-scoped namespace, in cascade-delete order. `remove_chain`
    /// ranges over this table so a new namespace cannot be forgotten there.
    pub const CHAIN_SCOPED: [u8; 12] = [
        CHAIN_INFO,
        LAST_OBSERVED_NONCE,
        LAST_OBSERVED_HEIGHT,
        LAST_POOL_ID,
        LAST_BATCH_NONCE,
        ATTESTATION,
        LAST_EVENT_NONCE_BY_VALIDATOR,
        POOL_TX,
        BATCH,
        BATCH_CONFIRM,
        DENOM_TO_ERC20,
        ERC20_TO_DENOM,
    ];
}

/// Build the key prefix shared by every entity of `chain` in namespace `tag`.
pub fn chain_prefix(tag: u8, chain: &ChainId) -> Vec<u8> {
    let raw = chain.as_bytes();
    debug_assert!(raw.len() <= u8::MAX as usize);
    let mut key = Vec::with_capacity(2 + raw.len());
    key.push(tag);
    key.push(raw.len() as u8);
    key.extend_from_slice(raw);
    key
}

/// Build a full entity key under `(tag, chain)`.
pub fn entity_key(tag: u8, chain: &ChainId, entity: &[u8]) -> Vec<u8> {
    let mut key = chain_prefix(tag, chain);
    key.extend_from_slice(entity);
    key
}

/// Big-endian segment for a numeric key component, so that byte order is
/// numeric order under prefix iteration.
pub fn u64_segment(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Ordered keyed store shared by every component of the settlement core.
///
/// All operations are synchronous read-modify-writes; the surrounding
/// transaction-ordering layer applies externally submitted operations one at
/// a time, so the lock here only guards against torn reads from embedding
/// hosts that query concurrently.
#[derive(Debug, Default)]
pub struct KeyedStore {
    kv: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl KeyedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch and decode the value at `key`, if present.
    pub fn get<T: Decode>(&self, key: &[u8]) -> Result<Option<T>, StateError> {
        let kv = self.kv.read();
        match kv.get(key) {
            None => Ok(None),
            Some(raw) => T::decode(&mut raw.as_slice())
                .map(Some)
                .map_err(|e| StateError::Corrupt {
                    key: hex::encode(key),
                    reason: e.to_string(),
                }),
        }
    }

    /// Encode and store `value` at `key`, replacing any previous value.
    pub fn set<T: Encode>(&self, key: &[u8], value: &T) {
        self.kv.write().insert(key.to_vec(), value.encode());
    }

    /// Delete the value at `key`. Returns whether a value was present.
    pub fn delete(&self, key: &[u8]) -> bool {
        self.kv.write().remove(key).is_some()
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.kv.read().contains_key(key)
    }

    /// Total number of stored keys, across all namespaces and chains.
    pub fn len(&self) -> usize {
        self.kv.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.kv.read().is_empty()
    }

    /// Snapshot every `(key, value)` pair under `prefix`, in key order.
    ///
    /// The snapshot is finite and each call restarts from the front of the
    /// range; callers get a consistent view even if they mutate mid-walk.
    pub fn iter_prefix<T: Decode>(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, T)>, StateError> {
        let kv = self.kv.read();
        kv.range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, raw)| {
                T::decode(&mut raw.as_slice())
                    .map(|v| (k.clone(), v))
                    .map_err(|e| StateError::Corrupt {
                        key: hex::encode(k),
                        reason: e.to_string(),
                    })
            })
            .collect()
    }

    /// Delete every key under `prefix`. Returns the number of keys removed;
    /// an empty range is a no-op, which keeps cascade deletes idempotent.
    pub fn delete_prefix(&self, prefix: &[u8]) -> usize {
        let mut kv = self.kv.write();
        let doomed: Vec<Vec<u8>> = kv
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &doomed {
            kv.remove(key);
        }
        doomed.len()
    }
}
