/*!
# Chain Registry

Per-destination-chain identity and token-mapping storage. The registry is
the leaf dependency of every other component: a chain prefix must be
registered here before claims, pool entries or batches can reference it.

Removing a chain cascades over every namespace the settlement core owns for
that prefix. The cascade is not transactional across namespaces — the host
storage commits atomically at a higher layer — but it is idempotent:
re-running it on an already-removed prefix deletes nothing and succeeds.
*/

use std::sync::Arc;

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::error::ErrorKind;
use crate::state::store::{chain_prefix, entity_key};
use crate::state::{keyspace, ChainId, ChainInfo, EthAddress, KeyedStore, StateError};

/// Errors raised by chain and token registration.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("chain {0} is not registered")]
    UnknownChain(ChainId),

    #[error("token mapping for chain {chain} already exists: {denom} <-> {erc20}")]
    MappingExists {
        chain: ChainId,
        denom: String,
        erc20: EthAddress,
    },

    #[error("no token contract registered on {chain} for denom {denom}")]
    DenomNotMapped { chain: ChainId, denom: String },

    #[error("no denom registered on {chain} for contract {erc20}")]
    Erc20NotMapped { chain: ChainId, erc20: EthAddress },

    #[error(transparent)]
    State(#[from] StateError),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::UnknownChain(_) => ErrorKind::NotFound,
            RegistryError::MappingExists { .. } => ErrorKind::Conflict,
            RegistryError::DenomNotMapped { .. } => ErrorKind::NotFound,
            RegistryError::Erc20NotMapped { .. } => ErrorKind::NotFound,
            RegistryError::State(e) => e.kind(),
        }
    }
}

/// A registered local-denom/external-contract pair.
///
/// `cosmos_originated` records which side the asset is native to: native
/// assets are escrowed and released through the module account, bridged
/// vouchers are burned on exit and minted on entry.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq, Eq)]
pub struct TokenMapping {
    pub denom: String,
    pub erc20: EthAddress,
    pub cosmos_originated: bool,
}

/// Store-backed registry of destination chains and their token mappings.
#[derive(Clone)]
pub struct ChainRegistry {
    store: Arc<KeyedStore>,
}

impl ChainRegistry {
    pub fn new(store: Arc<KeyedStore>) -> Self {
        Self { store }
    }

    /// Upsert a chain identity by prefix.
    pub fn set_chain(&self, info: ChainInfo) {
        self.store
            .set(&chain_prefix(keyspace::CHAIN_INFO, &info.id), &info);
    }

    pub fn chain(&self, id: &ChainId) -> Result<Option<ChainInfo>, RegistryError> {
        Ok(self.store.get(&chain_prefix(keyspace::CHAIN_INFO, id))?)
    }

    /// Fetch a chain or fail with `UnknownChain`; the precondition every
    /// chain-scoped operation starts with.
    pub fn require_chain(&self, id: &ChainId) -> Result<ChainInfo, RegistryError> {
        self.chain(id)?
            .ok_or_else(|| RegistryError::UnknownChain(id.clone()))
    }

    pub fn chains(&self) -> Result<Vec<ChainInfo>, RegistryError> {
        let entries: Vec<(Vec<u8>, ChainInfo)> =
            self.store.iter_prefix(&[keyspace::CHAIN_INFO])?;
        Ok(entries.into_iter().map(|(_, info)| info).collect())
    }

    /// Cascading delete of a chain and all of its keyed state.
    ///
    /// Idempotent: removing an unregistered prefix is a no-op, not an error.
    pub fn remove_chain(&self, id: &ChainId) -> Result<(), RegistryError> {
        let mut removed = 0;
        for tag in keyspace::CHAIN_SCOPED {
            removed += self.store.delete_prefix(&chain_prefix(tag, id));
        }
        info!(chain = %id, keys = removed, "removed chain from store");
        Ok(())
    }

    /// Register a bidirectional denom <-> ERC20 mapping for `chain`.
    pub fn register_erc20(
        &self,
        chain: &ChainId,
        denom: impl Into<String>,
        erc20: EthAddress,
        cosmos_originated: bool,
    ) -> Result<(), RegistryError> {
        self.require_chain(chain)?;
        let denom = denom.into();
        let denom_key = entity_key(keyspace::DENOM_TO_ERC20, chain, denom.as_bytes());
        let erc20_key = entity_key(keyspace::ERC20_TO_DENOM, chain, erc20.as_bytes());
        if self.store.contains(&denom_key) || self.store.contains(&erc20_key) {
            return Err(RegistryError::MappingExists {
                chain: chain.clone(),
                denom,
                erc20,
            });
        }
        let mapping = TokenMapping {
            denom,
            erc20,
            cosmos_originated,
        };
        self.store.set(&denom_key, &mapping);
        self.store.set(&erc20_key, &mapping);
        Ok(())
    }

    pub fn denom_to_erc20(
        &self,
        chain: &ChainId,
        denom: &str,
    ) -> Result<TokenMapping, RegistryError> {
        self.store
            .get(&entity_key(keyspace::DENOM_TO_ERC20, chain, denom.as_bytes()))?
            .ok_or_else(|| RegistryError::DenomNotMapped {
                chain: chain.clone(),
                denom: denom.to_string(),
            })
    }

    pub fn erc20_to_denom(
        &self,
        chain: &ChainId,
        erc20: &EthAddress,
    ) -> Result<TokenMapping, RegistryError> {
        self.store
            .get(&entity_key(keyspace::ERC20_TO_DENOM, chain, erc20.as_bytes()))?
            .ok_or_else(|| RegistryError::Erc20NotMapped {
                chain: chain.clone(),
                erc20: *erc20,
            })
    }
}
