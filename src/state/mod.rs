pub mod error;
pub mod store;
pub mod types;

pub use error::{ErrorSeverity, StateError};
pub use store::{KeyedStore, keyspace};
pub use types::{AccountId, ChainId, ChainInfo, Coin, Erc20Token, EthAddress, ValidatorId};
