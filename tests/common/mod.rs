#![allow(dead_code)]

use std::sync::Arc;

use mockall::mock;

use causeway_protocol::attestation::{
    BridgeClaimHandler, Claim, ClaimPayload, StaticPowerTable,
};
use causeway_protocol::config::BridgeParams;
use causeway_protocol::ledger::{InMemoryLedger, Ledger, LedgerError};
use causeway_protocol::outgoing::{BatchBuilder, ConfirmationTracker, OutgoingTxPool};
use causeway_protocol::registry::ChainRegistry;
use causeway_protocol::routing::InboundRouter;
use causeway_protocol::state::{
    AccountId, ChainId, ChainInfo, Coin, Erc20Token, EthAddress, KeyedStore, ValidatorId,
};
use causeway_protocol::AttestationEngine;

pub const CHAIN: &str = "evm0";
pub const TOKEN_CONTRACT: &str = "0x429881672B9AE42b8EbA0E26cD9C73711b891Ca5";
pub const DEST_ADDR: &str = "0xd041c41EA1bf0F006ADBb6d2c9ef9D425dE5eaD7";
/// Voucher denomination for the default eth-originated test token.
pub const DENOM: &str = "causeway0x429881672b9ae42b8eba0e26cd9c73711b891ca5";

pub fn chain_id() -> ChainId {
    ChainId::new(CHAIN)
}

pub fn token_contract() -> EthAddress {
    EthAddress::parse(TOKEN_CONTRACT).expect("valid test contract")
}

pub fn dest_addr() -> EthAddress {
    EthAddress::parse(DEST_ADDR).expect("valid test destination")
}

pub fn acct(name: &str) -> AccountId {
    AccountId::new(name)
}

pub fn val(name: &str) -> ValidatorId {
    ValidatorId::new(name)
}

pub fn coin(amount: u128) -> Coin {
    Coin::new(DENOM, amount)
}

/// Fully wired settlement core over an in-memory store and ledger, with the
/// default test chain registered and the default token mapped as an
/// eth-originated voucher.
pub struct TestBridge {
    pub store: Arc<KeyedStore>,
    pub registry: ChainRegistry,
    pub power: Arc<StaticPowerTable>,
    pub ledger: Arc<InMemoryLedger>,
    pub engine: AttestationEngine,
    pub pool: OutgoingTxPool,
    pub batches: BatchBuilder,
    pub confirmations: ConfirmationTracker,
    pub router: InboundRouter,
}

pub fn test_bridge() -> TestBridge {
    test_bridge_with_params(BridgeParams::default())
}

pub fn test_bridge_with_params(params: BridgeParams) -> TestBridge {
    let store = Arc::new(KeyedStore::new());
    let registry = ChainRegistry::new(store.clone());
    let power = Arc::new(StaticPowerTable::new());
    let ledger = Arc::new(InMemoryLedger::new());

    let pool = OutgoingTxPool::new(
        store.clone(),
        registry.clone(),
        ledger.clone(),
        params.clone(),
    );
    let batches = BatchBuilder::new(store.clone(), registry.clone(), params);
    let confirmations = ConfirmationTracker::new(store.clone(), registry.clone());
    let handler = Arc::new(BridgeClaimHandler::new(
        registry.clone(),
        ledger.clone(),
        batches.clone(),
    ));
    let engine = AttestationEngine::new(store.clone(), registry.clone(), power.clone(), handler);
    let router = InboundRouter::new(pool.clone(), ledger.clone());

    registry.set_chain(ChainInfo::new(CHAIN, "Test EVM Chain"));
    registry
        .register_erc20(&chain_id(), DENOM, token_contract(), false)
        .expect("default token mapping");

    TestBridge {
        store,
        registry,
        power,
        ledger,
        engine,
        pool,
        batches,
        confirmations,
        router,
    }
}

impl TestBridge {
    /// Mint spendable voucher balance for `account`.
    pub fn fund(&self, account: &AccountId, amount: u128) {
        self.ledger
            .mint_to(account, &coin(amount))
            .expect("test funding");
    }

    /// Fund `sender` and queue a transfer of `amount` with `fee`.
    pub fn seed_pool_entry(&self, sender: &str, amount: u128, fee: u128) -> u64 {
        let sender = acct(sender);
        self.fund(&sender, amount + fee);
        self.pool
            .add(&chain_id(), &sender, &dest_addr(), &coin(amount), &coin(fee))
            .expect("seed pool entry")
    }
}

pub fn deposit_claim(nonce: u64, claimer: &str, amount: u128, receiver: &str) -> Claim {
    Claim {
        chain: chain_id(),
        event_nonce: nonce,
        eth_block_height: 100 + nonce,
        claimer: val(claimer),
        payload: ClaimPayload::Deposit {
            token: Erc20Token::new(token_contract(), amount),
            ethereum_sender: dest_addr(),
            receiver: acct(receiver),
        },
    }
}

pub fn batch_executed_claim(nonce: u64, claimer: &str, batch_nonce: u64) -> Claim {
    Claim {
        chain: chain_id(),
        event_nonce: nonce,
        eth_block_height: 100 + nonce,
        claimer: val(claimer),
        payload: ClaimPayload::BatchExecuted {
            batch_nonce,
            token_contract: token_contract(),
        },
    }
}

mock! {
    /// Ledger double for failure-injection tests.
    pub FlakyLedger {}

    impl Ledger for FlakyLedger {
        fn mint_to(&self, account: &AccountId, coin: &Coin) -> Result<(), LedgerError>;
        fn transfer(&self, from: &AccountId, to: &AccountId, coin: &Coin) -> Result<(), LedgerError>;
        fn burn_from(&self, account: &AccountId, coin: &Coin) -> Result<(), LedgerError>;
        fn is_module_account(&self, account: &AccountId) -> bool;
    }
}
