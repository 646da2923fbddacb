//! Inbound interchain transfers carrying a `send_to_eth` instruction are
//! auto-routed into the outgoing pool; everything else passes through, and
//! malformed instructions bounce with an error acknowledgement so the
//! counterparty refunds.

use causeway_protocol::ledger::Ledger;
use causeway_protocol::routing::{Acknowledgement, TransferPacket};
use causeway_protocol::state::{AccountId, Coin};
use pretty_assertions::assert_eq;
use test_log::test;

use crate::common::{acct, chain_id, test_bridge, TestBridge, DEST_ADDR};

const RAW_DENOM: &str = "ethereum0x429881672b9ae42b8eba0e26cd9c73711b891ca5";

/// The voucher denomination the transfer resolves to on this side.
fn ibc_denom() -> String {
    causeway_protocol::routing::denom::hashed_denom(&format!("transfer/channel-1/{RAW_DENOM}"))
}

fn packet(total: &str, memo_amount: &str) -> TransferPacket {
    TransferPacket {
        source_port: "transfer".into(),
        source_channel: "channel-0".into(),
        dest_port: "transfer".into(),
        dest_channel: "channel-1".into(),
        denom: RAW_DENOM.into(),
        amount: total.into(),
        receiver: "gravity-receiver".into(),
        memo: format!(
            r#"{{"send_to_eth":{{"evm_chain_prefix":"evm0","eth_dest":"{DEST_ADDR}","amount":"{memo_amount}"}}}}"#
        ),
    }
}

/// Register the voucher mapping and credit the receiver as the transfer
/// middleware would have before the routing callback runs.
fn routed_bridge(received: u128) -> TestBridge {
    let bridge = test_bridge();
    bridge
        .registry
        .register_erc20(&chain_id(), ibc_denom(), ibc_token_contract(), true)
        .unwrap();
    bridge
        .ledger
        .mint_to(
            &AccountId::new("gravity-receiver"),
            &Coin::new(ibc_denom(), received),
        )
        .unwrap();
    bridge
}

fn ibc_token_contract() -> causeway_protocol::state::EthAddress {
    causeway_protocol::state::EthAddress::parse("0x0000000000000000000000000000000000000042")
        .unwrap()
}

#[test]
fn routed_transfer_lands_in_pool_with_bridge_fee() {
    let bridge = routed_bridge(110);

    let ack = bridge.router.on_transfer_received(&packet("110", "100"));
    assert_eq!(ack, Acknowledgement::Success { tx_id: 1 });

    let entries = bridge.pool.entries(&chain_id()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].sender, acct("gravity-receiver"));
    assert_eq!(entries[0].erc20_token.amount, 100);
    assert_eq!(entries[0].erc20_fee.amount, 10, "fee is the surplus");
    assert_eq!(entries[0].erc20_token.contract, ibc_token_contract());
}

#[test]
fn zero_surplus_means_zero_fee() {
    let bridge = routed_bridge(100);

    let ack = bridge.router.on_transfer_received(&packet("100", "100"));
    assert!(ack.is_success());

    let entries = bridge.pool.entries(&chain_id()).unwrap();
    assert_eq!(entries[0].erc20_fee.amount, 0);
}

#[test]
fn negative_amount_bounces_without_touching_the_pool() {
    let bridge = routed_bridge(100);

    let ack = bridge.router.on_transfer_received(&packet("100", "-5"));
    assert!(matches!(ack, Acknowledgement::Error(_)));
    assert!(bridge.pool.entries(&chain_id()).unwrap().is_empty());
    assert_eq!(
        bridge
            .ledger
            .balance_of(&AccountId::new("gravity-receiver"), &ibc_denom()),
        100,
        "nothing escrowed on a bounced transfer"
    );
}

#[test]
fn requesting_more_than_received_bounces() {
    let bridge = routed_bridge(90);

    let ack = bridge.router.on_transfer_received(&packet("90", "100"));
    assert!(matches!(ack, Acknowledgement::Error(_)));
    assert!(bridge.pool.entries(&chain_id()).unwrap().is_empty());
}

#[test]
fn module_account_receiver_bounces() {
    let bridge = routed_bridge(100);
    bridge
        .ledger
        .mark_module_account(AccountId::new("gravity-receiver"));

    let ack = bridge.router.on_transfer_received(&packet("100", "100"));
    assert!(matches!(ack, Acknowledgement::Error(_)));
}

#[test]
fn unmapped_denom_bounces() {
    // No voucher mapping registered for the incoming denomination.
    let bridge = test_bridge();
    bridge
        .ledger
        .mint_to(
            &AccountId::new("gravity-receiver"),
            &Coin::new(ibc_denom(), 100),
        )
        .unwrap();

    let ack = bridge.router.on_transfer_received(&packet("100", "100"));
    assert!(matches!(ack, Acknowledgement::Error(_)));
}

#[test]
fn memo_without_routing_key_passes_through() {
    let bridge = routed_bridge(100);
    let mut plain = packet("100", "100");
    plain.memo = String::new();

    let ack = bridge.router.on_transfer_received(&plain);
    assert_eq!(ack, Acknowledgement::PassThrough);
    assert!(bridge.pool.entries(&chain_id()).unwrap().is_empty());

    // A routed pool entry is immediately batchable, like any direct one.
    let ack = bridge.router.on_transfer_received(&packet("100", "60"));
    assert!(ack.is_success());
    let batch = bridge
        .batches
        .build_batch(&chain_id(), &ibc_token_contract(), 1, 500)
        .unwrap();
    assert_eq!(batch.transactions[0].erc20_token.amount, 60);
}
