use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::denom::received_coin;
use super::error::RoutingError;
use super::memo::{parse_routing_instruction, RoutingInstruction};
use crate::error::Error;
use crate::ledger::Ledger;
use crate::outgoing::OutgoingTxPool;
use crate::state::{AccountId, Coin};

/// The slice of an inbound transfer the router needs: channel identifiers
/// for denomination tracing plus the already-unpacked transfer fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferPacket {
    pub source_port: String,
    pub source_channel: String,
    pub dest_port: String,
    pub dest_channel: String,
    pub denom: String,
    pub amount: String,
    pub receiver: String,
    pub memo: String,
}

/// Outcome handed back to the interchain-transfer boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    /// Not ours: continue with the next layer of the middleware stack.
    PassThrough,
    /// Routed into the outgoing pool; `tx_id` is the assigned pool id.
    Success { tx_id: u64 },
    /// Routing failed; the reason travels back so the counterparty refunds.
    Error(String),
}

impl Acknowledgement {
    pub fn is_success(&self) -> bool {
        !matches!(self, Acknowledgement::Error(_))
    }
}

/// Converts routed inbound transfers into outgoing-pool entries.
pub struct InboundRouter {
    pool: OutgoingTxPool,
    ledger: Arc<dyn Ledger>,
}

impl InboundRouter {
    pub fn new(pool: OutgoingTxPool, ledger: Arc<dyn Ledger>) -> Self {
        Self { pool, ledger }
    }

    /// Receive callback for the transfer middleware. Runs after the
    /// transfer itself has credited the receiver, so on the routed path the
    /// receiver becomes the sender of the outgoing transfer.
    pub fn on_transfer_received(&self, packet: &TransferPacket) -> Acknowledgement {
        let instruction = match parse_routing_instruction(&packet.memo) {
            Ok(Some(instruction)) => instruction,
            Ok(None) => return Acknowledgement::PassThrough,
            Err(err) => return Acknowledgement::Error(err.to_string()),
        };
        match self.route(packet, &instruction) {
            Ok(tx_id) => {
                info!(
                    chain = %instruction.evm_chain_prefix,
                    dest = %instruction.eth_dest,
                    tx_id,
                    "inbound transfer routed to outgoing pool"
                );
                Acknowledgement::Success { tx_id }
            }
            Err(err) => Acknowledgement::Error(err.to_string()),
        }
    }

    fn route(
        &self,
        packet: &TransferPacket,
        instruction: &RoutingInstruction,
    ) -> Result<u64, Error> {
        let sender = AccountId::new(packet.receiver.clone());
        if self.ledger.is_module_account(&sender) {
            return Err(RoutingError::ModuleAccountRecipient.into());
        }

        let received: u128 = packet
            .amount
            .parse()
            .map_err(|_| RoutingError::InvalidAmount(packet.amount.clone()))?;
        let coin = received_coin(
            &packet.source_port,
            &packet.source_channel,
            &packet.dest_port,
            &packet.dest_channel,
            &packet.denom,
            received,
        );

        if instruction.amount > coin.amount {
            return Err(RoutingError::AmountExceedsReceived {
                requested: instruction.amount,
                received: coin.amount,
            }
            .into());
        }
        let fee = coin.amount - instruction.amount;

        self.pool.add(
            &instruction.evm_chain_prefix,
            &sender,
            &instruction.eth_dest,
            &Coin::new(coin.denom.clone(), instruction.amount),
            &Coin::new(coin.denom, fee),
        )
    }
}
