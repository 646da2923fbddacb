use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::RoutingError;
use crate::state::{ChainId, EthAddress};

/// Memo key that opts a transfer into auto-forwarding.
pub const ROUTING_KEY: &str = "send_to_eth";

/// A validated routing instruction extracted from a transfer memo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutingInstruction {
    pub evm_chain_prefix: ChainId,
    pub eth_dest: EthAddress,
    pub amount: u128,
}

/// Extract and validate the routing instruction from a transfer memo.
///
/// Returns `Ok(None)` — pass the packet down the stack — when the memo is
/// empty, is not a JSON object, or lacks the `send_to_eth` key: such memos
/// were written for someone else. Once the key is present the instruction
/// must be fully well-formed; any structural defect is an error that
/// short-circuits the transfer so the counterparty can refund.
pub fn parse_routing_instruction(
    memo: &str,
) -> Result<Option<RoutingInstruction>, RoutingError> {
    if memo.is_empty() {
        return Ok(None);
    }
    let parsed: Value = match serde_json::from_str(memo) {
        Ok(value) => value,
        Err(_) => return Ok(None),
    };
    let Some(object) = parsed.as_object() else {
        return Ok(None);
    };
    let Some(raw) = object.get(ROUTING_KEY) else {
        return Ok(None);
    };

    let fields = raw.as_object().ok_or(RoutingError::InstructionNotObject)?;

    let eth_dest = required_string(fields, "eth_dest")?;
    let eth_dest =
        EthAddress::parse(eth_dest).map_err(|e| RoutingError::InvalidDestination {
            value: eth_dest.to_string(),
            reason: e.to_string(),
        })?;

    let amount_raw = required_string(fields, "amount")?;
    let amount: u128 = amount_raw
        .parse()
        .map_err(|_| RoutingError::InvalidAmount(amount_raw.to_string()))?;
    if amount == 0 {
        return Err(RoutingError::InvalidAmount(amount_raw.to_string()));
    }

    let evm_chain_prefix = required_string(fields, "evm_chain_prefix")?;

    Ok(Some(RoutingInstruction {
        evm_chain_prefix: ChainId::new(evm_chain_prefix),
        eth_dest,
        amount,
    }))
}

fn required_string<'a>(
    fields: &'a serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, RoutingError> {
    let value = fields.get(field).ok_or(RoutingError::MissingField(field))?;
    value
        .as_str()
        .ok_or(RoutingError::FieldNotString { field })
}
