/*!
# Inbound Routing

Middleware adapter for incoming interchain transfers. When a transfer's
memo carries a structured `send_to_eth` routing instruction, the received
asset is converted into an outgoing-pool entry bound for the named external
chain; otherwise the transfer passes through untouched.

Parsing is a pure function over the memo, decoupled from the side-effecting
pool insertion, so structural validation is testable in isolation. A
malformed instruction short-circuits the transfer with an error
acknowledgement — the counterparty chain refunds — rather than being
silently logged.
*/

pub mod denom;
pub mod error;
pub mod memo;
pub mod router;

pub use error::RoutingError;
pub use memo::{parse_routing_instruction, RoutingInstruction};
pub use router::{Acknowledgement, InboundRouter, TransferPacket};
