use sha2::{Digest, Sha256};

use crate::state::Coin;

/// The `port/channel/` prefix a sending chain stamps onto a denomination.
pub fn denom_prefix(port: &str, channel: &str) -> String {
    format!("{port}/{channel}/")
}

/// Whether the receiving side is the origin of the transferred token: true
/// when the denomination carries the prefix the sender's channel added.
pub fn receiver_chain_is_source(source_port: &str, source_channel: &str, denom: &str) -> bool {
    denom.starts_with(&denom_prefix(source_port, source_channel))
}

/// The local voucher denomination for a multi-hop trace path.
pub fn hashed_denom(trace: &str) -> String {
    let digest = Sha256::digest(trace.as_bytes());
    format!("ibc/{}", hex::encode_upper(digest))
}

/// Resolve the transferred coin as seen from the receiving chain.
///
/// If the receiving chain is the token's origin, the sender's path prefix
/// is stripped; a remaining multi-hop path still resolves to its hashed
/// voucher form. Otherwise the receiving channel's prefix is added and the
/// result is the hashed voucher denomination.
pub fn received_coin(
    source_port: &str,
    source_channel: &str,
    dest_port: &str,
    dest_channel: &str,
    raw_denom: &str,
    amount: u128,
) -> Coin {
    if receiver_chain_is_source(source_port, source_channel, raw_denom) {
        let voucher_prefix = denom_prefix(source_port, source_channel);
        let unprefixed = &raw_denom[voucher_prefix.len()..];
        let denom = if unprefixed.contains('/') {
            hashed_denom(unprefixed)
        } else {
            unprefixed.to_string()
        };
        return Coin::new(denom, amount);
    }

    let prefixed = format!("{}{raw_denom}", denom_prefix(dest_port, dest_channel));
    Coin::new(hashed_denom(&prefixed), amount)
}
