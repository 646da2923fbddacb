use std::sync::Arc;

use tracing::{error, info};

use super::error::AttestationError;
use super::handler::ClaimHandler;
use super::power::ValidatorPowerOracle;
use super::{Attestation, Claim};
use crate::error::Error;
use crate::metrics;
use crate::registry::ChainRegistry;
use crate::state::store::{chain_prefix, entity_key, u64_segment};
use crate::state::{keyspace, ChainId, KeyedStore, ValidatorId};

/// Aggregates claims into attestations and finalizes them in nonce order.
pub struct AttestationEngine {
    store: Arc<KeyedStore>,
    registry: ChainRegistry,
    power: Arc<dyn ValidatorPowerOracle>,
    handler: Arc<dyn ClaimHandler>,
}

impl AttestationEngine {
    pub fn new(
        store: Arc<KeyedStore>,
        registry: ChainRegistry,
        power: Arc<dyn ValidatorPowerOracle>,
        handler: Arc<dyn ClaimHandler>,
    ) -> Self {
        Self {
            store,
            registry,
            power,
            handler,
        }
    }

    /// Record one validator's claim and finalize whatever it makes ready.
    ///
    /// Ordering: a claimer's next accepted nonce is one past its own
    /// watermark; fresh claimers start at the chain's last observed nonce.
    /// Resubmitting the identical claim is a no-op; resubmitting different
    /// content for an already-voted nonce is a conflict. Whenever the next
    /// unobserved nonce accumulates strictly more than 2/3 of the current
    /// bonded power, it is observed, its effect applied once, and the
    /// watermark advanced — cascading through any later nonces that were
    /// already waiting on it.
    pub fn submit_claim(&self, claim: &Claim) -> Result<Attestation, Error> {
        self.registry.require_chain(&claim.chain)?;
        if self.power.power_of(&claim.claimer) == 0 {
            return Err(AttestationError::UnknownValidator {
                claimer: claim.claimer.clone(),
            }
            .into());
        }

        let hash = claim.content_hash();
        let last_observed = self.last_observed_nonce(&claim.chain)?;
        let last_by_claimer = self
            .last_event_nonce_by_validator(&claim.chain, &claim.claimer)?
            .unwrap_or(last_observed);

        if claim.event_nonce <= last_by_claimer {
            // Either a re-vote at the claimer's current watermark or an
            // attempt to rewrite history.
            if let Some(prior) = self.voted_attestation(&claim.chain, claim.event_nonce, &claim.claimer)? {
                if prior.content_hash == hash {
                    return Ok(prior);
                }
                return Err(AttestationError::ConflictingClaim {
                    chain: claim.chain.clone(),
                    nonce: claim.event_nonce,
                    claimer: claim.claimer.clone(),
                }
                .into());
            }
            return Err(AttestationError::NonContiguousNonce {
                chain: claim.chain.clone(),
                expected: last_by_claimer + 1,
                got: claim.event_nonce,
            }
            .into());
        }
        if claim.event_nonce != last_by_claimer + 1 {
            return Err(AttestationError::NonContiguousNonce {
                chain: claim.chain.clone(),
                expected: last_by_claimer + 1,
                got: claim.event_nonce,
            }
            .into());
        }

        let key = attestation_key(&claim.chain, claim.event_nonce, &hash);
        let mut attestation: Attestation = match self.store.get(&key)? {
            Some(existing) => existing,
            None => Attestation::from_claim(claim),
        };
        if !attestation.has_voted(&claim.claimer) {
            attestation.votes.push(claim.claimer.clone());
        }
        self.store.set(&key, &attestation);
        self.store.set(
            &entity_key(
                keyspace::LAST_EVENT_NONCE_BY_VALIDATOR,
                &claim.chain,
                claim.claimer.as_bytes(),
            ),
            &claim.event_nonce,
        );

        self.observe_ready(&claim.chain)?;

        self.store.get::<Attestation>(&key)?.ok_or_else(|| {
            Error::from(crate::state::StateError::Internal(format!(
                "attestation for nonce {} vanished mid-submit",
                claim.event_nonce
            )))
        })
    }

    /// Observe, in nonce order, every attestation whose tallied power now
    /// strictly exceeds 2/3 of the current bonded total.
    ///
    /// Runs after every accepted claim, and may also be called by the host
    /// once per block: bonding changes can push a pending attestation over
    /// the threshold without any new vote. Power is recomputed from the
    /// oracle at application time, not vote time. The effect handler runs
    /// once per observation; a handler failure is logged and dropped — the
    /// attestation stays observed and the watermark still advances, so an
    /// unretryable effect can never wedge the nonce stream.
    pub fn observe_ready(&self, chain: &ChainId) -> Result<(), Error> {
        loop {
            let next = self.last_observed_nonce(chain)? + 1;
            let mut prefix = chain_prefix(keyspace::ATTESTATION, chain);
            prefix.extend_from_slice(&u64_segment(next));
            let candidates: Vec<(Vec<u8>, Attestation)> = self.store.iter_prefix(&prefix)?;

            let total = self.power.total_bonded_power() as u128;
            let ready = candidates.into_iter().find(|(_, att)| {
                !att.observed && self.tallied_power(&att.votes) * 3 > total * 2
            });
            let Some((key, mut attestation)) = ready else {
                return Ok(());
            };

            attestation.observed = true;
            self.store.set(&key, &attestation);
            self.store
                .set(&chain_prefix(keyspace::LAST_OBSERVED_NONCE, chain), &next);
            self.store.set(
                &chain_prefix(keyspace::LAST_OBSERVED_HEIGHT, chain),
                &attestation.eth_block_height,
            );
            metrics::attestation_observed(chain);
            info!(
                chain = %chain,
                nonce = next,
                content_hash = %hex::encode(attestation.content_hash),
                "attestation observed"
            );

            if let Err(err) = self.handler.apply(chain, &attestation) {
                // The nonce stream must keep moving; the effect is not
                // retryable and the observation itself is already final.
                error!(
                    chain = %chain,
                    nonce = next,
                    %err,
                    "claim effect failed; attestation stays observed"
                );
            }
        }
    }

    fn tallied_power(&self, votes: &[ValidatorId]) -> u128 {
        votes
            .iter()
            .map(|v| self.power.power_of(v) as u128)
            .sum()
    }

    /// The attestation at `nonce` this validator has voted on, if any.
    fn voted_attestation(
        &self,
        chain: &ChainId,
        nonce: u64,
        claimer: &ValidatorId,
    ) -> Result<Option<Attestation>, AttestationError> {
        let mut prefix = chain_prefix(keyspace::ATTESTATION, chain);
        prefix.extend_from_slice(&u64_segment(nonce));
        let candidates: Vec<(Vec<u8>, Attestation)> = self.store.iter_prefix(&prefix)?;
        Ok(candidates
            .into_iter()
            .map(|(_, att)| att)
            .find(|att| att.has_voted(claimer)))
    }

    /// Gapless progress marker: the highest observed event nonce for `chain`.
    pub fn last_observed_nonce(&self, chain: &ChainId) -> Result<u64, AttestationError> {
        Ok(self
            .store
            .get(&chain_prefix(keyspace::LAST_OBSERVED_NONCE, chain))?
            .unwrap_or(0))
    }

    /// External block height recorded by the latest observation.
    pub fn last_observed_height(&self, chain: &ChainId) -> Result<u64, AttestationError> {
        Ok(self
            .store
            .get(&chain_prefix(keyspace::LAST_OBSERVED_HEIGHT, chain))?
            .unwrap_or(0))
    }

    pub fn last_event_nonce_by_validator(
        &self,
        chain: &ChainId,
        validator: &ValidatorId,
    ) -> Result<Option<u64>, AttestationError> {
        Ok(self.store.get(&entity_key(
            keyspace::LAST_EVENT_NONCE_BY_VALIDATOR,
            chain,
            validator.as_bytes(),
        ))?)
    }

    pub fn attestation(
        &self,
        chain: &ChainId,
        nonce: u64,
        content_hash: &[u8; 32],
    ) -> Result<Option<Attestation>, AttestationError> {
        Ok(self
            .store
            .get(&attestation_key(chain, nonce, content_hash))?)
    }

    /// All attestations for `chain`, nonce-ascending.
    pub fn attestations(&self, chain: &ChainId) -> Result<Vec<Attestation>, AttestationError> {
        let entries: Vec<(Vec<u8>, Attestation)> = self
            .store
            .iter_prefix(&chain_prefix(keyspace::ATTESTATION, chain))?;
        Ok(entries.into_iter().map(|(_, att)| att).collect())
    }
}

fn attestation_key(chain: &ChainId, nonce: u64, content_hash: &[u8; 32]) -> Vec<u8> {
    let mut entity = Vec::with_capacity(8 + 32);
    entity.extend_from_slice(&u64_segment(nonce));
    entity.extend_from_slice(content_hash);
    entity_key(keyspace::ATTESTATION, chain, &entity)
}
