use std::collections::HashMap;

use parking_lot::RwLock;

use crate::state::ValidatorId;

/// Bonded-power oracle over the current validator set.
///
/// Power is queried fresh on every vote tally: a validator's bonding or
/// unbonding between votes changes when, and whether, the supermajority
/// threshold is crossed. Zero power means not a current validator.
pub trait ValidatorPowerOracle: Send + Sync {
    fn total_bonded_power(&self) -> u64;

    fn power_of(&self, validator: &ValidatorId) -> u64;
}

/// Table-backed oracle for embedding hosts that track power externally.
#[derive(Debug, Default)]
pub struct StaticPowerTable {
    powers: RwLock<HashMap<ValidatorId, u64>>,
}

impl StaticPowerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a validator's bonded power; zero removes it from the set.
    pub fn set_power(&self, validator: ValidatorId, power: u64) {
        let mut powers = self.powers.write();
        if power == 0 {
            powers.remove(&validator);
        } else {
            powers.insert(validator, power);
        }
    }
}

impl ValidatorPowerOracle for StaticPowerTable {
    fn total_bonded_power(&self) -> u64 {
        self.powers.read().values().sum()
    }

    fn power_of(&self, validator: &ValidatorId) -> u64 {
        self.powers.read().get(validator).copied().unwrap_or(0)
    }
}
