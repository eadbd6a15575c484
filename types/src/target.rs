//! Validators (staking targets).

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::yield_info::RewardType;

/// Operational status of a validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Active,
    Jailed,
    Deactivating,
    Inactive,
    /// Validator accepts no further delegations.
    Full,
}

/// A staking counterparty. Sourced from yield metadata only; never mutated locally.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StakingTarget {
    pub address: String,
    pub name: String,
    pub preferred: bool,
    pub partner: bool,
    pub icon_url: Option<String>,
    pub reward_type: RewardType,
    pub reward_rate: Amount,
    pub status: TargetStatus,
}
