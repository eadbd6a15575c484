//! Product terms of a staking yield.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::target::StakingTarget;
use crate::token::StakeTokenItem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    Apr,
    Apy,
}

/// Reward rate shown for a yield: one figure, or the spread across preferred validators.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardRateValues {
    Single(Amount),
    Interval { min: Amount, max: Amount },
}

impl RewardRateValues {
    /// Build from the per-validator rates, falling back to the yield-wide rate
    /// when no validator reports one.
    pub fn new(rates: &[Amount], fallback: Amount) -> Self {
        match (rates.iter().min(), rates.iter().max()) {
            (Some(min), Some(max)) if min == max => Self::Single(min.clone()),
            (Some(min), Some(max)) => Self::Interval {
                min: min.clone(),
                max: max.clone(),
            },
            _ => Self::Single(fallback),
        }
    }
}

/// A fixed duration in days (unbonding or warm-up).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub days: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardClaimingType {
    Auto,
    Manual,
}

/// How often rewards are paid out.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardScheduleType {
    Seconds { min: u32, max: u32 },
    Days { min: u32, max: u32 },
    Daily,
    /// Cadence as reported by the provider, for networks without a known schedule.
    Generic(String),
}

/// Terms of one yield. Always replaced wholesale, never patched.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YieldInfo {
    pub id: String,
    pub is_available: bool,
    pub reward_type: RewardType,
    pub reward_rate_values: RewardRateValues,
    pub enter_minimum_requirement: Amount,
    pub exit_minimum_requirement: Amount,
    pub targets: Vec<StakingTarget>,
    pub preferred_targets: Vec<StakingTarget>,
    pub item: StakeTokenItem,
    pub unbonding_period: Period,
    pub warmup_period: Period,
    pub reward_claiming_type: RewardClaimingType,
    pub reward_schedule_type: RewardScheduleType,
    pub maximum_stake_amount: Option<Amount>,
}

impl YieldInfo {
    /// Look up a validator by address.
    pub fn target(&self, address: &str) -> Option<&StakingTarget> {
        self.targets.iter().find(|target| target.address == address)
    }
}
