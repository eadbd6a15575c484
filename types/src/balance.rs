//! Stake positions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::PendingActionKind;
use crate::amount::Amount;
use crate::target::StakingTarget;
use crate::token::StakeTokenItem;

/// Where a staked amount currently sits in its lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceType {
    Active,
    Locked,
    Warmup,
    Unbonding { until: Option<DateTime<Utc>> },
    Unstaked,
    Rewards,
}

/// Validator reference of a balance.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// Validator known to the current yield info.
    Target(StakingTarget),
    /// The balance names a validator the yield info does not list.
    Disabled { address: String },
    /// The balance has no validator.
    Empty,
}

impl TargetType {
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Target(target) => Some(&target.address),
            Self::Disabled { address } => Some(address),
            Self::Empty => None,
        }
    }
}

/// A pending action the provider allows on a balance, with its settlement token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BalanceAction {
    pub kind: PendingActionKind,
    pub passthrough: String,
}

/// Amount bounds the provider imposes on one pending-action kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionConstraint {
    pub kind: PendingActionKind,
    pub minimum: Option<Amount>,
    pub maximum: Option<Amount>,
}

/// A settled balance as reported by the provider, before reconciliation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawBalance {
    pub item: StakeTokenItem,
    pub amount: Amount,
    pub account_address: Option<String>,
    pub balance_type: BalanceType,
    pub target_address: Option<String>,
    pub actions: Vec<BalanceAction>,
    pub constraints: Option<Vec<ActionConstraint>>,
}

/// One logical stake position after reconciliation.
///
/// Recomputed on every reconciliation pass; never outlives one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StakeBalance {
    pub item: StakeTokenItem,
    pub amount: Amount,
    pub account_address: Option<String>,
    pub balance_type: BalanceType,
    pub target_type: TargetType,
    pub in_progress: bool,
    pub actions: Vec<BalanceAction>,
    pub constraints: Option<Vec<ActionConstraint>>,
}

impl StakeBalance {
    pub fn target_address(&self) -> Option<&str> {
        self.target_type.address()
    }

    /// Passthroughs of every allowed action of `kind` on this balance.
    pub fn passthroughs(&self, kind: PendingActionKind) -> impl Iterator<Item = &str> {
        self.actions
            .iter()
            .filter(move |action| action.kind == kind)
            .map(|action| action.passthrough.as_str())
    }
}
