//! Staking actions: provider-side pending actions and user-requested actions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::Amount;

/// Kind of a staking operation, as known to the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PendingActionKind {
    Stake,
    Unstake,
    Withdraw,
    ClaimRewards,
    RestakeRewards,
    Vote,
    VoteLocked,
    UnlockLocked,
    Restake,
    Rebond,
    ClaimUnstaked,
}

impl PendingActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stake => "stake",
            Self::Unstake => "unstake",
            Self::Withdraw => "withdraw",
            Self::ClaimRewards => "claim-rewards",
            Self::RestakeRewards => "restake-rewards",
            Self::Vote => "vote",
            Self::VoteLocked => "vote-locked",
            Self::UnlockLocked => "unlock-locked",
            Self::Restake => "restake",
            Self::Rebond => "rebond",
            Self::ClaimUnstaked => "claim-unstaked",
        }
    }
}

impl fmt::Display for PendingActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-side lifecycle of an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionStatus {
    Created,
    WaitingForNext,
    Processing,
    Failed,
    Success,
}

/// Reference to one transaction step of a provider action.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionTransaction {
    pub id: String,
    pub step_index: u32,
}

/// An operation the provider has accepted but that is not yet settled.
///
/// Disappears from the provider's pending list once settled; nothing local tracks it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: String,
    /// Per-chain accounts the action applies to. `None` means it is not account-scoped.
    pub account_addresses: Option<Vec<String>>,
    pub status: ActionStatus,
    pub amount: Amount,
    pub kind: PendingActionKind,
    pub current_step_index: u32,
    pub transactions: Vec<ActionTransaction>,
    pub target_address: Option<String>,
}

impl PendingAction {
    /// Whether this action applies to a balance held by `account_address`.
    pub fn applies_to_account(&self, account_address: Option<&str>) -> bool {
        match (&self.account_addresses, account_address) {
            (None, _) => true,
            (Some(addresses), Some(account)) => addresses.iter().any(|a| a == account),
            (Some(addresses), None) => addresses.is_empty(),
        }
    }
}

/// The provider's answer to an enter, exit or pending-action submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAction {
    pub id: String,
    pub status: ActionStatus,
    pub amount: Amount,
    pub current_step_index: u32,
    pub transactions: Vec<ActionTransaction>,
}

/// A pending-action request together with the provider passthrough(s) it settles.
///
/// Withdraw and claim-unstaked may settle several positions at once and carry one
/// passthrough per position; every other kind settles exactly one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum PendingActionType {
    ClaimRewards { passthrough: String },
    RestakeRewards { passthrough: String },
    VoteLocked { passthrough: String },
    Vote { passthrough: String },
    UnlockLocked { passthrough: String },
    Rebond { passthrough: String },
    Restake { passthrough: String },
    Stake { passthrough: String },
    Withdraw { passthroughs: Vec<String> },
    ClaimUnstaked { passthroughs: Vec<String> },
}

impl PendingActionType {
    pub fn kind(&self) -> PendingActionKind {
        match self {
            Self::ClaimRewards { .. } => PendingActionKind::ClaimRewards,
            Self::RestakeRewards { .. } => PendingActionKind::RestakeRewards,
            Self::VoteLocked { .. } => PendingActionKind::VoteLocked,
            Self::Vote { .. } => PendingActionKind::Vote,
            Self::UnlockLocked { .. } => PendingActionKind::UnlockLocked,
            Self::Rebond { .. } => PendingActionKind::Rebond,
            Self::Restake { .. } => PendingActionKind::Restake,
            Self::Stake { .. } => PendingActionKind::Stake,
            Self::Withdraw { .. } => PendingActionKind::Withdraw,
            Self::ClaimUnstaked { .. } => PendingActionKind::ClaimUnstaked,
        }
    }
}

/// What the user asked for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StakingActionType {
    Stake,
    Unstake,
    Pending(PendingActionType),
}

impl fmt::Display for StakingActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stake => f.write_str("stake"),
            Self::Unstake => f.write_str("unstake"),
            Self::Pending(pending) => write!(f, "pending({})", pending.kind()),
        }
    }
}

/// A requested staking action: kind, amount and optional validator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StakingAction {
    pub amount: Amount,
    pub target_address: Option<String>,
    pub action_type: StakingActionType,
}

impl fmt::Display for StakingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action_type, self.amount)?;
        if let Some(target) = &self.target_address {
            write!(f, " -> {target}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(accounts: Option<Vec<&str>>) -> PendingAction {
        PendingAction {
            id: "a1".into(),
            account_addresses: accounts.map(|v| v.into_iter().map(String::from).collect()),
            status: ActionStatus::Processing,
            amount: Amount::from(1),
            kind: PendingActionKind::Withdraw,
            current_step_index: 0,
            transactions: Vec::new(),
            target_address: None,
        }
    }

    #[test]
    fn unscoped_action_applies_everywhere() {
        assert!(action(None).applies_to_account(Some("acc")));
        assert!(action(None).applies_to_account(None));
    }

    #[test]
    fn scoped_action_requires_membership() {
        let scoped = action(Some(vec!["acc1", "acc2"]));
        assert!(scoped.applies_to_account(Some("acc2")));
        assert!(!scoped.applies_to_account(Some("acc3")));
        assert!(!scoped.applies_to_account(None));
    }

    #[test]
    fn action_type_display_names_pending_kind() {
        let ty = StakingActionType::Pending(PendingActionType::Withdraw {
            passthroughs: vec!["p".into()],
        });
        assert_eq!(ty.to_string(), "pending(withdraw)");
    }
}
