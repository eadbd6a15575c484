//! Pending-action overlay.
//!
//! Adjusts the provider's settled balances so that actions already accepted
//! but not yet settled show up immediately. The overlay is a pure function of
//! its inputs; nothing survives between passes.

use bigdecimal::Zero;

use stakesync_types::{
    Amount, BalanceType, PendingAction, PendingActionKind, StakeBalance, TargetType, YieldInfo,
};

/// Apply every pending action, in order, to `balances`.
///
/// Settled balances keep one position per (token, validator, type, account).
/// Stake and vote actions are the exception: they append an in-progress
/// active position even when a settled active one with the same key exists,
/// and the two differ only in `in_progress`.
pub fn merge_pending_actions(
    mut balances: Vec<StakeBalance>,
    actions: &[PendingAction],
    yield_info: &YieldInfo,
) -> Vec<StakeBalance> {
    for action in actions {
        match action.kind {
            PendingActionKind::Stake | PendingActionKind::Vote | PendingActionKind::VoteLocked => {
                balances.push(in_flight_balance(action, yield_info));
            }
            PendingActionKind::Withdraw => {
                mark_in_progress(&mut balances, action, |t| *t == BalanceType::Unstaked, false);
            }
            PendingActionKind::UnlockLocked => {
                mark_in_progress(&mut balances, action, |t| *t == BalanceType::Locked, false);
            }
            PendingActionKind::Unstake => {
                mark_in_progress(&mut balances, action, |t| *t == BalanceType::Active, true);
            }
            PendingActionKind::ClaimRewards
            | PendingActionKind::RestakeRewards
            | PendingActionKind::Restake
            | PendingActionKind::Rebond
            | PendingActionKind::ClaimUnstaked => {}
        }
    }
    balances
}

/// Synthetic active balance for stake-like actions still in flight.
fn in_flight_balance(action: &PendingAction, yield_info: &YieldInfo) -> StakeBalance {
    let target_type = action
        .target_address
        .as_deref()
        .and_then(|address| yield_info.target(address))
        .map(|target| TargetType::Target(target.clone()))
        .unwrap_or(TargetType::Empty);

    StakeBalance {
        item: yield_info.item.clone(),
        amount: action.amount.clone(),
        account_address: action
            .account_addresses
            .as_ref()
            .and_then(|accounts| accounts.first().cloned()),
        balance_type: BalanceType::Active,
        target_type,
        in_progress: true,
        actions: Vec::new(),
        constraints: None,
    }
}

/// Flag the first settled balance the action applies to. No match: the action is dropped.
fn mark_in_progress(
    balances: &mut [StakeBalance],
    action: &PendingAction,
    type_matches: impl Fn(&BalanceType) -> bool,
    reduce_amount: bool,
) {
    let found = balances.iter_mut().find(|balance| {
        !balance.in_progress
            && type_matches(&balance.balance_type)
            && balance.target_address() == action.target_address.as_deref()
            && action.applies_to_account(balance.account_address.as_deref())
    });

    let Some(balance) = found else {
        tracing::debug!(action = %action.id, kind = %action.kind, "pending action matched no balance");
        return;
    };

    balance.in_progress = true;
    if reduce_amount {
        balance.amount = saturating_sub(&balance.amount, &action.amount);
    }
}

fn saturating_sub(amount: &Amount, reduction: &Amount) -> Amount {
    let remaining = amount - reduction;
    if remaining < Amount::zero() {
        Amount::zero()
    } else {
        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakesync_types::{
        ActionStatus, Period, RewardClaimingType, RewardRateValues, RewardScheduleType,
        RewardType, StakeTokenItem, StakingNetwork, StakingTarget, TargetStatus,
    };

    fn item() -> StakeTokenItem {
        StakeTokenItem {
            network: StakingNetwork::Solana,
            contract_address: None,
            name: "Solana".into(),
            decimals: 9,
            symbol: "SOL".into(),
        }
    }

    fn target(address: &str) -> StakingTarget {
        StakingTarget {
            address: address.into(),
            name: address.to_uppercase(),
            preferred: true,
            partner: false,
            icon_url: None,
            reward_type: RewardType::Apr,
            reward_rate: Amount::from(7),
            status: TargetStatus::Active,
        }
    }

    fn yield_info() -> YieldInfo {
        YieldInfo {
            id: "solana-sol-native-multivalidator-staking".into(),
            is_available: true,
            reward_type: RewardType::Apr,
            reward_rate_values: RewardRateValues::Single(Amount::from(7)),
            enter_minimum_requirement: Amount::zero(),
            exit_minimum_requirement: Amount::zero(),
            targets: vec![target("v1"), target("v2")],
            preferred_targets: vec![target("v1")],
            item: item(),
            unbonding_period: Period { days: 3 },
            warmup_period: Period { days: 0 },
            reward_claiming_type: RewardClaimingType::Auto,
            reward_schedule_type: RewardScheduleType::Days { min: 2, max: 3 },
            maximum_stake_amount: None,
        }
    }

    fn balance(validator: &str, balance_type: BalanceType, amount: i64) -> StakeBalance {
        StakeBalance {
            item: item(),
            amount: Amount::from(amount),
            account_address: None,
            balance_type,
            target_type: TargetType::Target(target(validator)),
            in_progress: false,
            actions: Vec::new(),
            constraints: None,
        }
    }

    fn pending(kind: PendingActionKind, validator: Option<&str>, amount: i64) -> PendingAction {
        PendingAction {
            id: format!("{kind}-{amount}"),
            account_addresses: None,
            status: ActionStatus::Processing,
            amount: Amount::from(amount),
            kind,
            current_step_index: 0,
            transactions: Vec::new(),
            target_address: validator.map(str::to_string),
        }
    }

    #[test]
    fn unstake_reduces_active_balance() {
        let merged = merge_pending_actions(
            vec![balance("v1", BalanceType::Active, 100)],
            &[pending(PendingActionKind::Unstake, Some("v1"), 30)],
            &yield_info(),
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].amount, Amount::from(70));
        assert!(merged[0].in_progress);
    }

    #[test]
    fn unstake_never_goes_negative() {
        let merged = merge_pending_actions(
            vec![balance("v1", BalanceType::Active, 10)],
            &[pending(PendingActionKind::Unstake, Some("v1"), 30)],
            &yield_info(),
        );
        assert_eq!(merged[0].amount, Amount::zero());
    }

    #[test]
    fn stake_appends_in_flight_balance() {
        let merged = merge_pending_actions(
            vec![balance("v1", BalanceType::Active, 100)],
            &[pending(PendingActionKind::Stake, Some("v2"), 5)],
            &yield_info(),
        );
        assert_eq!(merged.len(), 2);
        let added = &merged[1];
        assert!(added.in_progress);
        assert_eq!(added.balance_type, BalanceType::Active);
        assert_eq!(added.target_address(), Some("v2"));
        assert_eq!(added.amount, Amount::from(5));
    }

    #[test]
    fn stake_to_held_validator_adds_a_second_position() {
        let merged = merge_pending_actions(
            vec![balance("v1", BalanceType::Active, 100)],
            &[pending(PendingActionKind::Stake, Some("v1"), 5)],
            &yield_info(),
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].target_address(), merged[1].target_address());
        assert_eq!(merged[0].balance_type, merged[1].balance_type);
        assert!(!merged[0].in_progress);
        assert_eq!(merged[0].amount, Amount::from(100));
        assert!(merged[1].in_progress);
        assert_eq!(merged[1].amount, Amount::from(5));
    }

    #[test]
    fn vote_to_unknown_validator_has_empty_target() {
        let merged = merge_pending_actions(
            Vec::new(),
            &[pending(PendingActionKind::Vote, Some("unknown"), 5)],
            &yield_info(),
        );
        assert_eq!(merged[0].target_type, TargetType::Empty);
    }

    #[test]
    fn withdraw_marks_unstaked_without_changing_amount() {
        let merged = merge_pending_actions(
            vec![
                balance("v1", BalanceType::Active, 100),
                balance("v1", BalanceType::Unstaked, 20),
            ],
            &[pending(PendingActionKind::Withdraw, Some("v1"), 20)],
            &yield_info(),
        );
        assert!(!merged[0].in_progress);
        assert!(merged[1].in_progress);
        assert_eq!(merged[1].amount, Amount::from(20));
    }

    #[test]
    fn unlock_locked_targets_locked_balance() {
        let merged = merge_pending_actions(
            vec![balance("v1", BalanceType::Locked, 50)],
            &[pending(PendingActionKind::UnlockLocked, Some("v1"), 50)],
            &yield_info(),
        );
        assert!(merged[0].in_progress);
    }

    #[test]
    fn first_match_wins() {
        let merged = merge_pending_actions(
            vec![
                balance("v1", BalanceType::Active, 100),
                balance("v1", BalanceType::Active, 100),
            ],
            &[pending(PendingActionKind::Unstake, Some("v1"), 40)],
            &yield_info(),
        );
        assert_eq!(merged[0].amount, Amount::from(60));
        assert_eq!(merged[1].amount, Amount::from(100));
        assert!(!merged[1].in_progress);
    }

    #[test]
    fn second_unstake_moves_to_next_match() {
        let merged = merge_pending_actions(
            vec![
                balance("v1", BalanceType::Active, 100),
                balance("v1", BalanceType::Active, 80),
            ],
            &[
                pending(PendingActionKind::Unstake, Some("v1"), 40),
                pending(PendingActionKind::Unstake, Some("v1"), 30),
            ],
            &yield_info(),
        );
        assert_eq!(merged[0].amount, Amount::from(60));
        assert_eq!(merged[1].amount, Amount::from(50));
    }

    #[test]
    fn unmatched_action_is_dropped() {
        let balances = vec![balance("v1", BalanceType::Active, 100)];
        let merged = merge_pending_actions(
            balances.clone(),
            &[pending(PendingActionKind::Withdraw, Some("v2"), 10)],
            &yield_info(),
        );
        assert_eq!(merged, balances);
    }

    #[test]
    fn account_membership_is_required_when_listed() {
        let mut held = balance("v1", BalanceType::Active, 100);
        held.account_address = Some("stake-account-1".into());

        let mut other = pending(PendingActionKind::Unstake, Some("v1"), 10);
        other.account_addresses = Some(vec!["stake-account-2".into()]);
        let merged = merge_pending_actions(vec![held.clone()], &[other], &yield_info());
        assert!(!merged[0].in_progress);

        let mut own = pending(PendingActionKind::Unstake, Some("v1"), 10);
        own.account_addresses = Some(vec!["stake-account-1".into()]);
        let merged = merge_pending_actions(vec![held], &[own], &yield_info());
        assert!(merged[0].in_progress);
    }

    #[test]
    fn claim_rewards_has_no_effect() {
        let balances = vec![balance("v1", BalanceType::Rewards, 3)];
        let merged = merge_pending_actions(
            balances.clone(),
            &[pending(PendingActionKind::ClaimRewards, Some("v1"), 3)],
            &yield_info(),
        );
        assert_eq!(merged, balances);
    }

    #[test]
    fn merge_is_idempotent_over_same_inputs() {
        let balances = vec![
            balance("v1", BalanceType::Active, 100),
            balance("v2", BalanceType::Unstaked, 10),
        ];
        let actions = [
            pending(PendingActionKind::Unstake, Some("v1"), 30),
            pending(PendingActionKind::Withdraw, Some("v2"), 10),
            pending(PendingActionKind::Stake, Some("v2"), 1),
        ];
        let first = merge_pending_actions(balances.clone(), &actions, &yield_info());
        let second = merge_pending_actions(balances, &actions, &yield_info());
        assert_eq!(first, second);
    }
}
