//! Property tests for the pending-action overlay.

use bigdecimal::Zero;
use proptest::prelude::*;

use stakesync_manager::{build_state, merge_pending_actions, ReconcileInputs};
use stakesync_manager::engine::map_balances;
use stakesync_nullables::test_data;
use stakesync_types::{Amount, BalanceType, PendingAction, PendingActionKind};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_validator() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("v1"), Just("v2"), Just("gone")]
}

fn arb_balance_type() -> impl Strategy<Value = BalanceType> {
    prop_oneof![
        Just(BalanceType::Active),
        Just(BalanceType::Locked),
        Just(BalanceType::Unstaked),
        Just(BalanceType::Rewards),
    ]
}

fn arb_kind() -> impl Strategy<Value = PendingActionKind> {
    prop_oneof![
        Just(PendingActionKind::Stake),
        Just(PendingActionKind::Unstake),
        Just(PendingActionKind::Withdraw),
        Just(PendingActionKind::UnlockLocked),
        Just(PendingActionKind::Vote),
        Just(PendingActionKind::ClaimRewards),
        Just(PendingActionKind::Rebond),
    ]
}

fn arb_action() -> impl Strategy<Value = PendingAction> {
    (arb_kind(), arb_validator(), 1i64..500)
        .prop_map(|(kind, validator, amount)| test_data::pending_action(kind, Some(validator), amount))
}

proptest! {
    /// A pending unstake of `a` against an active balance `B` leaves `max(B - a, 0)`, in progress.
    #[test]
    fn unstake_reduces_matching_balance(held in 0i64..10_000, pending in 1i64..10_000) {
        let yield_info = test_data::yield_info();
        let balances = map_balances(
            vec![test_data::raw_balance("v1", BalanceType::Active, held)],
            &yield_info,
        );
        let actions = [test_data::pending_action(PendingActionKind::Unstake, Some("v1"), pending)];

        let merged = merge_pending_actions(balances, &actions, &yield_info);

        prop_assert_eq!(merged.len(), 1);
        prop_assert!(merged[0].in_progress);
        let expected = if pending <= held { Amount::from(held - pending) } else { Amount::zero() };
        prop_assert_eq!(&merged[0].amount, &expected);
    }

    /// No overlay ever produces a negative amount.
    #[test]
    fn merged_amounts_are_never_negative(
        raw in prop::collection::vec((arb_validator(), arb_balance_type(), 0i64..1_000), 0..6),
        actions in prop::collection::vec(arb_action(), 0..6),
    ) {
        let yield_info = test_data::yield_info();
        let balances = map_balances(
            raw.into_iter()
                .map(|(validator, balance_type, amount)| test_data::raw_balance(validator, balance_type, amount))
                .collect(),
            &yield_info,
        );

        let merged = merge_pending_actions(balances, &actions, &yield_info);

        for balance in &merged {
            prop_assert!(balance.amount >= Amount::zero());
        }
    }

    /// The same provider data always yields the same state.
    #[test]
    fn state_is_a_function_of_inputs(
        raw in prop::collection::vec((arb_validator(), arb_balance_type(), 1i64..1_000), 0..6),
        actions in prop::collection::vec(arb_action(), 0..6),
    ) {
        let inputs = ReconcileInputs {
            balances: raw.into_iter()
                .map(|(validator, balance_type, amount)| test_data::raw_balance(validator, balance_type, amount))
                .collect(),
            yield_info: test_data::yield_info(),
            pending_actions: actions,
        };

        let first = build_state(inputs.clone(), true, None);
        let second = build_state(inputs, true, None);
        prop_assert_eq!(first, second);
    }

    /// Only stake-like actions add positions; everything else keeps the count.
    #[test]
    fn only_stake_like_actions_add_positions(
        raw in prop::collection::vec((arb_validator(), arb_balance_type(), 1i64..1_000), 0..6),
        actions in prop::collection::vec(arb_action(), 0..6),
    ) {
        let yield_info = test_data::yield_info();
        let balances = map_balances(
            raw.into_iter()
                .map(|(validator, balance_type, amount)| test_data::raw_balance(validator, balance_type, amount))
                .collect(),
            &yield_info,
        );
        let before = balances.len();
        let added = actions
            .iter()
            .filter(|a| matches!(a.kind, PendingActionKind::Stake | PendingActionKind::Vote | PendingActionKind::VoteLocked))
            .count();

        let merged = merge_pending_actions(balances, &actions, &yield_info);
        prop_assert_eq!(merged.len(), before + added);
    }
}
