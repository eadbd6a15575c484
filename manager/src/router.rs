//! Action router: state-gated dispatch of fee estimates and transaction builds.

use futures_util::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;

use stakesync_provider::StakingProvider;
use stakesync_types::{
    sum_amounts, ActionGenericRequest, Amount, PendingActionKind, PendingActionRequest,
    PendingActionType, ProviderAction, StakingAction, StakingActionType, StakingNetwork,
    StakingWallet, TransactionPayload, TransactionStep,
};

use crate::error::StakingManagerError;
use crate::state::{StakingManagerState, StateMachine};

/// Tron resource the provider should consume for staking transactions.
const TRON_RESOURCE: &str = "ENERGY";

/// Provider flow an action resolves to in a given state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow<'a> {
    Enter,
    Exit,
    Pending(&'a PendingActionType),
}

/// Passthroughs a pending action settles.
enum Passthroughs<'a> {
    Single(&'a str),
    Multiple(&'a [String]),
}

impl<'a> Passthroughs<'a> {
    fn of(action: &'a PendingActionType) -> Self {
        match action {
            PendingActionType::ClaimRewards { passthrough }
            | PendingActionType::RestakeRewards { passthrough }
            | PendingActionType::VoteLocked { passthrough }
            | PendingActionType::Vote { passthrough }
            | PendingActionType::UnlockLocked { passthrough }
            | PendingActionType::Rebond { passthrough }
            | PendingActionType::Restake { passthrough }
            | PendingActionType::Stake { passthrough } => Self::Single(passthrough),
            PendingActionType::Withdraw { passthroughs }
            | PendingActionType::ClaimUnstaked { passthroughs } => Self::Multiple(passthroughs),
        }
    }
}

pub struct ActionRouter {
    provider: Arc<dyn StakingProvider>,
    wallet: StakingWallet,
    settle_delay: Duration,
}

impl ActionRouter {
    pub fn new(
        provider: Arc<dyn StakingProvider>,
        wallet: StakingWallet,
        settle_delay: Duration,
    ) -> Self {
        Self {
            provider,
            wallet,
            settle_delay,
        }
    }

    /// Estimate the network fee of `action` in the current state.
    pub async fn estimate_fee(
        &self,
        states: &StateMachine,
        action: &StakingAction,
    ) -> Result<Amount, StakingManagerError> {
        let state = states.settled().await?;
        let (flow, integration_id) = route(&state, &action.action_type)?;
        tracing::info!(%action, state = %state.kind(), "estimating fee");

        let request = self.request(action, integration_id);
        let fee = match flow {
            Flow::Enter => self.provider.estimate_enter_fee(&request).await?,
            Flow::Exit => self.provider.estimate_exit_fee(&request).await?,
            Flow::Pending(pending) => match Passthroughs::of(pending) {
                Passthroughs::Single(passthrough) => {
                    let request = pending_request(&request, passthrough, pending.kind());
                    self.provider.estimate_pending_fee(&request).await?
                }
                Passthroughs::Multiple(passthroughs) => {
                    let passthroughs = non_empty(passthroughs, pending.kind())?;
                    let mut fees = Vec::with_capacity(passthroughs.len());
                    for passthrough in passthroughs {
                        let request = pending_request(&request, passthrough, pending.kind());
                        fees.push(self.provider.estimate_pending_fee(&request).await?);
                    }
                    sum_amounts(&fees)
                }
            },
        };
        Ok(fee)
    }

    /// Build the unsigned transaction payload for `action` in the current state.
    pub async fn build_transaction(
        &self,
        states: &StateMachine,
        action: &StakingAction,
    ) -> Result<TransactionPayload, StakingManagerError> {
        let state = states.settled().await?;
        let (flow, integration_id) = route(&state, &action.action_type)?;
        tracing::info!(%action, state = %state.kind(), "building transaction");

        let request = self.request(action, integration_id);
        match flow {
            Flow::Enter => {
                let submitted = self.provider.submit_enter(&request).await?;
                self.payload(submitted, &request).await
            }
            Flow::Exit => {
                let submitted = self.provider.submit_exit(&request).await?;
                self.payload(submitted, &request).await
            }
            Flow::Pending(pending) => match Passthroughs::of(pending) {
                Passthroughs::Single(passthrough) => {
                    let request = pending_request(&request, passthrough, pending.kind());
                    let submitted = self.provider.submit_pending(&request).await?;
                    self.payload(submitted, &request.request).await
                }
                Passthroughs::Multiple(passthroughs) => {
                    let passthroughs = non_empty(passthroughs, pending.kind())?;
                    let payloads = try_join_all(passthroughs.iter().map(|passthrough| {
                        let request = pending_request(&request, passthrough, pending.kind());
                        async move {
                            let submitted = self.provider.submit_pending(&request).await?;
                            self.payload(submitted, &request.request).await
                        }
                    }))
                    .await?;

                    Ok(TransactionPayload {
                        action_id: None,
                        amount: request.amount.clone(),
                        target: request.target.clone(),
                        steps: payloads.into_iter().flat_map(|p| p.steps).collect(),
                    })
                }
            },
        }
    }

    /// Wait out the settle delay, then patch every step of `submitted` in order.
    async fn payload(
        &self,
        submitted: ProviderAction,
        request: &ActionGenericRequest,
    ) -> Result<TransactionPayload, StakingManagerError> {
        // The provider needs time to prepare transaction data after accepting an action.
        tokio::time::sleep(self.settle_delay).await;

        let mut steps: Vec<TransactionStep> = Vec::with_capacity(submitted.transactions.len());
        for transaction in &submitted.transactions {
            tracing::debug!(
                action = %submitted.id,
                step = transaction.step_index,
                "patching transaction step"
            );
            steps.push(self.provider.patch_transaction_step(&transaction.id).await?);
        }

        Ok(TransactionPayload {
            action_id: Some(submitted.id),
            amount: submitted.amount,
            target: request.target.clone(),
            steps,
        })
    }

    fn request(&self, action: &StakingAction, integration_id: &str) -> ActionGenericRequest {
        let network = self.wallet.item.network;
        ActionGenericRequest {
            amount: action.amount.clone(),
            address: self.wallet.address.clone(),
            additional_addresses: if network.needs_cosmos_pub_key() {
                self.wallet.additional_addresses.clone()
            } else {
                None
            },
            token: self.wallet.item.clone(),
            target: action.target_address.clone(),
            integration_id: integration_id.to_string(),
            tron_resource: (network == StakingNetwork::Tron).then(|| TRON_RESOURCE.to_string()),
        }
    }
}

/// Dispatch table: which flow serves `action` in `state`, and for which yield.
fn route<'a>(
    state: &'a StakingManagerState,
    action: &'a StakingActionType,
) -> Result<(Flow<'a>, &'a str), StakingManagerError> {
    let illegal = || StakingManagerError::IllegalAction {
        action: action.clone(),
        state: state.kind(),
    };

    match state {
        StakingManagerState::AvailableToStake { yield_info } => match action {
            StakingActionType::Stake => Ok((Flow::Enter, &yield_info.id)),
            StakingActionType::Unstake | StakingActionType::Pending(_) => Err(illegal()),
        },
        StakingManagerState::Staked { yield_info, .. } => match action {
            StakingActionType::Stake => Ok((Flow::Enter, &yield_info.id)),
            StakingActionType::Unstake => Ok((Flow::Exit, &yield_info.id)),
            StakingActionType::Pending(pending) => Ok((Flow::Pending(pending), &yield_info.id)),
        },
        StakingManagerState::Loading { .. } => Err(StakingManagerError::StillLoading),
        StakingManagerState::NotEnabled
        | StakingManagerState::LoadingError { .. }
        | StakingManagerState::TemporaryUnavailable { .. } => Err(illegal()),
    }
}

fn pending_request(
    request: &ActionGenericRequest,
    passthrough: &str,
    kind: PendingActionKind,
) -> PendingActionRequest {
    PendingActionRequest {
        request: request.clone(),
        passthrough: passthrough.to_string(),
        kind,
    }
}

fn non_empty(
    passthroughs: &[String],
    kind: PendingActionKind,
) -> Result<&[String], StakingManagerError> {
    if passthroughs.is_empty() {
        return Err(StakingManagerError::InvalidAction(format!(
            "{kind} names no passthrough"
        )));
    }
    Ok(passthroughs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::Zero;
    use stakesync_nullables::{test_data, NullProvider};
    use stakesync_types::BalanceType;

    use crate::engine::map_balances;

    fn router(provider: &Arc<NullProvider>) -> ActionRouter {
        ActionRouter::new(provider.clone(), test_data::wallet(), Duration::ZERO)
    }

    fn staked() -> StakingManagerState {
        let yield_info = test_data::yield_info();
        StakingManagerState::Staked {
            balances: map_balances(
                vec![test_data::raw_balance("v1", BalanceType::Active, 100)],
                &yield_info,
            ),
            yield_info,
            can_stake_more: true,
        }
    }

    fn action(action_type: StakingActionType) -> StakingAction {
        StakingAction {
            amount: Amount::from(10),
            target_address: Some("v1".into()),
            action_type,
        }
    }

    fn withdraw(passthroughs: &[&str]) -> StakingAction {
        action(StakingActionType::Pending(PendingActionType::Withdraw {
            passthroughs: passthroughs.iter().map(|p| p.to_string()).collect(),
        }))
    }

    #[tokio::test]
    async fn illegal_actions_make_no_provider_calls() {
        let provider = Arc::new(NullProvider::new(test_data::yield_info()));
        let router = router(&provider);

        let claim_rewards = StakingActionType::Pending(PendingActionType::ClaimRewards {
            passthrough: "p1".into(),
        });
        let every_kind = vec![
            StakingActionType::Stake,
            StakingActionType::Unstake,
            withdraw(&["p1", "p2"]).action_type,
            claim_rewards.clone(),
        ];
        let table = vec![
            (StakingManagerState::NotEnabled, every_kind.clone()),
            (
                StakingManagerState::LoadingError {
                    message: "down".into(),
                    cached: None,
                },
                every_kind.clone(),
            ),
            (
                StakingManagerState::TemporaryUnavailable {
                    yield_info: test_data::yield_info(),
                    cached: None,
                },
                every_kind,
            ),
            (
                StakingManagerState::AvailableToStake {
                    yield_info: test_data::yield_info(),
                },
                vec![
                    StakingActionType::Unstake,
                    withdraw(&["p1", "p2"]).action_type,
                    claim_rewards,
                ],
            ),
        ];

        for (state, action_types) in table {
            let kind = state.kind();
            let states = StateMachine::new(state);
            for action_type in action_types {
                let is_illegal = |err: &StakingManagerError| {
                    matches!(
                        err,
                        StakingManagerError::IllegalAction { action, state }
                            if *action == action_type && *state == kind
                    )
                };

                let err = router
                    .estimate_fee(&states, &action(action_type.clone()))
                    .await
                    .unwrap_err();
                assert!(is_illegal(&err), "estimate_fee {action_type} in {kind}: {err}");

                let err = router
                    .build_transaction(&states, &action(action_type.clone()))
                    .await
                    .unwrap_err();
                assert!(is_illegal(&err), "build_transaction {action_type} in {kind}: {err}");
            }
        }

        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn stake_runs_enter_flow_and_patches_in_order() {
        let provider = Arc::new(NullProvider::new(test_data::yield_info()));
        provider.set_enter_steps(2);
        let router = router(&provider);
        let states = StateMachine::new(StakingManagerState::AvailableToStake {
            yield_info: test_data::yield_info(),
        });

        let payload = router
            .build_transaction(&states, &action(StakingActionType::Stake))
            .await
            .unwrap();

        assert_eq!(payload.action_id.as_deref(), Some("enter-action"));
        assert_eq!(payload.steps.len(), 2);
        assert_eq!(payload.steps[0].metadata.id, "enter-action-step-0");
        assert_eq!(payload.steps[1].metadata.id, "enter-action-step-1");
        assert_eq!(payload.target.as_deref(), Some("v1"));
        assert_eq!(
            provider.calls_of("patch_transaction_step"),
            2,
            "every step is patched"
        );
    }

    #[tokio::test]
    async fn unstake_runs_exit_flow_when_staked() {
        let provider = Arc::new(NullProvider::new(test_data::yield_info()));
        let router = router(&provider);
        let states = StateMachine::new(staked());

        let payload = router
            .build_transaction(&states, &action(StakingActionType::Unstake))
            .await
            .unwrap();

        assert_eq!(payload.action_id.as_deref(), Some("exit-action"));
        assert_eq!(provider.calls_of("submit_exit"), 1);
        assert_eq!(provider.calls_of("submit_enter"), 0);
    }

    #[tokio::test]
    async fn withdraw_aggregates_every_passthrough() {
        let provider = Arc::new(NullProvider::new(test_data::yield_info()));
        let router = router(&provider);
        let states = StateMachine::new(staked());
        let withdraw = withdraw(&["p1", "p2", "p3"]);

        let payload = router.build_transaction(&states, &withdraw).await.unwrap();

        assert_eq!(provider.calls_of("submit_pending"), 3);
        assert!(payload.action_id.is_none());
        let ids: Vec<_> = payload
            .steps
            .iter()
            .map(|step| step.metadata.id.as_str())
            .collect();
        assert_eq!(
            ids,
            ["pending-p1-step-0", "pending-p2-step-0", "pending-p3-step-0"]
        );
        assert_eq!(payload.fee(), sum_amounts(&vec![test_data::step_fee(); 3]));

        let fee = router.estimate_fee(&states, &withdraw).await.unwrap();
        assert_eq!(fee, sum_amounts(&vec![test_data::pending_fee(); 3]));
        assert_eq!(provider.calls_of("estimate_pending_fee"), 3);
    }

    #[tokio::test]
    async fn withdraw_without_passthroughs_is_rejected() {
        let provider = Arc::new(NullProvider::new(test_data::yield_info()));
        let router = router(&provider);
        let states = StateMachine::new(staked());

        let result = router.estimate_fee(&states, &withdraw(&[])).await;
        assert!(matches!(result, Err(StakingManagerError::InvalidAction(_))));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn single_passthrough_kind_makes_one_call() {
        let provider = Arc::new(NullProvider::new(test_data::yield_info()));
        let router = router(&provider);
        let states = StateMachine::new(staked());
        let claim = action(StakingActionType::Pending(PendingActionType::ClaimRewards {
            passthrough: "rewards".into(),
        }));

        let payload = router.build_transaction(&states, &claim).await.unwrap();

        assert_eq!(payload.action_id.as_deref(), Some("pending-rewards"));
        assert_eq!(provider.calls_of("submit_pending"), 1);
        let submitted = provider.pending_requests();
        assert_eq!(submitted[0].kind, PendingActionKind::ClaimRewards);
        assert_eq!(submitted[0].request.integration_id, test_data::yield_info().id);
    }

    #[tokio::test]
    async fn provider_mapping_failure_is_typed() {
        let provider = Arc::new(NullProvider::new(test_data::yield_info()));
        provider.fail_patch_with_missing_field("unsignedTransaction");
        let router = router(&provider);
        let states = StateMachine::new(staked());

        let err = router
            .build_transaction(&states, &action(StakingActionType::Stake))
            .await
            .unwrap_err();
        assert!(matches!(err, StakingManagerError::Mapping(field) if field == "unsignedTransaction"));
    }

    #[test]
    fn tron_requests_carry_energy_resource() {
        let provider = Arc::new(NullProvider::new(test_data::yield_info()));
        let mut wallet = test_data::wallet();
        wallet.item.network = StakingNetwork::Tron;
        let router = ActionRouter::new(provider, wallet, Duration::ZERO);

        let request = router.request(&action(StakingActionType::Stake), "tron-trx-native-staking");
        assert_eq!(request.tron_resource.as_deref(), Some("ENERGY"));
        assert_eq!(request.integration_id, "tron-trx-native-staking");
        assert!(request.amount > Amount::zero());
    }

    #[tokio::test]
    async fn waits_for_loading_to_finish() {
        let provider = Arc::new(NullProvider::new(test_data::yield_info()));
        let router = Arc::new(router(&provider));
        let states = Arc::new(StateMachine::new(StakingManagerState::Loading { cached: None }));

        let pending = {
            let router = router.clone();
            let states = states.clone();
            tokio::spawn(async move {
                router
                    .estimate_fee(&states, &action(StakingActionType::Stake))
                    .await
            })
        };
        tokio::task::yield_now().await;
        assert!(provider.calls().is_empty());

        states.publish(StakingManagerState::AvailableToStake {
            yield_info: test_data::yield_info(),
        });
        let fee = pending.await.unwrap().unwrap();
        assert_eq!(fee, test_data::enter_fee());
    }
}
