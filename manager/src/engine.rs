//! Reconciliation engine: fetch, map, overlay, classify.

use std::collections::HashSet;
use std::sync::Arc;

use stakesync_provider::{ProviderError, StakingProvider};
use stakesync_types::{
    PendingAction, RawBalance, StakeBalance, StakingWallet, TargetType, YieldInfo,
};

use crate::overlay::merge_pending_actions;
use crate::state::{StakingManagerState, StakingSnapshot};

/// Provider data one pass works from.
#[derive(Clone, Debug)]
pub struct ReconcileInputs {
    pub balances: Vec<RawBalance>,
    pub yield_info: YieldInfo,
    pub pending_actions: Vec<PendingAction>,
}

/// Outcome of one pass.
#[derive(Clone, Debug)]
pub struct Reconciliation {
    pub state: StakingManagerState,
    /// Pending actions the provider reported. Zero when they were not requested
    /// or the pass failed.
    pub pending_actions: usize,
}

pub struct ReconciliationEngine {
    provider: Arc<dyn StakingProvider>,
}

impl ReconciliationEngine {
    pub fn new(provider: Arc<dyn StakingProvider>) -> Self {
        Self { provider }
    }

    /// Fetch balances, yield info and (optionally) pending actions concurrently.
    pub async fn fetch(
        &self,
        wallet: &StakingWallet,
        integration_id: &str,
        load_actions: bool,
    ) -> Result<ReconcileInputs, ProviderError> {
        let provider = self.provider.as_ref();
        let actions = async {
            if load_actions {
                provider.fetch_pending_actions(wallet).await
            } else {
                Ok(Vec::new())
            }
        };

        let (balances, yield_info, pending_actions) = tokio::try_join!(
            provider.fetch_balances(wallet),
            provider.fetch_yield(integration_id),
            actions,
        )?;

        Ok(ReconcileInputs {
            balances,
            yield_info,
            pending_actions,
        })
    }

    /// Run one pass. Failures become states; this never returns an error.
    pub async fn reconcile(
        &self,
        wallet: &StakingWallet,
        load_actions: bool,
        cached: Option<StakingSnapshot>,
    ) -> Reconciliation {
        let Some(integration_id) = wallet.integration_id.as_deref() else {
            return Reconciliation {
                state: StakingManagerState::NotEnabled,
                pending_actions: 0,
            };
        };

        match self.fetch(wallet, integration_id, load_actions).await {
            Ok(inputs) => {
                let pending_actions = inputs.pending_actions.len();
                let can_stake_more = wallet.item.network.supports_stake_more();
                Reconciliation {
                    state: build_state(inputs, can_stake_more, cached),
                    pending_actions,
                }
            }
            Err(e) => {
                tracing::warn!(integration = integration_id, error = %e, "staking fetch failed");
                Reconciliation {
                    state: StakingManagerState::LoadingError {
                        message: e.to_string(),
                        cached,
                    },
                    pending_actions: 0,
                }
            }
        }
    }
}

/// Derive the published state from one pass's provider data.
pub fn build_state(
    inputs: ReconcileInputs,
    can_stake_more: bool,
    cached: Option<StakingSnapshot>,
) -> StakingManagerState {
    let ReconcileInputs {
        balances,
        yield_info,
        pending_actions,
    } = inputs;

    if !yield_info.is_available {
        return StakingManagerState::TemporaryUnavailable { yield_info, cached };
    }

    let settled = map_balances(balances, &yield_info);
    warn_on_duplicate_positions(&settled);
    let balances = merge_pending_actions(settled, &pending_actions, &yield_info);

    if balances.is_empty() {
        StakingManagerState::AvailableToStake { yield_info }
    } else {
        StakingManagerState::Staked {
            balances,
            yield_info,
            can_stake_more,
        }
    }
}

/// Resolve each raw balance's validator against the yield's targets.
pub fn map_balances(raw: Vec<RawBalance>, yield_info: &YieldInfo) -> Vec<StakeBalance> {
    raw.into_iter()
        .map(|balance| {
            let target_type = match balance.target_address {
                Some(address) => match yield_info.target(&address) {
                    Some(target) => TargetType::Target(target.clone()),
                    None => TargetType::Disabled { address },
                },
                None => TargetType::Empty,
            };
            StakeBalance {
                item: balance.item,
                amount: balance.amount,
                account_address: balance.account_address,
                balance_type: balance.balance_type,
                target_type,
                in_progress: false,
                actions: balance.actions,
                constraints: balance.constraints,
            }
        })
        .collect()
}

/// The overlay matches first-wins, so positions sharing a key are ambiguous.
fn warn_on_duplicate_positions(balances: &[StakeBalance]) {
    let mut seen = HashSet::new();
    for balance in balances {
        let key = (
            &balance.item,
            balance.target_address(),
            &balance.balance_type,
            balance.account_address.as_deref(),
        );
        if !seen.insert(key) {
            tracing::warn!(
                target_address = balance.target_address().unwrap_or("-"),
                balance_type = ?balance.balance_type,
                "duplicate balance position reported by provider"
            );
        }
    }
}
