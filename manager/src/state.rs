//! Published staking state and the watch channel that carries it.
//!
//! Exactly one [`StakingManagerState`] is current at any time. Subscribers get
//! a [`watch::Receiver`] and observe each published state in order; late
//! subscribers see the latest value immediately.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

use stakesync_types::{StakeBalance, YieldInfo};

use crate::error::StakingManagerError;

/// Result of the last successful pass, shown while a newer one is loading or failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingSnapshot {
    pub yield_info: YieldInfo,
    pub balances: Vec<StakeBalance>,
    pub can_stake_more: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StakingManagerState {
    /// A reconciliation pass is in flight.
    Loading { cached: Option<StakingSnapshot> },
    /// Staking is not offered for this asset.
    NotEnabled,
    /// A fetch failed; the message is for display only.
    LoadingError {
        message: String,
        cached: Option<StakingSnapshot>,
    },
    /// The provider reports the yield as unavailable.
    TemporaryUnavailable {
        yield_info: YieldInfo,
        cached: Option<StakingSnapshot>,
    },
    AvailableToStake { yield_info: YieldInfo },
    Staked {
        balances: Vec<StakeBalance>,
        yield_info: YieldInfo,
        can_stake_more: bool,
    },
}

/// Payload-free discriminant of [`StakingManagerState`], used in errors and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StakingStateKind {
    Loading,
    NotEnabled,
    LoadingError,
    TemporaryUnavailable,
    AvailableToStake,
    Staked,
}

impl fmt::Display for StakingStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loading => "loading",
            Self::NotEnabled => "not-enabled",
            Self::LoadingError => "loading-error",
            Self::TemporaryUnavailable => "temporary-unavailable",
            Self::AvailableToStake => "available-to-stake",
            Self::Staked => "staked",
        };
        f.write_str(name)
    }
}

impl StakingManagerState {
    pub fn kind(&self) -> StakingStateKind {
        match self {
            Self::Loading { .. } => StakingStateKind::Loading,
            Self::NotEnabled => StakingStateKind::NotEnabled,
            Self::LoadingError { .. } => StakingStateKind::LoadingError,
            Self::TemporaryUnavailable { .. } => StakingStateKind::TemporaryUnavailable,
            Self::AvailableToStake { .. } => StakingStateKind::AvailableToStake,
            Self::Staked { .. } => StakingStateKind::Staked,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn yield_info(&self) -> Option<&YieldInfo> {
        match self {
            Self::TemporaryUnavailable { yield_info, .. }
            | Self::AvailableToStake { yield_info }
            | Self::Staked { yield_info, .. } => Some(yield_info),
            Self::Loading { .. } | Self::NotEnabled | Self::LoadingError { .. } => None,
        }
    }

    /// Reconciled balances. Empty unless `Staked`.
    pub fn balances(&self) -> &[StakeBalance] {
        match self {
            Self::Staked { balances, .. } => balances,
            _ => &[],
        }
    }

    /// The snapshot to persist, for states produced by a successful pass.
    pub fn snapshot(&self) -> Option<StakingSnapshot> {
        match self {
            Self::AvailableToStake { yield_info } => Some(StakingSnapshot {
                yield_info: yield_info.clone(),
                balances: Vec::new(),
                can_stake_more: true,
            }),
            Self::Staked {
                balances,
                yield_info,
                can_stake_more,
            } => Some(StakingSnapshot {
                yield_info: yield_info.clone(),
                balances: balances.clone(),
                can_stake_more: *can_stake_more,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for StakingManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staked { balances, .. } => write!(f, "staked ({} balances)", balances.len()),
            Self::LoadingError { message, .. } => write!(f, "loading-error ({message})"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Owner of the state channel.
pub struct StateMachine {
    tx: watch::Sender<StakingManagerState>,
}

impl StateMachine {
    pub fn new(initial: StakingManagerState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> StakingManagerState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StakingManagerState> {
        self.tx.subscribe()
    }

    /// Replace the current state and notify every subscriber.
    pub fn publish(&self, state: StakingManagerState) {
        tracing::info!(state = %state, "staking state published");
        self.tx.send_replace(state);
    }

    /// Publish `Loading` unless the current state already is `Loading`.
    ///
    /// Returns whether anything was published.
    pub fn publish_loading(&self, cached: Option<StakingSnapshot>) -> bool {
        let published = self.tx.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            *state = StakingManagerState::Loading { cached };
            true
        });
        if published {
            tracing::info!("staking state published: loading");
        }
        published
    }

    /// The current state, or, while `Loading`, the next one published.
    ///
    /// Waits for exactly one change. A second `Loading` is reported as
    /// [`StakingManagerError::StillLoading`].
    pub async fn settled(&self) -> Result<StakingManagerState, StakingManagerError> {
        let mut rx = self.tx.subscribe();
        let current = rx.borrow_and_update().clone();
        if !current.is_loading() {
            return Ok(current);
        }

        tracing::debug!("waiting for loading to complete");
        rx.changed()
            .await
            .map_err(|_| StakingManagerError::StillLoading)?;
        let next = rx.borrow_and_update().clone();
        if next.is_loading() {
            return Err(StakingManagerError::StillLoading);
        }
        Ok(next)
    }
}
