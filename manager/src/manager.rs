//! Staking session: one wallet, one provider, one published state.

use std::sync::{Arc, Mutex, Weak};
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use stakesync_provider::StakingProvider;
use stakesync_types::{Amount, StakingAction, StakingWallet, TransactionPayload};

use crate::config::ManagerConfig;
use crate::engine::{Reconciliation, ReconciliationEngine};
use crate::error::StakingManagerError;
use crate::repository::StateRepository;
use crate::router::ActionRouter;
use crate::state::{StakingManagerState, StakingSnapshot, StateMachine};

/// Handle to a staking session. Cheap to clone; all clones share one session.
///
/// Reconciliation passes are serialized: a `reconcile` call made while another
/// pass is in flight waits for that pass's result instead of starting its own.
/// If that pass is cancelled, the waiting call runs a pass of its own.
#[derive(Clone)]
pub struct StakingManager {
    inner: Arc<Inner>,
}

struct Inner {
    wallet: StakingWallet,
    config: ManagerConfig,
    engine: ReconciliationEngine,
    router: ActionRouter,
    states: StateMachine,
    repository: Arc<dyn StateRepository>,
    pass: Mutex<PassSlot>,
    refresh_task: Mutex<Option<AbortHandle>>,
}

#[derive(Default)]
struct PassSlot {
    /// Set while a pass is the writer.
    in_flight: bool,
    /// Passes that published a result. Cancelled passes do not count.
    completed: u64,
}

enum PassStart<'a> {
    Writer(PassGuard<'a>),
    Coalesced {
        rx: watch::Receiver<StakingManagerState>,
        completed: u64,
    },
}

/// Writer slot of one pass. Dropping it before [`PassGuard::complete`] restores
/// the state the pass started from.
struct PassGuard<'a> {
    inner: &'a Inner,
    previous: StakingManagerState,
    cached: Option<StakingSnapshot>,
    completed: bool,
}

impl PassGuard<'_> {
    fn complete(mut self, state: StakingManagerState) {
        if let Some(snapshot) = state.snapshot() {
            if let Err(e) = self.inner.repository.store(&snapshot) {
                tracing::warn!(error = %e, "failed to persist staking snapshot");
            }
        }

        let mut slot = self.inner.lock_pass();
        self.inner.states.publish(state);
        slot.in_flight = false;
        slot.completed += 1;
        self.completed = true;
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        tracing::debug!("reconciliation pass cancelled");
        let mut slot = self.inner.lock_pass();
        // Wakes coalesced callers even when the pass never published `Loading`.
        self.inner.states.publish(self.previous.clone());
        slot.in_flight = false;
    }
}

impl StakingManager {
    pub fn new(
        wallet: StakingWallet,
        provider: Arc<dyn StakingProvider>,
        repository: Arc<dyn StateRepository>,
        config: ManagerConfig,
    ) -> Self {
        let cached = load_snapshot(repository.as_ref());
        let router = ActionRouter::new(provider.clone(), wallet.clone(), config.settle_delay());

        Self {
            inner: Arc::new(Inner {
                engine: ReconciliationEngine::new(provider),
                router,
                states: StateMachine::new(StakingManagerState::Loading { cached }),
                repository,
                wallet,
                config,
                pass: Mutex::new(PassSlot::default()),
                refresh_task: Mutex::new(None),
            }),
        }
    }

    pub fn wallet(&self) -> &StakingWallet {
        &self.inner.wallet
    }

    pub fn state(&self) -> StakingManagerState {
        self.inner.states.current()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<StakingManagerState> {
        self.inner.states.subscribe()
    }

    /// ERC-20 spender to approve before staking, for assets that need one.
    pub fn allowance_address(&self) -> Option<&'static str> {
        self.inner.wallet.item.allowance_address()
    }

    /// Run a reconciliation pass, pending actions included, and return its state.
    pub async fn reconcile(&self) -> StakingManagerState {
        self.reconcile_with(true).await
    }

    /// Run a reconciliation pass, optionally skipping the pending-action fetch.
    pub async fn reconcile_with(&self, load_actions: bool) -> StakingManagerState {
        self.inner.run_pass(load_actions).await.0
    }

    pub async fn estimate_fee(&self, action: &StakingAction) -> Result<Amount, StakingManagerError> {
        self.inner.router.estimate_fee(&self.inner.states, action).await
    }

    pub async fn build_transaction(
        &self,
        action: &StakingAction,
    ) -> Result<TransactionPayload, StakingManagerError> {
        self.inner
            .router
            .build_transaction(&self.inner.states, action)
            .await
    }

    /// Refresh state in the background until the submitted action settles.
    ///
    /// Replaces any refresh started by an earlier notification.
    pub fn notify_action_submitted(&self, action: &StakingAction) {
        tracing::info!(%action, "action submitted, refreshing staking state");
        let mut slot = self
            .inner
            .refresh_task
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.take() {
            previous.abort();
        }

        let inner = Arc::downgrade(&self.inner);
        let task = tokio::spawn(refresh_until_settled(inner));
        *slot = Some(task.abort_handle());
    }
}

impl Inner {
    fn lock_pass(&self) -> std::sync::MutexGuard<'_, PassSlot> {
        self.pass.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin_pass(&self) -> PassStart<'_> {
        let mut slot = self.lock_pass();
        if slot.in_flight {
            // Subscribed under the lock, so the writer's result is the next change.
            let mut rx = self.states.subscribe();
            rx.borrow_and_update();
            return PassStart::Coalesced {
                rx,
                completed: slot.completed,
            };
        }
        slot.in_flight = true;

        let previous = self.states.current();
        let cached = load_snapshot(self.repository.as_ref());
        self.states.publish_loading(cached.clone());
        PassStart::Writer(PassGuard {
            inner: self,
            previous,
            cached,
            completed: false,
        })
    }

    /// Returns the published state and, for the writer, the pending-action count.
    async fn run_pass(&self, load_actions: bool) -> (StakingManagerState, Option<usize>) {
        let guard = loop {
            let (mut rx, completed) = match self.begin_pass() {
                PassStart::Writer(guard) => break guard,
                PassStart::Coalesced { rx, completed } => (rx, completed),
            };
            tracing::debug!("reconciliation already in flight, waiting for its result");
            // The sender lives in `self`, so it cannot close while we wait.
            let _ = rx.changed().await;

            let result = {
                let slot = self.lock_pass();
                (slot.completed != completed && !slot.in_flight).then(|| self.states.current())
            };
            match result {
                Some(state) => return (state, None),
                // Cancelled, or a newer pass already took over: go again.
                None => continue,
            }
        };

        let Reconciliation {
            state,
            pending_actions,
        } = self
            .engine
            .reconcile(&self.wallet, load_actions, guard.cached.clone())
            .await;
        guard.complete(state.clone());
        (state, Some(pending_actions))
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let slot = self.refresh_task.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = slot.take() {
            task.abort();
        }
    }
}

async fn refresh_until_settled(inner: Weak<Inner>) {
    let started = Instant::now();
    loop {
        let Some(session) = inner.upgrade() else {
            return;
        };
        let (state, pending_actions) = session.run_pass(true).await;
        let interval = session.config.status_update_interval();
        let timeout = session.config.status_update_timeout();
        drop(session);

        if pending_actions == Some(0) {
            tracing::debug!(state = %state, "pending actions settled, refresh stopped");
            return;
        }
        if started.elapsed() >= timeout {
            tracing::debug!("status refresh timed out");
            return;
        }
        tokio::time::sleep(interval).await;
    }
}

fn load_snapshot(repository: &dyn StateRepository) -> Option<StakingSnapshot> {
    repository.load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load staking snapshot");
        None
    })
}
