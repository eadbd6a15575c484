//! Nullable staking provider: scripted responses, recorded calls.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

use stakesync_provider::{ProviderError, StakingProvider};
use stakesync_types::{
    ActionGenericRequest, ActionStatus, ActionTransaction, Amount, PendingAction,
    PendingActionRequest, ProviderAction, RawBalance, StakingWallet, TransactionMetadata,
    TransactionStep, YieldInfo,
};

use crate::test_data;

struct Script {
    balances: Vec<RawBalance>,
    yield_info: YieldInfo,
    pending_actions: Vec<PendingAction>,
    fetch_failure: Option<String>,
    patch_failure: Option<ProviderError>,
    enter_steps: u32,
    calls: Vec<&'static str>,
    pending_requests: Vec<PendingActionRequest>,
}

/// A staking provider that answers from a script instead of the network.
///
/// Submitted actions are named after their flow (`enter-action`, `exit-action`,
/// `pending-<passthrough>`) and their steps `<action>-step-<n>`, so tests can
/// assert on step order.
pub struct NullProvider {
    script: Mutex<Script>,
    /// Balance fetches wait while this is `false`.
    fetch_gate: watch::Sender<bool>,
}

impl NullProvider {
    /// A provider with no balances and no pending actions.
    pub fn new(yield_info: YieldInfo) -> Self {
        let (fetch_gate, _rx) = watch::channel(true);
        Self {
            script: Mutex::new(Script {
                balances: Vec::new(),
                yield_info,
                pending_actions: Vec::new(),
                fetch_failure: None,
                patch_failure: None,
                enter_steps: 1,
                calls: Vec::new(),
                pending_requests: Vec::new(),
            }),
            fetch_gate,
        }
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: &'static str) {
        self.script().calls.push(call);
    }

    pub fn set_balances(&self, balances: Vec<RawBalance>) {
        self.script().balances = balances;
    }

    pub fn set_yield_info(&self, yield_info: YieldInfo) {
        self.script().yield_info = yield_info;
    }

    pub fn set_pending_actions(&self, actions: Vec<PendingAction>) {
        self.script().pending_actions = actions;
    }

    /// Number of transaction steps the enter flow returns.
    pub fn set_enter_steps(&self, steps: u32) {
        self.script().enter_steps = steps;
    }

    /// Make balance and yield fetches fail with `message`.
    pub fn fail_fetches(&self, message: &str) {
        self.script().fetch_failure = Some(message.to_string());
    }

    /// Make transaction patches report `field` as missing.
    pub fn fail_patch_with_missing_field(&self, field: &str) {
        self.script().patch_failure = Some(ProviderError::MissingField(field.to_string()));
    }

    /// Hold balance fetches until [`NullProvider::release_fetches`].
    pub fn hold_fetches(&self) {
        self.fetch_gate.send_replace(false);
    }

    pub fn release_fetches(&self) {
        self.fetch_gate.send_replace(true);
    }

    /// Every call made so far, by method name.
    pub fn calls(&self) -> Vec<&'static str> {
        self.script().calls.clone()
    }

    pub fn calls_of(&self, call: &str) -> usize {
        self.script().calls.iter().filter(|c| **c == call).count()
    }

    /// Every pending-action submission, in call order.
    pub fn pending_requests(&self) -> Vec<PendingActionRequest> {
        self.script().pending_requests.clone()
    }

    fn fetch_result(&self) -> Result<(), ProviderError> {
        match &self.script().fetch_failure {
            Some(message) => Err(ProviderError::Unreachable(message.clone())),
            None => Ok(()),
        }
    }

    fn action(id: String, amount: &Amount, steps: u32) -> ProviderAction {
        let transactions = (0..steps)
            .map(|step_index| ActionTransaction {
                id: format!("{id}-step-{step_index}"),
                step_index,
            })
            .collect();
        ProviderAction {
            id,
            status: ActionStatus::Created,
            amount: amount.clone(),
            current_step_index: 0,
            transactions,
        }
    }
}

#[async_trait]
impl StakingProvider for NullProvider {
    async fn fetch_balances(&self, _wallet: &StakingWallet) -> Result<Vec<RawBalance>, ProviderError> {
        self.record("fetch_balances");
        let mut gate = self.fetch_gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;
        self.fetch_result()?;
        Ok(self.script().balances.clone())
    }

    async fn fetch_yield(&self, _integration_id: &str) -> Result<YieldInfo, ProviderError> {
        self.record("fetch_yield");
        self.fetch_result()?;
        Ok(self.script().yield_info.clone())
    }

    async fn fetch_pending_actions(
        &self,
        _wallet: &StakingWallet,
    ) -> Result<Vec<PendingAction>, ProviderError> {
        self.record("fetch_pending_actions");
        Ok(self.script().pending_actions.clone())
    }

    async fn estimate_enter_fee(&self, _request: &ActionGenericRequest) -> Result<Amount, ProviderError> {
        self.record("estimate_enter_fee");
        Ok(test_data::enter_fee())
    }

    async fn estimate_exit_fee(&self, _request: &ActionGenericRequest) -> Result<Amount, ProviderError> {
        self.record("estimate_exit_fee");
        Ok(test_data::exit_fee())
    }

    async fn estimate_pending_fee(
        &self,
        _request: &PendingActionRequest,
    ) -> Result<Amount, ProviderError> {
        self.record("estimate_pending_fee");
        Ok(test_data::pending_fee())
    }

    async fn submit_enter(
        &self,
        request: &ActionGenericRequest,
    ) -> Result<ProviderAction, ProviderError> {
        self.record("submit_enter");
        let steps = self.script().enter_steps;
        Ok(Self::action("enter-action".into(), &request.amount, steps))
    }

    async fn submit_exit(
        &self,
        request: &ActionGenericRequest,
    ) -> Result<ProviderAction, ProviderError> {
        self.record("submit_exit");
        Ok(Self::action("exit-action".into(), &request.amount, 1))
    }

    async fn submit_pending(
        &self,
        request: &PendingActionRequest,
    ) -> Result<ProviderAction, ProviderError> {
        self.record("submit_pending");
        self.script().pending_requests.push(request.clone());
        Ok(Self::action(
            format!("pending-{}", request.passthrough),
            &request.request.amount,
            1,
        ))
    }

    async fn patch_transaction_step(&self, id: &str) -> Result<TransactionStep, ProviderError> {
        self.record("patch_transaction_step");
        let script = self.script();
        if let Some(failure) = &script.patch_failure {
            return Err(failure.clone());
        }

        let (action_id, step_index) = match id.rsplit_once("-step-") {
            Some((action_id, index)) => (action_id, index.parse().unwrap_or_default()),
            None => (id, 0),
        };
        Ok(TransactionStep {
            network: script.yield_info.item.network.provider_id().to_string(),
            unsigned_data: format!("unsigned-{id}"),
            fee: test_data::step_fee(),
            metadata: TransactionMetadata {
                id: id.to_string(),
                action_id: action_id.to_string(),
                kind: "STAKE".into(),
                status: "WAITING_FOR_SIGNATURE".into(),
                step_index,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn records_calls_in_order() {
        let provider = NullProvider::new(test_data::yield_info());
        let wallet = test_data::wallet();

        provider.fetch_yield("id").await.unwrap();
        provider.fetch_balances(&wallet).await.unwrap();
        provider.fetch_yield("id").await.unwrap();

        assert_eq!(provider.calls(), ["fetch_yield", "fetch_balances", "fetch_yield"]);
        assert_eq!(provider.calls_of("fetch_yield"), 2);
    }

    #[tokio::test]
    async fn scripted_failures() {
        let provider = NullProvider::new(test_data::yield_info());
        provider.fail_fetches("down");
        let err = provider.fetch_yield("id").await.unwrap_err();
        assert_eq!(err, ProviderError::Unreachable("down".into()));

        provider.fail_patch_with_missing_field("stakeId");
        let err = provider.patch_transaction_step("x-step-0").await.unwrap_err();
        assert_eq!(err, ProviderError::MissingField("stakeId".into()));
    }

    #[tokio::test]
    async fn patched_steps_name_their_action() {
        let provider = NullProvider::new(test_data::yield_info());
        let step = provider.patch_transaction_step("enter-action-step-3").await.unwrap();
        assert_eq!(step.metadata.action_id, "enter-action");
        assert_eq!(step.metadata.step_index, 3);
        assert_eq!(step.network, "solana");
    }

    #[tokio::test]
    async fn held_fetches_wait_for_release() {
        let provider = Arc::new(NullProvider::new(test_data::yield_info()));
        provider.hold_fetches();

        let fetch = tokio::spawn({
            let provider = provider.clone();
            async move { provider.fetch_balances(&test_data::wallet()).await }
        });
        tokio::task::yield_now().await;
        assert!(!fetch.is_finished());

        provider.release_fetches();
        assert!(fetch.await.unwrap().unwrap().is_empty());
    }
}
