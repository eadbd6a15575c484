//! Staking provider boundary.
//!
//! The reconciliation core talks to the staking-yield provider only through the
//! [`StakingProvider`] trait. Every call is async and either succeeds or fails with
//! a [`ProviderError`]; the core never interprets provider-specific error codes.
//!
//! [`HttpStakingProvider`] is the default implementation over the provider's REST API:
//! - `dto` holds the wire shapes
//! - `mapper` turns them into `stakesync_types` values, rejecting responses that lack
//!   a required field

pub mod client;
pub mod dto;
pub mod error;
pub mod mapper;

use async_trait::async_trait;
use stakesync_types::{
    ActionGenericRequest, Amount, PendingAction, PendingActionRequest, ProviderAction, RawBalance,
    StakingWallet, TransactionStep, YieldInfo,
};

pub use client::{HttpProviderConfig, HttpStakingProvider};
pub use error::ProviderError;

/// Network calls the reconciliation core depends on.
#[async_trait]
pub trait StakingProvider: Send + Sync {
    /// Settled balances of the wallet for its integration.
    async fn fetch_balances(&self, wallet: &StakingWallet) -> Result<Vec<RawBalance>, ProviderError>;

    /// Product terms and validators of an integration.
    async fn fetch_yield(&self, integration_id: &str) -> Result<YieldInfo, ProviderError>;

    /// Actions the provider has accepted for the wallet but not yet settled.
    async fn fetch_pending_actions(
        &self,
        wallet: &StakingWallet,
    ) -> Result<Vec<PendingAction>, ProviderError>;

    async fn estimate_enter_fee(&self, request: &ActionGenericRequest) -> Result<Amount, ProviderError>;

    async fn estimate_exit_fee(&self, request: &ActionGenericRequest) -> Result<Amount, ProviderError>;

    async fn estimate_pending_fee(
        &self,
        request: &PendingActionRequest,
    ) -> Result<Amount, ProviderError>;

    async fn submit_enter(
        &self,
        request: &ActionGenericRequest,
    ) -> Result<ProviderAction, ProviderError>;

    async fn submit_exit(
        &self,
        request: &ActionGenericRequest,
    ) -> Result<ProviderAction, ProviderError>;

    async fn submit_pending(
        &self,
        request: &PendingActionRequest,
    ) -> Result<ProviderAction, ProviderError>;

    /// Finalize one transaction step of a submitted action and fetch its unsigned data.
    async fn patch_transaction_step(&self, id: &str) -> Result<TransactionStep, ProviderError>;
}
