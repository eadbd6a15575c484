//! Staking reconciliation for one wallet.
//!
//! A [`StakingManager`] keeps a single published [`StakingManagerState`] in
//! line with the provider: each reconciliation pass fetches balances, yield
//! terms and pending actions, overlays the pending actions onto the settled
//! balances and publishes exactly one resulting state. Fee estimates and
//! transaction builds are routed by that state.

pub mod config;
pub mod engine;
pub mod error;
pub mod manager;
pub mod overlay;
pub mod repository;
pub mod router;
pub mod state;

pub use config::ManagerConfig;
pub use engine::{build_state, ReconcileInputs, Reconciliation, ReconciliationEngine};
pub use error::{ConfigError, RepositoryError, StakingManagerError};
pub use manager::StakingManager;
pub use overlay::merge_pending_actions;
pub use repository::{InMemoryStateRepository, JsonFileStateRepository, StateRepository};
pub use router::ActionRouter;
pub use state::{StakingManagerState, StakingSnapshot, StakingStateKind, StateMachine};
