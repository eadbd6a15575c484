//! Fundamental types for staking reconciliation.
//!
//! This crate defines the data model shared by every other crate in the workspace:
//! staked token items, validators (targets), yield terms, balances, pending actions,
//! requested actions, provider requests and unsigned transaction payloads.

pub mod action;
pub mod amount;
pub mod balance;
pub mod error;
pub mod network;
pub mod request;
pub mod target;
pub mod token;
pub mod transaction;
pub mod wallet;
pub mod yield_info;

pub use action::{
    ActionStatus, ActionTransaction, PendingAction, PendingActionKind, PendingActionType,
    ProviderAction, StakingAction, StakingActionType,
};
pub use amount::{sum_amounts, Amount};
pub use balance::{ActionConstraint, BalanceAction, BalanceType, RawBalance, StakeBalance, TargetType};
pub use error::TypesError;
pub use network::StakingNetwork;
pub use request::{ActionGenericRequest, AdditionalAddresses, PendingActionRequest};
pub use target::{StakingTarget, TargetStatus};
pub use token::StakeTokenItem;
pub use transaction::{TransactionMetadata, TransactionPayload, TransactionStep};
pub use wallet::StakingWallet;
pub use yield_info::{
    Period, RewardClaimingType, RewardRateValues, RewardScheduleType, RewardType, YieldInfo,
};
