use thiserror::Error;

use stakesync_provider::ProviderError;
use stakesync_types::StakingActionType;

use crate::state::StakingStateKind;

#[derive(Debug, Error)]
pub enum StakingManagerError {
    #[error("action {action} is not allowed in state {state}")]
    IllegalAction {
        action: StakingActionType,
        state: StakingStateKind,
    },

    #[error("staking state is still loading")]
    StillLoading,

    #[error("provider response is missing {0}")]
    Mapping(String),

    #[error("provider error: {0}")]
    Provider(ProviderError),

    #[error("invalid action: {0}")]
    InvalidAction(String),
}

impl From<ProviderError> for StakingManagerError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::MissingField(field) => Self::Mapping(field),
            other => Self::Provider(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(String),

    #[error("failed to parse config: {0}")]
    Parse(String),
}
