//! Errors raised while constructing data-model values.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("unknown staking network: {0}")]
    UnknownNetwork(String),

    #[error("unknown action kind: {0}")]
    UnknownActionKind(String),

    #[error("pending action {0} needs at least one passthrough")]
    MissingPassthrough(String),
}
