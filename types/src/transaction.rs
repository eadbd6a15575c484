//! Unsigned transaction payloads handed to the signing layer.

use serde::{Deserialize, Serialize};

use crate::amount::{sum_amounts, Amount};

/// Provider bookkeeping attached to a transaction step.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionMetadata {
    pub id: String,
    pub action_id: String,
    pub kind: String,
    pub status: String,
    pub step_index: u32,
}

/// One finalized, unsigned transaction step.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionStep {
    /// Provider network name the raw data is encoded for.
    pub network: String,
    /// Chain-native unsigned transaction, opaque to this crate.
    pub unsigned_data: String,
    pub fee: Amount,
    pub metadata: TransactionMetadata,
}

/// Ordered transaction steps for one requested action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPayload {
    /// Provider action id for correlation. `None` when several provider actions were merged.
    pub action_id: Option<String>,
    pub amount: Amount,
    pub target: Option<String>,
    pub steps: Vec<TransactionStep>,
}

impl TransactionPayload {
    /// Total fee across every step.
    pub fn fee(&self) -> Amount {
        sum_amounts(self.steps.iter().map(|step| &step.fee))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn step(id: &str, fee: &str) -> TransactionStep {
        TransactionStep {
            network: "solana".into(),
            unsigned_data: format!("raw-{id}"),
            fee: Amount::from_str(fee).unwrap(),
            metadata: TransactionMetadata {
                id: id.into(),
                action_id: "action".into(),
                kind: "STAKE".into(),
                status: "CREATED".into(),
                step_index: 0,
            },
        }
    }

    #[test]
    fn fee_sums_steps() {
        let payload = TransactionPayload {
            action_id: Some("action".into()),
            amount: Amount::from(5),
            target: None,
            steps: vec![step("a", "0.001"), step("b", "0.0025")],
        };
        assert_eq!(payload.fee(), Amount::from_str("0.0035").unwrap());
    }
}
