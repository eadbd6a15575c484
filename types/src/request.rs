//! Provider request arguments.

use serde::{Deserialize, Serialize};

use crate::action::PendingActionKind;
use crate::amount::Amount;
use crate::token::StakeTokenItem;

/// Extra per-chain addressing the provider needs for some networks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdditionalAddresses {
    /// Base64 compressed secp256k1 public key (cosmos-sdk chains).
    pub cosmos_pub_key: Option<String>,
}

/// Arguments shared by enter, exit and pending-action calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGenericRequest {
    pub amount: Amount,
    pub address: String,
    pub additional_addresses: Option<AdditionalAddresses>,
    pub token: StakeTokenItem,
    pub target: Option<String>,
    pub integration_id: String,
    pub tron_resource: Option<String>,
}

/// A pending-action call for one passthrough.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingActionRequest {
    pub request: ActionGenericRequest,
    pub passthrough: String,
    pub kind: PendingActionKind,
}
