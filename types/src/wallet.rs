//! Wallet descriptor for one staking session.

use serde::{Deserialize, Serialize};

use crate::request::AdditionalAddresses;
use crate::token::StakeTokenItem;

/// The wallet a staking session reconciles: one address staking one asset
/// through one provider integration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StakingWallet {
    pub item: StakeTokenItem,
    pub address: String,
    /// Provider yield (integration) identifier. `None` when the provider offers no
    /// staking for this asset.
    pub integration_id: Option<String>,
    #[serde(default)]
    pub additional_addresses: Option<AdditionalAddresses>,
}
