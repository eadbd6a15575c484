//! Staking-eligible asset.

use serde::{Deserialize, Serialize};

use crate::network::StakingNetwork;

/// MATIC (Polygon) token contract on Ethereum mainnet.
pub const POLYGON_CONTRACT_ADDRESS: &str = "0x7d1afa7b718fb893db30a3abc0cfc608aacfebb0";

/// Spender that must be approved before Polygon tokens can be staked.
pub const POLYGON_STAKING_ALLOWANCE_ADDRESS: &str = "0x5e3ef299fddf15eaa0432e6e66473ace8c13d908";

/// An asset that can be staked: a native coin, or a token when `contract_address` is set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StakeTokenItem {
    pub network: StakingNetwork,
    pub contract_address: Option<String>,
    pub name: String,
    pub decimals: u32,
    pub symbol: String,
}

impl StakeTokenItem {
    /// Polygon staking happens through the MATIC ERC-20 contract on Ethereum.
    pub fn is_polygon(&self) -> bool {
        self.network == StakingNetwork::Ethereum
            && self
                .contract_address
                .as_deref()
                .is_some_and(|address| address.eq_ignore_ascii_case(POLYGON_CONTRACT_ADDRESS))
    }

    /// ERC-20 spender to approve before entering a position, if the asset needs one.
    pub fn allowance_address(&self) -> Option<&'static str> {
        self.is_polygon().then_some(POLYGON_STAKING_ALLOWANCE_ADDRESS)
    }
}
