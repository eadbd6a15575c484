//! Staking network identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Identifies the blockchain a staked asset lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StakingNetwork {
    Solana,
    Cosmos,
    Tron,
    Ethereum,
    Bsc,
    Ton,
    Polkadot,
    Kusama,
    Kava,
    Near,
    Cardano,
    Avalanche,
}

impl StakingNetwork {
    /// Whether an existing position on this network can be topped up,
    /// rather than only opened as a new delegation.
    pub fn supports_stake_more(&self) -> bool {
        match self {
            Self::Solana | Self::Cosmos | Self::Tron | Self::Ethereum | Self::Bsc | Self::Ton => {
                true
            }
            Self::Polkadot
            | Self::Kusama
            | Self::Kava
            | Self::Near
            | Self::Cardano
            | Self::Avalanche => false,
        }
    }

    /// Whether the provider reports staked balances with rewards already included.
    pub fn rewards_included_in_balance(&self) -> bool {
        matches!(self, Self::Cardano)
    }

    /// Whether enter/exit requests need a cosmos public key alongside the address.
    pub fn needs_cosmos_pub_key(&self) -> bool {
        matches!(self, Self::Cosmos | Self::Kava | Self::Near)
    }

    /// Network name as used by the staking provider's API.
    pub fn provider_id(&self) -> &'static str {
        match self {
            Self::Solana => "solana",
            Self::Cosmos => "cosmos",
            Self::Tron => "tron",
            Self::Ethereum => "ethereum",
            Self::Bsc => "binance",
            Self::Ton => "ton",
            Self::Polkadot => "polkadot",
            Self::Kusama => "kusama",
            Self::Kava => "kava",
            Self::Near => "near",
            Self::Cardano => "cardano",
            Self::Avalanche => "avalanche-c",
        }
    }

    /// Parse a network from the provider's API name.
    pub fn from_provider_id(id: &str) -> Option<Self> {
        let network = match id {
            "solana" => Self::Solana,
            "cosmos" => Self::Cosmos,
            "tron" => Self::Tron,
            "ethereum" => Self::Ethereum,
            "binance" => Self::Bsc,
            "ton" => Self::Ton,
            "polkadot" => Self::Polkadot,
            "kusama" => Self::Kusama,
            "kava" => Self::Kava,
            "near" => Self::Near,
            "cardano" => Self::Cardano,
            "avalanche-c" => Self::Avalanche,
            _ => return None,
        };
        Some(network)
    }
}

impl fmt::Display for StakingNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_id())
    }
}

impl FromStr for StakingNetwork {
    type Err = TypesError;

    /// Accepts the provider's API name or the common aliases (`bsc`, `avalanche`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "bsc" => Ok(Self::Bsc),
            "avalanche" => Ok(Self::Avalanche),
            other => {
                Self::from_provider_id(other).ok_or_else(|| TypesError::UnknownNetwork(s.to_string()))
            }
        }
    }
}
