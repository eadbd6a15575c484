//! Fixtures: a Solana wallet staking through two validators, `v1` and `v2`.

use std::str::FromStr;

use stakesync_types::token::POLYGON_CONTRACT_ADDRESS;
use stakesync_types::{
    ActionStatus, Amount, BalanceType, PendingAction, PendingActionKind, Period, RawBalance,
    RewardClaimingType, RewardRateValues, RewardScheduleType, RewardType, StakeTokenItem,
    StakingNetwork, StakingTarget, StakingWallet, TargetStatus, YieldInfo,
};

pub const INTEGRATION_ID: &str = "solana-sol-native-multivalidator-staking";

pub const WALLET_ADDRESS: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

pub fn item() -> StakeTokenItem {
    StakeTokenItem {
        network: StakingNetwork::Solana,
        contract_address: None,
        name: "Solana".into(),
        decimals: 9,
        symbol: "SOL".into(),
    }
}

pub fn polygon_item() -> StakeTokenItem {
    StakeTokenItem {
        network: StakingNetwork::Ethereum,
        contract_address: Some(POLYGON_CONTRACT_ADDRESS.into()),
        name: "Polygon".into(),
        decimals: 18,
        symbol: "MATIC".into(),
    }
}

pub fn wallet() -> StakingWallet {
    StakingWallet {
        item: item(),
        address: WALLET_ADDRESS.into(),
        integration_id: Some(INTEGRATION_ID.into()),
        additional_addresses: None,
    }
}

pub fn target(address: &str) -> StakingTarget {
    StakingTarget {
        address: address.into(),
        name: format!("Validator {address}"),
        preferred: true,
        partner: false,
        icon_url: None,
        reward_type: RewardType::Apr,
        reward_rate: amount("0.07"),
        status: TargetStatus::Active,
    }
}

pub fn yield_info() -> YieldInfo {
    let targets = vec![target("v1"), target("v2")];
    YieldInfo {
        id: INTEGRATION_ID.into(),
        is_available: true,
        reward_type: RewardType::Apr,
        reward_rate_values: RewardRateValues::Single(amount("0.07")),
        enter_minimum_requirement: amount("0.01"),
        exit_minimum_requirement: amount("0"),
        preferred_targets: targets.clone(),
        targets,
        item: item(),
        unbonding_period: Period { days: 3 },
        warmup_period: Period { days: 1 },
        reward_claiming_type: RewardClaimingType::Auto,
        reward_schedule_type: RewardScheduleType::Days { min: 2, max: 3 },
        maximum_stake_amount: None,
    }
}

/// A settled balance held with `validator`.
pub fn raw_balance(validator: &str, balance_type: BalanceType, amount: i64) -> RawBalance {
    RawBalance {
        item: item(),
        amount: Amount::from(amount),
        account_address: None,
        balance_type,
        target_address: Some(validator.into()),
        actions: Vec::new(),
        constraints: None,
    }
}

pub fn pending_action(kind: PendingActionKind, validator: Option<&str>, amount: i64) -> PendingAction {
    PendingAction {
        id: format!("{kind}-{}-{amount}", validator.unwrap_or("none")),
        account_addresses: None,
        status: ActionStatus::Processing,
        amount: Amount::from(amount),
        kind,
        current_step_index: 0,
        transactions: Vec::new(),
        target_address: validator.map(str::to_string),
    }
}

pub fn enter_fee() -> Amount {
    amount("0.005")
}

pub fn exit_fee() -> Amount {
    amount("0.004")
}

pub fn pending_fee() -> Amount {
    amount("0.002")
}

/// Fee of every patched transaction step.
pub fn step_fee() -> Amount {
    amount("0.001")
}

fn amount(s: &str) -> Amount {
    Amount::from_str(s).unwrap_or_default()
}
