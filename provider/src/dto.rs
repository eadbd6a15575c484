//! Wire shapes of the staking provider's REST API (camelCase JSON).

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Shared ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDto {
    pub network: String,
    pub name: String,
    pub decimals: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub symbol: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalAddressesDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cosmos_pub_key: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_addresses: Option<AdditionalAddressesDto>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionTypeDto {
    Stake,
    Unstake,
    ClaimRewards,
    RestakeRewards,
    Withdraw,
    WithdrawAll,
    Restake,
    ClaimUnstaked,
    UnlockLocked,
    StakeLocked,
    Vote,
    Revoke,
    VoteLocked,
    Revote,
    Rebond,
    Migrate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatusDto {
    Canceled,
    Created,
    WaitingForNext,
    Processing,
    Failed,
    Success,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatusDto {
    NotFound,
    Created,
    Blocked,
    WaitingForSignature,
    Signed,
    Broadcasted,
    Pending,
    Confirmed,
    Failed,
    Skipped,
    #[serde(other)]
    Unknown,
}

// ── Balances ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesRequest {
    pub addresses: AddressDto,
    pub integration_id: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesResponse {
    pub integration_id: String,
    #[serde(default)]
    pub balances: Vec<BalanceDto>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BalanceTypeDto {
    Available,
    Staked,
    Unstaking,
    Unstaked,
    Preparing,
    Rewards,
    Locked,
    Unlocking,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDto {
    #[serde(rename = "type")]
    pub balance_type: BalanceTypeDto,
    pub amount: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub validator_address: Option<String>,
    #[serde(default)]
    pub validator_addresses: Option<Vec<String>>,
    #[serde(default)]
    pub account_address: Option<String>,
    pub token: TokenDto,
    #[serde(default)]
    pub pending_actions: Vec<BalancePendingActionDto>,
    #[serde(default)]
    pub pending_action_constraints: Option<Vec<PendingActionConstraintDto>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePendingActionDto {
    #[serde(rename = "type")]
    pub action_type: ActionTypeDto,
    pub passthrough: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingActionConstraintDto {
    #[serde(rename = "type")]
    pub action_type: ActionTypeDto,
    pub amount: AmountBoundsDto,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AmountBoundsDto {
    #[serde(default)]
    pub minimum: Option<BigDecimal>,
    #[serde(default)]
    pub maximum: Option<BigDecimal>,
}

// ── Yield ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardTypeDto {
    Apr,
    Apy,
    Variable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardClaimingDto {
    Auto,
    Manual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorStatusDto {
    Active,
    Jailed,
    Deactivating,
    Inactive,
    Full,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldResponse {
    pub id: String,
    pub token: TokenDto,
    pub is_available: bool,
    pub reward_type: RewardTypeDto,
    pub reward_rate: BigDecimal,
    pub args: YieldArgsDto,
    pub metadata: YieldMetadataDto,
    #[serde(default)]
    pub validators: Vec<ValidatorDto>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct YieldArgsDto {
    #[serde(default)]
    pub enter: Option<YieldActionArgsDto>,
    #[serde(default)]
    pub exit: Option<YieldActionArgsDto>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct YieldActionArgsDto {
    pub args: YieldActionAmountArgsDto,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct YieldActionAmountArgsDto {
    #[serde(default)]
    pub amount: AmountBoundsDto,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldMetadataDto {
    pub cooldown_period: PeriodDto,
    pub warmup_period: PeriodDto,
    pub reward_claiming: RewardClaimingDto,
    pub reward_schedule: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct PeriodDto {
    pub days: u32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorDto {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub preferred: Option<bool>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub apr: Option<BigDecimal>,
    #[serde(default)]
    pub commission: Option<BigDecimal>,
    pub status: ValidatorStatusDto,
}

// ── Actions ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionArgsDto {
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator_addresses: Option<Vec<String>>,
    pub input_token: TokenDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tron_resource: Option<String>,
}

/// Body of enter and exit calls, and of their fee estimates.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub integration_id: String,
    pub addresses: AddressDto,
    pub args: ActionArgsDto,
}

/// Body of pending-action calls, and of their fee estimates.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingActionRequestDto {
    #[serde(rename = "type")]
    pub action_type: ActionTypeDto,
    pub integration_id: String,
    pub passthrough: String,
    pub addresses: AddressDto,
    pub args: ActionArgsDto,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionTransactionDto {
    pub id: String,
    pub step_index: u32,
    pub status: TransactionStatusDto,
}

/// An action as returned by enter, exit, pending and list calls.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDto {
    pub id: String,
    pub status: ActionStatusDto,
    #[serde(rename = "type")]
    pub action_type: ActionTypeDto,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub current_step_index: u32,
    #[serde(default)]
    pub validator_address: Option<String>,
    #[serde(default)]
    pub validator_addresses: Option<Vec<String>>,
    #[serde(default)]
    pub account_addresses: Option<Vec<String>>,
    #[serde(default)]
    pub transactions: Option<Vec<ActionTransactionDto>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ActionListResponse {
    #[serde(default)]
    pub data: Vec<ActionDto>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasEstimateDto {
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub token: Option<TokenDto>,
}

// ── Transactions ───────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: String,
    pub network: String,
    pub status: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub step_index: u32,
    #[serde(default)]
    pub unsigned_transaction: Option<String>,
    #[serde(default)]
    pub gas_estimate: Option<GasEstimateDto>,
    #[serde(default)]
    pub stake_id: Option<String>,
}

/// Tron unsigned transactions arrive as a JSON document; only the raw hex is signed.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TronTransactionDto {
    pub raw_data_hex: String,
}
