//! Conversion between provider wire shapes and `stakesync_types` values.
//!
//! Responses missing a required figure are rejected with
//! [`ProviderError::MissingField`]; nothing is synthesized.

use bigdecimal::{BigDecimal, One, Zero};
use std::str::FromStr;

use stakesync_types::{
    ActionConstraint, ActionGenericRequest, ActionStatus, ActionTransaction, Amount,
    BalanceAction, BalanceType, PendingAction, PendingActionKind, PendingActionRequest, Period,
    ProviderAction, RawBalance, RewardClaimingType, RewardRateValues, RewardScheduleType,
    RewardType, StakeTokenItem, StakingNetwork, StakingTarget, TargetStatus, TransactionMetadata,
    TransactionStep, YieldInfo,
};

use crate::dto::*;
use crate::error::ProviderError;

fn parse_amount(value: &str) -> Option<Amount> {
    BigDecimal::from_str(value.trim()).ok()
}

// ── To wire ────────────────────────────────────────────────────────────

pub fn map_token_dto(item: &StakeTokenItem) -> TokenDto {
    TokenDto {
        network: item.network.provider_id().to_string(),
        name: item.name.clone(),
        decimals: item.decimals,
        address: item.contract_address.clone(),
        symbol: item.symbol.clone(),
    }
}

pub fn map_address(request: &ActionGenericRequest) -> AddressDto {
    AddressDto {
        address: request.address.clone(),
        additional_addresses: request
            .additional_addresses
            .as_ref()
            .map(|additional| AdditionalAddressesDto {
                cosmos_pub_key: additional.cosmos_pub_key.clone(),
            }),
    }
}

pub fn map_action_args(request: &ActionGenericRequest) -> ActionArgsDto {
    ActionArgsDto {
        amount: request.amount.to_string(),
        validator_address: request.target.clone(),
        validator_addresses: request.target.clone().map(|target| vec![target]),
        input_token: map_token_dto(&request.token),
        tron_resource: request.tron_resource.clone(),
    }
}

pub fn map_action_request(request: &ActionGenericRequest) -> ActionRequest {
    ActionRequest {
        integration_id: request.integration_id.clone(),
        addresses: map_address(request),
        args: map_action_args(request),
    }
}

pub fn map_pending_request(request: &PendingActionRequest) -> PendingActionRequestDto {
    PendingActionRequestDto {
        action_type: map_action_type_dto(request.kind),
        integration_id: request.request.integration_id.clone(),
        passthrough: request.passthrough.clone(),
        addresses: map_address(&request.request),
        args: map_action_args(&request.request),
    }
}

pub fn map_action_type_dto(kind: PendingActionKind) -> ActionTypeDto {
    match kind {
        PendingActionKind::Stake => ActionTypeDto::Stake,
        PendingActionKind::Unstake => ActionTypeDto::Unstake,
        PendingActionKind::Withdraw => ActionTypeDto::Withdraw,
        PendingActionKind::ClaimRewards => ActionTypeDto::ClaimRewards,
        PendingActionKind::RestakeRewards => ActionTypeDto::RestakeRewards,
        PendingActionKind::Vote => ActionTypeDto::Vote,
        PendingActionKind::VoteLocked => ActionTypeDto::VoteLocked,
        PendingActionKind::UnlockLocked => ActionTypeDto::UnlockLocked,
        PendingActionKind::Restake => ActionTypeDto::Restake,
        PendingActionKind::Rebond => ActionTypeDto::Rebond,
        PendingActionKind::ClaimUnstaked => ActionTypeDto::ClaimUnstaked,
    }
}

// ── Actions ────────────────────────────────────────────────────────────

pub fn map_action_kind(action_type: ActionTypeDto) -> Result<PendingActionKind, ProviderError> {
    let kind = match action_type {
        ActionTypeDto::Stake => PendingActionKind::Stake,
        ActionTypeDto::Unstake => PendingActionKind::Unstake,
        ActionTypeDto::ClaimRewards => PendingActionKind::ClaimRewards,
        ActionTypeDto::RestakeRewards => PendingActionKind::RestakeRewards,
        ActionTypeDto::Withdraw => PendingActionKind::Withdraw,
        ActionTypeDto::Restake => PendingActionKind::Restake,
        ActionTypeDto::ClaimUnstaked => PendingActionKind::ClaimUnstaked,
        ActionTypeDto::UnlockLocked => PendingActionKind::UnlockLocked,
        ActionTypeDto::Vote => PendingActionKind::Vote,
        ActionTypeDto::VoteLocked | ActionTypeDto::Revote => PendingActionKind::VoteLocked,
        ActionTypeDto::Rebond => PendingActionKind::Rebond,
        ActionTypeDto::WithdrawAll
        | ActionTypeDto::StakeLocked
        | ActionTypeDto::Revoke
        | ActionTypeDto::Migrate => {
            return Err(ProviderError::Unsupported(format!(
                "action type {action_type:?}"
            )))
        }
    };
    Ok(kind)
}

pub fn map_action_status(status: ActionStatusDto) -> Result<ActionStatus, ProviderError> {
    match status {
        ActionStatusDto::Created => Ok(ActionStatus::Created),
        ActionStatusDto::WaitingForNext => Ok(ActionStatus::WaitingForNext),
        ActionStatusDto::Processing => Ok(ActionStatus::Processing),
        ActionStatusDto::Failed => Ok(ActionStatus::Failed),
        ActionStatusDto::Success => Ok(ActionStatus::Success),
        ActionStatusDto::Canceled => Err(ProviderError::Unsupported("action status CANCELED".into())),
    }
}

fn map_action_transactions(transactions: &[ActionTransactionDto]) -> Vec<ActionTransaction> {
    transactions
        .iter()
        .filter(|transaction| transaction.status != TransactionStatusDto::Skipped)
        .map(|transaction| ActionTransaction {
            id: transaction.id.clone(),
            step_index: transaction.step_index,
        })
        .collect()
}

/// Map an enter, exit or pending-action response. `label` names the call in errors.
pub fn map_provider_action(response: ActionDto, label: &str) -> Result<ProviderAction, ProviderError> {
    let transactions = map_action_transactions(response.transactions.as_deref().unwrap_or_default());
    if transactions.is_empty() {
        return Err(ProviderError::MissingField(format!("{label}.transactions")));
    }

    let amount = response
        .amount
        .as_deref()
        .and_then(parse_amount)
        .ok_or_else(|| ProviderError::MissingField(format!("{label}.amount")))?;

    Ok(ProviderAction {
        id: response.id,
        status: map_action_status(response.status)?,
        amount,
        current_step_index: response.current_step_index,
        transactions,
    })
}

/// Map the wallet's in-flight actions. Non-positive amounts are dropped.
pub fn map_pending_actions(response: ActionListResponse) -> Result<Vec<PendingAction>, ProviderError> {
    let mut actions = Vec::with_capacity(response.data.len());
    for action in response.data {
        let amount = action
            .amount
            .as_deref()
            .and_then(parse_amount)
            .ok_or_else(|| ProviderError::MissingField("PendingAction.amount".into()))?;

        if amount <= Amount::zero() {
            continue;
        }

        actions.push(PendingAction {
            transactions: map_action_transactions(action.transactions.as_deref().unwrap_or_default()),
            target_address: action
                .validator_address
                .or_else(|| action.validator_addresses.and_then(|v| v.into_iter().next())),
            id: action.id,
            account_addresses: action.account_addresses,
            status: map_action_status(action.status)?,
            amount,
            kind: map_action_kind(action.action_type)?,
            current_step_index: action.current_step_index,
        });
    }
    Ok(actions)
}

/// Fee figure of an estimate-gas response.
pub fn map_fee(response: GasEstimateDto) -> Result<Amount, ProviderError> {
    response
        .amount
        .as_deref()
        .and_then(parse_amount)
        .ok_or_else(|| ProviderError::MissingField("GasEstimate.amount".into()))
}

// ── Transactions ───────────────────────────────────────────────────────

pub fn map_transaction_step(response: TransactionResponse) -> Result<TransactionStep, ProviderError> {
    let unsigned = response
        .unsigned_transaction
        .ok_or_else(|| ProviderError::MissingField("Transaction.unsignedTransaction".into()))?;

    let fee = response
        .gas_estimate
        .and_then(|estimate| estimate.amount)
        .as_deref()
        .and_then(parse_amount)
        .ok_or_else(|| ProviderError::MissingField("Transaction.gasEstimate".into()))?;

    let stake_id = response
        .stake_id
        .ok_or_else(|| ProviderError::MissingField("Transaction.stakeId".into()))?;

    let unsigned_data = map_unsigned_data(unsigned, &response.network)?;

    Ok(TransactionStep {
        unsigned_data,
        fee,
        metadata: TransactionMetadata {
            id: response.id,
            action_id: stake_id,
            kind: response.transaction_type,
            status: response.status,
            step_index: response.step_index,
        },
        network: response.network,
    })
}

/// Tron data is a JSON transaction whose `raw_data_hex` is what gets signed.
pub fn map_unsigned_data(unsigned: String, network: &str) -> Result<String, ProviderError> {
    if network != StakingNetwork::Tron.provider_id() {
        return Ok(unsigned);
    }
    let tron: TronTransactionDto = serde_json::from_str(&unsigned)
        .map_err(|e| ProviderError::InvalidResponse(format!("tron transaction: {e}")))?;
    Ok(tron.raw_data_hex)
}

// ── Balances ───────────────────────────────────────────────────────────

pub fn map_token(token: &TokenDto) -> Result<StakeTokenItem, ProviderError> {
    let network = StakingNetwork::from_provider_id(&token.network)
        .ok_or_else(|| ProviderError::Unsupported(format!("network {}", token.network)))?;
    Ok(StakeTokenItem {
        network,
        contract_address: token.address.clone(),
        name: token.name.clone(),
        decimals: token.decimals,
        symbol: token.symbol.clone(),
    })
}

pub fn map_balance_type(balance: &BalanceDto) -> Result<BalanceType, ProviderError> {
    match balance.balance_type {
        BalanceTypeDto::Available => Err(ProviderError::Unsupported("balance type available".into())),
        BalanceTypeDto::Locked => Ok(BalanceType::Locked),
        BalanceTypeDto::Preparing => Ok(BalanceType::Warmup),
        BalanceTypeDto::Staked => Ok(BalanceType::Active),
        BalanceTypeDto::Unstaking | BalanceTypeDto::Unlocking => {
            Ok(BalanceType::Unbonding { until: balance.date })
        }
        BalanceTypeDto::Unstaked => Ok(BalanceType::Unstaked),
        BalanceTypeDto::Rewards => Ok(BalanceType::Rewards),
    }
}

/// Map the balances of the first (and only requested) integration.
///
/// Zero and unparsable amounts are skipped. On networks that fold rewards into the
/// staked figure, the rewards total is subtracted from every non-reward balance.
pub fn map_balances(response: Vec<BalancesResponse>) -> Result<Vec<RawBalance>, ProviderError> {
    let Some(first) = response.into_iter().next() else {
        return Ok(Vec::new());
    };
    let balances = first.balances;

    let rewards_total = balances
        .iter()
        .filter(|balance| balance.balance_type == BalanceTypeDto::Rewards)
        .filter_map(|balance| parse_amount(&balance.amount))
        .fold(Amount::zero(), |acc, amount| acc + amount);

    let mut mapped = Vec::with_capacity(balances.len());
    for balance in &balances {
        let Some(mut amount) = parse_amount(&balance.amount) else {
            continue;
        };

        let item = map_token(&balance.token)?;
        if item.network.rewards_included_in_balance()
            && balance.balance_type != BalanceTypeDto::Rewards
        {
            amount = amount - &rewards_total;
        }

        if amount <= Amount::zero() {
            continue;
        }

        let actions = balance
            .pending_actions
            .iter()
            .map(|action| {
                Ok(BalanceAction {
                    kind: map_action_kind(action.action_type)?,
                    passthrough: action.passthrough.clone(),
                })
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;

        let constraints = balance
            .pending_action_constraints
            .as_ref()
            .map(|constraints| {
                constraints
                    .iter()
                    .map(|constraint| {
                        Ok(ActionConstraint {
                            kind: map_action_kind(constraint.action_type)?,
                            minimum: constraint.amount.minimum.clone(),
                            maximum: constraint.amount.maximum.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>, ProviderError>>()
            })
            .transpose()?;

        mapped.push(RawBalance {
            item,
            amount,
            account_address: balance.account_address.clone(),
            balance_type: map_balance_type(balance)?,
            target_address: balance
                .validator_address
                .clone()
                .or_else(|| balance.validator_addresses.as_ref().and_then(|v| v.first().cloned())),
            actions,
            constraints,
        });
    }
    Ok(mapped)
}

// ── Yield ──────────────────────────────────────────────────────────────

fn map_reward_type(reward_type: RewardTypeDto) -> Result<RewardType, ProviderError> {
    match reward_type {
        RewardTypeDto::Apr => Ok(RewardType::Apr),
        RewardTypeDto::Apy => Ok(RewardType::Apy),
        RewardTypeDto::Variable => Err(ProviderError::Unsupported("reward type variable".into())),
    }
}

fn map_target_status(status: ValidatorStatusDto) -> TargetStatus {
    match status {
        ValidatorStatusDto::Active => TargetStatus::Active,
        ValidatorStatusDto::Jailed => TargetStatus::Jailed,
        ValidatorStatusDto::Deactivating => TargetStatus::Deactivating,
        ValidatorStatusDto::Inactive => TargetStatus::Inactive,
        ValidatorStatusDto::Full => TargetStatus::Full,
    }
}

/// Gross reward rate: the validator's net APR grossed up by its commission.
fn map_reward_rate(validator: &ValidatorDto) -> Amount {
    let Some(apr) = &validator.apr else {
        return Amount::zero();
    };
    let commission = validator.commission.clone().unwrap_or_else(Amount::zero);
    let divisor = Amount::one() - commission;
    if divisor <= Amount::zero() {
        return apr.clone();
    }
    apr / divisor
}

pub fn map_target(
    validator: &ValidatorDto,
    reward_type: RewardType,
    partner_name: Option<&str>,
) -> StakingTarget {
    let partner = match (validator.name.as_deref(), partner_name) {
        (Some(name), Some(partner)) => name.trim().eq_ignore_ascii_case(partner.trim()),
        _ => false,
    };
    StakingTarget {
        address: validator.address.clone(),
        name: validator.name.clone().unwrap_or_else(|| "No name".to_string()),
        preferred: validator.preferred.unwrap_or(false),
        partner,
        icon_url: validator.image.clone(),
        reward_type,
        reward_rate: map_reward_rate(validator),
        status: map_target_status(validator.status),
    }
}

pub fn map_reward_schedule(raw: &str, item: &StakeTokenItem) -> RewardScheduleType {
    match item.network {
        StakingNetwork::Solana => RewardScheduleType::Days { min: 2, max: 3 },
        StakingNetwork::Cosmos => RewardScheduleType::Seconds { min: 5, max: 12 },
        StakingNetwork::Tron | StakingNetwork::Bsc => RewardScheduleType::Daily,
        StakingNetwork::Ethereum if item.is_polygon() => RewardScheduleType::Daily,
        StakingNetwork::Ton => RewardScheduleType::Days { min: 1, max: 2 },
        _ => RewardScheduleType::Generic(raw.to_string()),
    }
}

pub fn map_yield_info(
    response: YieldResponse,
    partner_name: Option<&str>,
) -> Result<YieldInfo, ProviderError> {
    let (Some(enter), Some(exit)) = (&response.args.enter, &response.args.exit) else {
        return Err(ProviderError::MissingField("Yield.args.enter/exit".into()));
    };

    let item = map_token(&response.token)?;
    let reward_type = map_reward_type(response.reward_type)?;
    let targets = response
        .validators
        .iter()
        .map(|validator| map_target(validator, reward_type, partner_name))
        .collect::<Vec<_>>();

    let mut preferred_targets = targets
        .iter()
        .filter(|target| target.preferred)
        .cloned()
        .collect::<Vec<_>>();
    // Partners first, then highest reward rate.
    preferred_targets.sort_by(|lhs, rhs| {
        rhs.partner
            .cmp(&lhs.partner)
            .then_with(|| rhs.reward_rate.cmp(&lhs.reward_rate))
    });

    let preferred_rates = preferred_targets
        .iter()
        .map(|target| target.reward_rate.clone())
        .collect::<Vec<_>>();

    Ok(YieldInfo {
        id: response.id,
        is_available: response.is_available,
        reward_type,
        reward_rate_values: RewardRateValues::new(&preferred_rates, response.reward_rate),
        enter_minimum_requirement: enter.args.amount.minimum.clone().unwrap_or_else(Amount::zero),
        exit_minimum_requirement: exit.args.amount.minimum.clone().unwrap_or_else(Amount::zero),
        targets,
        preferred_targets,
        unbonding_period: Period {
            days: response.metadata.cooldown_period.days,
        },
        warmup_period: Period {
            days: response.metadata.warmup_period.days,
        },
        reward_claiming_type: match response.metadata.reward_claiming {
            RewardClaimingDto::Auto => RewardClaimingType::Auto,
            RewardClaimingDto::Manual => RewardClaimingType::Manual,
        },
        reward_schedule_type: map_reward_schedule(&response.metadata.reward_schedule, &item),
        item,
        maximum_stake_amount: None,
    })
}
