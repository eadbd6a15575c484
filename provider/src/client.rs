//! HTTP implementation of [`StakingProvider`] over the provider's REST API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use stakesync_types::{
    ActionGenericRequest, Amount, PendingAction, PendingActionRequest, ProviderAction, RawBalance,
    StakingWallet, TransactionStep, YieldInfo,
};

use crate::dto::{
    ActionDto, ActionListResponse, AddressDto, AdditionalAddressesDto, BalancesRequest,
    BalancesResponse, GasEstimateDto, TransactionResponse, YieldResponse,
};
use crate::error::ProviderError;
use crate::mapper;
use crate::StakingProvider;

/// Default timeout for provider requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Action statuses that count as "in flight" when listing the wallet's actions.
const IN_FLIGHT_STATUSES: &str = "CREATED,WAITING_FOR_NEXT,PROCESSING";

/// Header carrying the provider API key.
const API_KEY_HEADER: &str = "X-API-KEY";

/// Connection settings for [`HttpStakingProvider`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpProviderConfig {
    /// Base URL, e.g. `https://api.stakek.it`.
    pub base_url: String,
    pub api_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Validators with this display name are flagged as partners.
    #[serde(default)]
    pub partner_name: Option<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// Staking provider reached over HTTP.
#[derive(Clone)]
pub struct HttpStakingProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    partner_name: Option<String>,
}

impl HttpStakingProvider {
    pub fn new(config: HttpProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Other(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            partner_name: config.partner_name,
        })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a prepared request and decode its JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, ProviderError> {
        tracing::debug!(call = what, "provider request");

        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(call = what, status = status.as_u16(), "provider request failed");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("{what}: {e}")))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T, ProviderError> {
        self.send(self.http.get(self.url(path)).query(query), what)
            .await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        what: &str,
    ) -> Result<T, ProviderError> {
        self.send(self.http.post(self.url(path)).json(body), what)
            .await
    }

    fn wallet_address(wallet: &StakingWallet) -> AddressDto {
        AddressDto {
            address: wallet.address.clone(),
            additional_addresses: wallet.additional_addresses.as_ref().map(|additional| {
                AdditionalAddressesDto {
                    cosmos_pub_key: additional.cosmos_pub_key.clone(),
                }
            }),
        }
    }
}

#[async_trait]
impl StakingProvider for HttpStakingProvider {
    async fn fetch_balances(&self, wallet: &StakingWallet) -> Result<Vec<RawBalance>, ProviderError> {
        let Some(integration_id) = &wallet.integration_id else {
            return Ok(Vec::new());
        };
        let body = [BalancesRequest {
            addresses: Self::wallet_address(wallet),
            integration_id: integration_id.clone(),
        }];
        let response: Vec<BalancesResponse> =
            self.post("v1/yields/balances", &body, "balances").await?;
        mapper::map_balances(response)
    }

    async fn fetch_yield(&self, integration_id: &str) -> Result<YieldInfo, ProviderError> {
        let response: YieldResponse = self
            .get(&format!("v1/yields/{integration_id}"), &[], "yield")
            .await?;
        mapper::map_yield_info(response, self.partner_name.as_deref())
    }

    async fn fetch_pending_actions(
        &self,
        wallet: &StakingWallet,
    ) -> Result<Vec<PendingAction>, ProviderError> {
        let query = [
            ("walletAddress", wallet.address.as_str()),
            ("network", wallet.item.network.provider_id()),
            ("status", IN_FLIGHT_STATUSES),
        ];
        let response: ActionListResponse = self.get("v1/actions", &query, "actions").await?;
        mapper::map_pending_actions(response)
    }

    async fn estimate_enter_fee(&self, request: &ActionGenericRequest) -> Result<Amount, ProviderError> {
        let body = mapper::map_action_request(request);
        let response: GasEstimateDto = self
            .post("v1/actions/enter/estimate-gas", &body, "estimate enter")
            .await?;
        mapper::map_fee(response)
    }

    async fn estimate_exit_fee(&self, request: &ActionGenericRequest) -> Result<Amount, ProviderError> {
        let body = mapper::map_action_request(request);
        let response: GasEstimateDto = self
            .post("v1/actions/exit/estimate-gas", &body, "estimate exit")
            .await?;
        mapper::map_fee(response)
    }

    async fn estimate_pending_fee(
        &self,
        request: &PendingActionRequest,
    ) -> Result<Amount, ProviderError> {
        let body = mapper::map_pending_request(request);
        let response: GasEstimateDto = self
            .post("v1/actions/pending/estimate-gas", &body, "estimate pending")
            .await?;
        mapper::map_fee(response)
    }

    async fn submit_enter(
        &self,
        request: &ActionGenericRequest,
    ) -> Result<ProviderAction, ProviderError> {
        let body = mapper::map_action_request(request);
        let response: ActionDto = self.post("v1/actions/enter", &body, "enter").await?;
        mapper::map_provider_action(response, "EnterAction")
    }

    async fn submit_exit(
        &self,
        request: &ActionGenericRequest,
    ) -> Result<ProviderAction, ProviderError> {
        let body = mapper::map_action_request(request);
        let response: ActionDto = self.post("v1/actions/exit", &body, "exit").await?;
        mapper::map_provider_action(response, "ExitAction")
    }

    async fn submit_pending(
        &self,
        request: &PendingActionRequest,
    ) -> Result<ProviderAction, ProviderError> {
        let body = mapper::map_pending_request(request);
        let response: ActionDto = self.post("v1/actions/pending", &body, "pending").await?;
        mapper::map_provider_action(response, "PendingAction")
    }

    async fn patch_transaction_step(&self, id: &str) -> Result<TransactionStep, ProviderError> {
        let request = self
            .http
            .patch(self.url(&format!("v1/transactions/{id}")))
            .json(&serde_json::json!({}));
        let response: TransactionResponse = self.send(request, "patch transaction").await?;
        mapper::map_transaction_step(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> HttpProviderConfig {
        HttpProviderConfig {
            base_url: base_url.into(),
            api_key: "key".into(),
            timeout_secs: 5,
            partner_name: None,
        }
    }

    #[test]
    fn base_url_is_normalized() {
        let provider = HttpStakingProvider::new(config("https://api.example.com/")).unwrap();
        assert_eq!(provider.base_url(), "https://api.example.com");
        assert_eq!(
            provider.url("/v1/yields/x"),
            "https://api.example.com/v1/yields/x"
        );
    }

    #[test]
    fn config_defaults_timeout() {
        let config: HttpProviderConfig =
            serde_json::from_str(r#"{"base_url": "http://localhost", "api_key": "k"}"#).unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.partner_name.is_none());
    }

    #[tokio::test]
    async fn unreachable_provider_is_reported_as_error() {
        // Port 9 (discard) is not expected to serve HTTP on the test host.
        let provider = HttpStakingProvider::new(config("http://127.0.0.1:9")).unwrap();
        let result = provider.fetch_yield("solana-sol-native-multivalidator-staking").await;
        assert!(result.is_err());
    }
}
