use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use indexmap::IndexMap;
use nonzero_ext::nonzero;
use reqwest::{Client, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::{get_env_var, get_env_var_opt};
use snafu::ResultExt;

use crate::{
    models::{
        asset::AssetClass,
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidApiKeySnafu, MissingEnvVarSnafu,
        ProviderError, ProviderInitError, RateLimitedSnafu, ReqwestSnafu, ValidationSnafu,
        alpaca_rest::{
            params::{construct_params, validate_timeframe},
            response::{AlpacaBar, AlpacaResponse},
        },
    },
};

const BASE_URL: &str = "https://data.alpaca.markets/v2/stocks/bars";

/// Alpaca's free plan allows 200 data requests per minute.
fn default_requests_per_minute() -> NonZeroU32 {
    nonzero!(200u32)
}

pub struct AlpacaProvider {
    client: Client,
    base_url: String,
    limiter: DefaultDirectRateLimiter,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables. `APCA_DATA_URL` overrides the bars endpoint.
    pub fn new() -> Result<Self, ProviderInitError> {
        let api_key = SecretString::from(get_env_var("APCA_API_KEY_ID").context(MissingEnvVarSnafu)?);
        let secret_key =
            SecretString::from(get_env_var("APCA_API_SECRET_KEY").context(MissingEnvVarSnafu)?);
        let base_url = get_env_var_opt("APCA_DATA_URL").unwrap_or_else(|| BASE_URL.to_string());
        Self::with_credentials(api_key, secret_key, base_url, default_requests_per_minute())
    }

    /// Creates a provider from explicit credentials and a request quota.
    pub fn with_credentials(
        api_key: SecretString,
        secret_key: SecretString,
        base_url: impl Into<String>,
        requests_per_minute: NonZeroU32,
    ) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        let mut key_value =
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?;
        key_value.set_sensitive(true);
        let mut secret_value =
            header::HeaderValue::from_str(secret_key.expose_secret()).context(InvalidApiKeySnafu)?;
        secret_value.set_sensitive(true);
        headers.insert("APCA-API-KEY-ID", key_value);
        headers.insert("APCA-API-SECRET-KEY", secret_value);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            limiter: RateLimiter::direct(Quota::per_minute(requests_per_minute)),
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }

    /// Replaces the client-side request quota.
    pub fn with_requests_per_minute(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.limiter = RateLimiter::direct(Quota::per_minute(requests_per_minute));
        self
    }

    async fn fetch_page(
        &self,
        query: &[(String, String)],
    ) -> Result<AlpacaResponse, ProviderError> {
        self.limiter.until_ready().await;

        let response = self
            .client
            .get(&self.base_url)
            .query(query)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let message = response.text().await.unwrap_or_default();
            return RateLimitedSnafu {
                message: error_message(status, &message),
                retry_after,
            }
            .fail();
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return ApiSnafu {
                status: status.as_u16(),
                message: error_message(status, &message),
            }
            .fail();
        }

        response.json::<AlpacaResponse>().await.context(ReqwestSnafu)
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown API error")
            .to_string()
    } else {
        body.to_string()
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        validate_timeframe(&params.timeframe)?;
        if params.symbols.is_empty() {
            return ValidationSnafu {
                message: "at least one symbol is required",
            }
            .fail();
        }
        // The stock bars endpoint does not serve index symbols; leave them
        // out so callers report them per symbol.
        if params.asset_class == AssetClass::Index {
            tracing::warn!(
                symbols = ?params.symbols,
                "alpaca has no index bars, skipping request"
            );
            return Ok(Vec::new());
        }

        let mut all_bars: IndexMap<String, Vec<AlpacaBar>> = IndexMap::new();
        let mut next_page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut query = construct_params(&params);
            if let Some(token) = &next_page_token {
                query.push(("page_token".to_string(), token.clone()));
            }

            let page = self.fetch_page(&query).await?;
            pages += 1;

            // Merge the bars from the current page into our collection.
            for (symbol, bars) in page.bars.unwrap_or_default() {
                all_bars.entry(symbol).or_default().extend(bars);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => next_page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(
            pages,
            symbols = all_bars.len(),
            "fetched bars from Alpaca"
        );

        let result = all_bars
            .into_iter()
            .map(|(symbol, alpaca_bars)| {
                let bars: Vec<Bar> = alpaca_bars.into_iter().map(Bar::from).collect();
                BarSeries::new(symbol, params.timeframe, bars)
            })
            .collect();

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "alpaca"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_error_body_falls_back_to_reason() {
        assert_eq!(
            error_message(StatusCode::TOO_MANY_REQUESTS, "  "),
            "Too Many Requests"
        );
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, "{\"message\":\"forbidden.\"}"),
            "{\"message\":\"forbidden.\"}"
        );
    }

    #[test]
    fn header_values_reject_control_characters() {
        let result = AlpacaProvider::with_credentials(
            SecretString::from("key\nwith-newline"),
            SecretString::from("secret"),
            BASE_URL,
            default_requests_per_minute(),
        );
        assert!(matches!(result, Err(ProviderInitError::InvalidApiKey { .. })));
    }

    #[tokio::test]
    async fn index_symbols_are_skipped_without_a_request() {
        // Nothing listens here; any request would fail with a Reqwest error.
        let provider = AlpacaProvider::with_credentials(
            SecretString::from("key"),
            SecretString::from("secret"),
            "http://127.0.0.1:9/v2/stocks/bars",
            default_requests_per_minute(),
        )
        .unwrap();
        let start = chrono::Utc::now() - chrono::Duration::days(30);
        let mut params =
            BarsRequestParams::daily(vec!["^GSPC".into()], start, chrono::Utc::now());
        params.asset_class = AssetClass::Index;

        let series = provider.fetch_bars(params).await.unwrap();
        assert!(series.is_empty());
    }
}
