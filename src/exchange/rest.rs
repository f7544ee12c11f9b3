//! REST client for the CLOB API
//!
//! This is the single place where raw HTTP outcomes become typed results:
//! order-placement failures leave here already classified as
//! [`ExchangeError`]s, so nothing downstream inspects status codes or bodies.
//!
//! Order signing and L1/L2 auth headers are owned by the deployment layer
//! (default headers on the underlying client); this module only speaks the
//! wire format.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use super::messages::{OrderBookResponse, OrderPostResponse, SimplifiedMarketsResponse};
use crate::common::errors::{BotError, ExchangeError, Result};
use crate::common::traits::{MarketDataProvider, TradeExecutor};
use crate::common::types::{BookTop, MarketSnapshot, OrderPlan};
use crate::config::ExchangeConfig;

/// REST client for the CLOB API
#[derive(Debug, Clone)]
pub struct ClobRestClient {
    client: Client,
    base_url: String,
}

impl ClobRestClient {
    /// Create a new client from exchange configuration
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        Self::with_timeout(
            &config.rest_url,
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    /// Create a new client with a custom timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Post an order and classify any HTTP failure at this boundary
    #[instrument(skip(self, plan), fields(market_id = %plan.market_id))]
    pub async fn post_order(
        &self,
        plan: &OrderPlan,
    ) -> std::result::Result<OrderPostResponse, ExchangeError> {
        let url = format!("{}/order", self.base_url);
        let body = serde_json::json!({
            "tokenID": plan.token_id,
            "side": plan.side,
            "orderType": plan.order_type,
            "amount": plan.size_usd,
            "price": plan.price,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ExchangeError::transport)?;

        let status = response.status().as_u16();
        let has_cf_ray = response.headers().contains_key("cf-ray");

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::from_response(status, body, has_cf_ray));
        }

        response
            .json::<OrderPostResponse>()
            .await
            .map_err(ExchangeError::transport)
    }

    /// Get top of book for a token
    #[instrument(skip(self))]
    pub async fn get_book_top(&self, token_id: &str) -> Result<BookTop> {
        let url = format!("{}/book?token_id={}", self.base_url, token_id);
        debug!("Fetching order book from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, body
            )));
        }

        let book: OrderBookResponse = response.json().await?;
        Ok(BookTop {
            best_bid: book.bids.first().and_then(|l| l.price.parse().ok()),
            best_ask: book.asks.first().and_then(|l| l.price.parse().ok()),
        })
    }

    /// Get the simplified markets list, one page
    #[instrument(skip(self))]
    pub async fn get_simplified_markets(&self) -> Result<SimplifiedMarketsResponse> {
        let url = format!("{}/simplified-markets", self.base_url);
        debug!("Fetching simplified markets from: {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MarketDataProvider for ClobRestClient {
    async fn get_active_markets(&self) -> Result<Vec<MarketSnapshot>> {
        let markets = self.get_simplified_markets().await?;
        let mut snapshots = Vec::new();

        for market in markets.data {
            if !market.active || market.closed {
                continue;
            }
            let yes = market
                .tokens
                .iter()
                .find(|t| t.outcome.eq_ignore_ascii_case("yes"));
            let no = market
                .tokens
                .iter()
                .find(|t| t.outcome.eq_ignore_ascii_case("no"));
            let (yes, no) = match (yes, no) {
                (Some(y), Some(n)) => (y, n),
                _ => continue,
            };

            let yes_top = self.get_order_book_top(&yes.token_id).await?;
            let no_top = self.get_order_book_top(&no.token_id).await?;

            snapshots.push(MarketSnapshot {
                market_id: market.condition_id.clone(),
                yes_token_id: yes.token_id.clone(),
                no_token_id: no.token_id.clone(),
                yes_top,
                no_top,
                liquidity_usd: market.liquidity.as_deref().and_then(|l| l.parse().ok()),
                end_time: market
                    .end_date_iso
                    .as_deref()
                    .and_then(|d| d.parse().ok()),
            });
        }

        Ok(snapshots)
    }

    async fn get_order_book_top(&self, token_id: &str) -> Result<BookTop> {
        self.get_book_top(token_id).await
    }
}

#[async_trait]
impl TradeExecutor for ClobRestClient {
    async fn execute(
        &self,
        plan: &OrderPlan,
    ) -> std::result::Result<OrderPostResponse, ExchangeError> {
        self.post_order(plan).await
    }
}
