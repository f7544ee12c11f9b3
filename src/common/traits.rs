//! Collaborator traits consumed by the core
//!
//! Market data, risk management, and order execution are supplied by the
//! orchestrator as constructor-injected implementations of these traits.
//! Nothing in the core reaches for module-level singletons; lifecycle
//! (init/reset) is an explicit call on an owned instance.

use async_trait::async_trait;

use super::errors::{ExchangeError, Result};
use super::types::{BookTop, MarketSnapshot, OrderPlan, Opportunity};
use crate::exchange::messages::OrderPostResponse;

/// Supplies per-cycle market input to the strategy
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch snapshots of all currently active markets
    async fn get_active_markets(&self) -> Result<Vec<MarketSnapshot>>;

    /// Fetch top of book for a single token
    async fn get_order_book_top(&self, token_id: &str) -> Result<BookTop>;
}

/// The underlying order-placement call wrapped by the submission controller
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    /// Place an order on the exchange
    ///
    /// HTTP-level failures must arrive pre-classified as [`ExchangeError`]s.
    async fn execute(&self, plan: &OrderPlan) -> std::result::Result<OrderPostResponse, ExchangeError>;
}

/// Verdict from the risk manager on a single opportunity
#[derive(Debug, Clone, PartialEq)]
pub struct RiskVerdict {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl RiskVerdict {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Gas balance check result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasBalance {
    pub ok: bool,
    pub balance: f64,
}

/// Risk gate and trade lifecycle hooks, invoked by the engine around
/// controller calls
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RiskManager: Send + Sync {
    /// Gate a single opportunity before submission
    fn can_execute(&self, opportunity: &Opportunity) -> RiskVerdict;

    /// Verify there is enough gas to settle on-chain legs
    async fn ensure_gas_balance(&self) -> Result<GasBalance>;

    fn on_trade_submitted(&self, opportunity: &Opportunity);
    fn on_trade_success(&self, opportunity: &Opportunity);
    fn on_trade_failure(&self, opportunity: &Opportunity);
}

/// Read access to current exposure, injected into the strategy for sizing
///
/// Implementations are owned by the orchestrator (typically backed by the
/// position store) so the strategy itself stays pure.
#[cfg_attr(test, mockall::automock)]
pub trait ExposureSource: Send + Sync {
    /// Current exposure in one market, in USD
    fn market_exposure_usd(&self, market_id: &str) -> f64;

    /// Current wallet-wide exposure, in USD
    fn wallet_exposure_usd(&self) -> f64;
}

/// Boxed provider for dynamic dispatch
pub type BoxedMarketDataProvider = Box<dyn MarketDataProvider>;

/// Boxed executor for dynamic dispatch
pub type BoxedTradeExecutor = Box<dyn TradeExecutor>;

/// Boxed risk manager for dynamic dispatch
pub type BoxedRiskManager = Box<dyn RiskManager>;

/// Zero-exposure source for tests and dry runs
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExposure;

impl ExposureSource for NoExposure {
    fn market_exposure_usd(&self, _market_id: &str) -> f64 {
        0.0
    }

    fn wallet_exposure_usd(&self) -> f64 {
        0.0
    }
}
