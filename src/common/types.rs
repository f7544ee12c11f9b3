//! Unified types shared across the strategy, execution, and position layers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order time-in-force semantics supported by the CLOB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Fill-or-kill: fills immediately or is cancelled with zero fill
    Fok,
    /// Good-till-cancelled limit order
    Gtc,
}

/// Top of book for one leg (YES or NO token)
///
/// Raw prices as reported upstream. Either side may be missing on a
/// one-sided book, and values are not yet unit-normalized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BookTop {
    pub best_bid: Option<f64>,
    pub best_ask: Option<f64>,
}

impl BookTop {
    pub fn new(best_bid: f64, best_ask: f64) -> Self {
        Self {
            best_bid: Some(best_bid),
            best_ask: Some(best_ask),
        }
    }
}

/// Immutable per-scan snapshot of one binary market
///
/// Produced once per scan cycle by the market data provider; the strategy
/// never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Market/condition identifier
    pub market_id: String,
    /// Token ID for the YES outcome
    pub yes_token_id: String,
    /// Token ID for the NO outcome
    pub no_token_id: String,
    /// Top of book for the YES leg
    pub yes_top: BookTop,
    /// Top of book for the NO leg
    pub no_top: BookTop,
    /// Reported market liquidity in USD, when known
    pub liquidity_usd: Option<f64>,
    /// Market end/resolution time, when known
    pub end_time: Option<DateTime<Utc>>,
}

/// A sized, fully-filtered arbitrage opportunity
///
/// Immutable once constructed; consumed by the risk manager and executor
/// within the same scan cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub market_id: String,
    pub yes_token_id: String,
    pub no_token_id: String,
    /// Normalized YES ask price (0.0 to 1.0)
    pub yes_ask: f64,
    /// Normalized NO ask price (0.0 to 1.0)
    pub no_ask: f64,
    /// Basis points of discount below $1.00 on the combined ask cost
    pub edge_bps: f64,
    /// Wider-leg bid/ask spread in basis points
    pub spread_bps: f64,
    /// Estimated net profit in USD after modeled fees and slippage
    pub est_profit_usd: f64,
    /// Position size in USD after exposure clipping
    pub size_usd: f64,
    /// Which cap (if any) clipped the size
    pub size_tier: SizeTier,
    pub liquidity_usd: Option<f64>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Which cap bounded a computed position size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeTier {
    Uncapped,
    CappedByMarket,
    CappedByWallet,
    NoRoom,
}

impl std::fmt::Display for SizeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeTier::Uncapped => write!(f, "uncapped"),
            SizeTier::CappedByMarket => write!(f, "capped_by_market"),
            SizeTier::CappedByWallet => write!(f, "capped_by_wallet"),
            SizeTier::NoRoom => write!(f, "no_room"),
        }
    }
}

/// An order ready to be placed, produced from an [`Opportunity`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlan {
    pub market_id: String,
    pub token_id: String,
    pub side: Side,
    pub order_type: OrderType,
    /// Spend amount in USD (market orders) or size in shares (limit orders)
    pub size_usd: f64,
    /// Limit price; `None` for market orders
    pub price: Option<f64>,
}

/// Fill information extracted from an order-placement response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillInfo {
    /// Amount taken from the book, as reported (numeric string)
    pub taking_amount: String,
    /// Amount made on the book, as reported (numeric string)
    pub making_amount: String,
    /// Exchange-reported order status, when present
    pub status: Option<String>,
}

/// One historical trade from the exchange's trade-history feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTrade {
    /// Unix timestamp in seconds
    pub timestamp: f64,
    pub side: Side,
    /// Size in shares
    pub size: f64,
    /// Price per share in dollars (0.0 to 1.0)
    pub price: f64,
}

/// Entry metadata reconstructed from a trade history
///
/// Purely a function of `(trades, now)`, so identical inputs yield identical
/// output across process restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMeta {
    /// Weighted-average entry price, in cents
    pub avg_entry_price_cents: f64,
    /// When the open position lineage was first acquired (unix ms)
    pub first_acquired_at_ms: i64,
    /// Most recent acquisition in the lineage (unix ms)
    pub last_acquired_at_ms: i64,
    /// Whole seconds held since first acquisition
    pub time_held_sec: i64,
    /// Shares still held
    pub remaining_shares: f64,
}
