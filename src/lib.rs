//! Polyarb Library
//!
//! An automated trading bot core for binary-outcome prediction markets:
//! intra-market arbitrage scanning, throttled order submission with failure
//! classification, and trade-history cost-basis reconstruction.

pub mod common;
pub mod config;
pub mod engine;
pub mod exchange;
pub mod execution;
pub mod position;
pub mod strategy;

// Re-export commonly used types
pub use common::errors::{BotError, ExchangeError, ExchangeErrorKind, Result};
pub use common::traits::{
    ExposureSource, GasBalance, MarketDataProvider, RiskManager, RiskVerdict, TradeExecutor,
};
pub use common::types::{
    BookTop, EntryMeta, FillInfo, HistoryTrade, MarketSnapshot, Opportunity, OrderPlan, OrderType,
    Side, SizeTier,
};
pub use config::{AppConfig, ArbConfig, SizeScaling, SubmissionConfig};
pub use engine::{CycleSummary, TradingEngine};
pub use exchange::ClobRestClient;
pub use execution::{
    extract_fill_info, fok_killed, OrderSubmissionController, SubmitFailReason, SubmitReceipt,
    SubmitSkipReason,
};
pub use position::{reconcile_shares, resolve_entry_meta, ShareReconciliation};
pub use strategy::{
    compute_size_usd, ArbDiagnostics, CandidateSnapshot, CandidateStatus, IntraMarketArbStrategy,
    SkipReason,
};
