//! Strategy module - opportunity scanning and position sizing
//!
//! # Architecture
//!
//! ```text
//! MarketSnapshot[] ──► IntraMarketArbStrategy.find_opportunities
//!                         │  normalize ► sanity ► liquidity ► horizon
//!                         │  ► edge ► spread ► sizing ► profit
//!                         ▼
//!                      Opportunity[] + ArbDiagnostics
//! ```
//!
//! The strategy is synchronous and pure given its inputs; sizing consults
//! only the injected [`ExposureSource`](crate::common::traits::ExposureSource).

pub mod bps;
pub mod intra_market_arb;
pub mod sizing;

pub use intra_market_arb::{
    ArbDiagnostics, CandidateSnapshot, CandidateStatus, IntraMarketArbStrategy, SkipReason,
};
pub use sizing::{compute_size_usd, SizedAmount, SizingInputs};
