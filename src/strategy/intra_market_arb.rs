//! Intra-market arbitrage strategy
//!
//! Scans a batch of market snapshots once per cycle and emits sized
//! opportunities where one YES share plus one NO share can be bought for
//! less than the $1.00 they jointly pay out. Every market passes through a
//! fixed chain of eligibility filters; the first failing filter assigns the
//! skip reason, and full-funnel diagnostics are kept for the most recent
//! scan.
//!
//! The scan is a pure function of `(markets, now)` and the injected
//! exposure accessor: no randomness, no hidden reads, markets processed in
//! input order with no cross-market ranking.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::common::traits::ExposureSource;
use crate::common::types::{BookTop, MarketSnapshot, Opportunity};
use crate::config::ArbConfig;
use crate::strategy::bps;
use crate::strategy::sizing::{compute_size_usd, SizingInputs};

/// Why a market was skipped during a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Non-finite, missing, or non-positive book values
    BadBook,
    /// Price looked cents-scaled and could not be fixed
    Units,
    /// Reported liquidity below the configured floor
    LowLiquidity,
    /// Combined-ask discount below the edge threshold
    LowEdge,
    /// Wider leg's bid/ask spread above the tolerance
    WideSpread,
    /// Estimated net profit below the floor
    LowProfit,
    /// Holding horizon too long, or no sizing room
    Other,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::BadBook => "bad_book",
            SkipReason::Units => "units",
            SkipReason::LowLiquidity => "low_liquidity",
            SkipReason::LowEdge => "low_edge",
            SkipReason::WideSpread => "wide_spread",
            SkipReason::LowProfit => "low_profit",
            SkipReason::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Outcome recorded on a candidate: exactly one of eligible or a skip reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateStatus {
    Eligible,
    Skipped(SkipReason),
}

/// Per-market working record built during a scan
///
/// Created fresh each scan for every market whose books normalize and pass
/// sanity, regardless of how the later filters turn out. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSnapshot {
    pub market_id: String,
    pub yes_bid: f64,
    pub yes_ask: f64,
    pub no_bid: f64,
    pub no_ask: f64,
    /// Combined ask cost of both legs
    pub sum: f64,
    pub edge_bps: f64,
    pub spread_bps: f64,
    pub status: CandidateStatus,
}

/// Full-funnel diagnostics for the most recent scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArbDiagnostics {
    pub candidates: Vec<CandidateSnapshot>,
    pub skip_counts: HashMap<SkipReason, u64>,
}

/// Both legs' tops after unit normalization and sanity checks
#[derive(Debug, Clone, Copy)]
struct NormalizedBooks {
    yes_bid: f64,
    yes_ask: f64,
    no_bid: f64,
    no_ask: f64,
}

/// Intra-market YES+NO arbitrage scanner
pub struct IntraMarketArbStrategy {
    config: ArbConfig,
    exposure: Box<dyn ExposureSource>,
    last_diagnostics: ArbDiagnostics,
}

impl IntraMarketArbStrategy {
    pub fn new(config: ArbConfig, exposure: Box<dyn ExposureSource>) -> Self {
        Self {
            config,
            exposure,
            last_diagnostics: ArbDiagnostics::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        "intra_market_arb"
    }

    /// Diagnostics for the most recent `find_opportunities` call
    ///
    /// Overwritten wholesale at the end of each scan, never partially.
    pub fn diagnostics(&self) -> &ArbDiagnostics {
        &self.last_diagnostics
    }

    /// Scan one batch of snapshots and return sized opportunities
    ///
    /// Never fails: a malformed market degrades diagnostics, not the scan.
    pub fn find_opportunities(
        &mut self,
        markets: &[MarketSnapshot],
        now: DateTime<Utc>,
    ) -> Vec<Opportunity> {
        let mut opportunities = Vec::new();
        let mut diagnostics = ArbDiagnostics::default();

        for market in markets {
            self.evaluate_market(market, now, &mut diagnostics, &mut opportunities);
        }

        debug!(
            scanned = markets.len(),
            eligible = opportunities.len(),
            "arb scan complete"
        );

        // Single assignment: readers see the previous snapshot or this one,
        // never a partially-built one.
        self.last_diagnostics = diagnostics;
        opportunities
    }

    fn evaluate_market(
        &self,
        market: &MarketSnapshot,
        now: DateTime<Utc>,
        diagnostics: &mut ArbDiagnostics,
        opportunities: &mut Vec<Opportunity>,
    ) {
        // Normalization and sanity failures are counted but produce no
        // candidate record.
        let books = match self.normalize_books(market) {
            Ok(b) => b,
            Err(reason) => {
                *diagnostics.skip_counts.entry(reason).or_insert(0) += 1;
                return;
            }
        };

        let edge = bps::edge_bps(books.yes_ask, books.no_ask);
        let spread = bps::spread_bps(books.yes_bid, books.yes_ask)
            .max(bps::spread_bps(books.no_bid, books.no_ask));

        let mut candidate = CandidateSnapshot {
            market_id: market.market_id.clone(),
            yes_bid: books.yes_bid,
            yes_ask: books.yes_ask,
            no_bid: books.no_bid,
            no_ask: books.no_ask,
            sum: books.yes_ask + books.no_ask,
            edge_bps: edge,
            spread_bps: spread,
            status: CandidateStatus::Eligible,
        };

        match self.apply_filters(market, &books, edge, spread, now) {
            Ok(opportunity) => {
                opportunities.push(opportunity);
            }
            Err(reason) => {
                candidate.status = CandidateStatus::Skipped(reason);
                *diagnostics.skip_counts.entry(reason).or_insert(0) += 1;
            }
        }

        diagnostics.candidates.push(candidate);
    }

    /// Eligibility filters in priority order, short-circuiting at the
    /// first failure
    fn apply_filters(
        &self,
        market: &MarketSnapshot,
        books: &NormalizedBooks,
        edge: f64,
        spread: f64,
        now: DateTime<Utc>,
    ) -> Result<Opportunity, SkipReason> {
        if let Some(liquidity) = market.liquidity_usd {
            if liquidity < self.config.min_liquidity_usd {
                return Err(SkipReason::LowLiquidity);
            }
        }

        if let Some(end_time) = market.end_time {
            if end_time - now > Duration::minutes(self.config.max_hold_minutes) {
                return Err(SkipReason::Other);
            }
        }

        if edge < self.config.min_edge_bps {
            return Err(SkipReason::LowEdge);
        }

        if spread > self.config.max_spread_bps {
            return Err(SkipReason::WideSpread);
        }

        let sized = compute_size_usd(&SizingInputs {
            base_usd: self.config.trade_base_usd,
            edge_bps: edge,
            scaling: self.config.size_scaling,
            reference_edge_bps: self.config.reference_edge_bps,
            max_scale_multiplier: self.config.max_scale_multiplier,
            max_position_usd: self.config.max_position_usd,
            max_wallet_exposure_usd: self.config.max_wallet_exposure_usd,
            market_exposure_usd: self.exposure.market_exposure_usd(&market.market_id),
            wallet_exposure_usd: self.exposure.wallet_exposure_usd(),
        });
        if sized.size_usd <= 0.0 {
            return Err(SkipReason::Other);
        }

        let est_profit = bps::estimate_profit_usd(
            sized.size_usd,
            edge,
            self.config.fee_bps,
            self.config.slippage_bps,
        );
        if est_profit < self.config.min_profit_usd {
            return Err(SkipReason::LowProfit);
        }

        Ok(Opportunity {
            market_id: market.market_id.clone(),
            yes_token_id: market.yes_token_id.clone(),
            no_token_id: market.no_token_id.clone(),
            yes_ask: books.yes_ask,
            no_ask: books.no_ask,
            edge_bps: edge,
            spread_bps: spread,
            est_profit_usd: est_profit,
            size_usd: sized.size_usd,
            size_tier: sized.tier,
            liquidity_usd: market.liquidity_usd,
            end_time: market.end_time,
        })
    }

    /// Unit-normalize both legs, then require two-sided, strictly positive
    /// books
    fn normalize_books(&self, market: &MarketSnapshot) -> Result<NormalizedBooks, SkipReason> {
        let yes = self.normalize_top(&market.yes_top)?;
        let no = self.normalize_top(&market.no_top)?;

        match (yes.best_bid, yes.best_ask, no.best_bid, no.best_ask) {
            (Some(yb), Some(ya), Some(nb), Some(na))
                if yb > 0.0 && ya > 0.0 && nb > 0.0 && na > 0.0 =>
            {
                Ok(NormalizedBooks {
                    yes_bid: yb,
                    yes_ask: ya,
                    no_bid: nb,
                    no_ask: na,
                })
            }
            _ => Err(SkipReason::BadBook),
        }
    }

    fn normalize_top(&self, top: &BookTop) -> Result<BookTop, SkipReason> {
        Ok(BookTop {
            best_bid: top.best_bid.map(|v| self.normalize_price(v)).transpose()?,
            best_ask: top.best_ask.map(|v| self.normalize_price(v)).transpose()?,
        })
    }

    /// Prices are expected in [0, 1]. Anything above 1.5 is assumed to be on
    /// the cents (0-100) scale: with `units_auto_fix` we divide by 100 and
    /// re-check once; otherwise the upstream unit mismatch is rejected.
    fn normalize_price(&self, raw: f64) -> Result<f64, SkipReason> {
        if !raw.is_finite() {
            return Err(SkipReason::BadBook);
        }
        if raw > 1.5 {
            if !self.config.units_auto_fix {
                return Err(SkipReason::Units);
            }
            let fixed = raw / 100.0;
            if fixed > 1.5 {
                return Err(SkipReason::Units);
            }
            return Ok(fixed);
        }
        Ok(raw)
    }
}
