//! Entry cost-basis reconstruction
//!
//! Replays a trade history to derive the weighted-average entry price,
//! acquisition timestamps, and remaining shares of the currently open
//! position. The whole computation is a pure function of `(trades, now)`:
//! every timestamp comes out of the data, never out of process uptime, so a
//! restart with the same history yields the same answer.

use tracing::debug;

use crate::common::types::{EntryMeta, HistoryTrade, Side};

/// Share quantity below which a remaining position counts as fully closed
pub const DUST_SHARES: f64 = 0.0001;

/// Resolve entry metadata from an unordered trade history
///
/// Invalid trades (non-finite or non-positive size, non-finite or negative
/// price, non-finite or non-positive timestamp) are skipped. Selling
/// realizes the weighted-average cost without changing it; a sell that takes
/// the position to dust resets the lineage entirely, so a later buy starts
/// fresh timestamps. Returns `None` when no position remains open.
pub fn resolve_entry_meta(trades: &[HistoryTrade], now_ms: i64) -> Option<EntryMeta> {
    let mut ordered: Vec<&HistoryTrade> = trades.iter().filter(|t| is_valid(t)).collect();
    // Stable sort keeps input order for equal timestamps
    ordered.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

    let mut total_shares = 0.0_f64;
    let mut total_cost = 0.0_f64;
    let mut first_acquired_sec: Option<f64> = None;
    let mut last_acquired_sec: Option<f64> = None;

    for trade in ordered {
        match trade.side {
            Side::Buy => {
                total_shares += trade.size;
                total_cost += trade.size * trade.price;
                if first_acquired_sec.is_none() {
                    first_acquired_sec = Some(trade.timestamp);
                }
                last_acquired_sec = Some(trade.timestamp);
            }
            Side::Sell => {
                if total_shares <= 0.0 {
                    continue;
                }
                let avg_price = total_cost / total_shares;
                let sold = trade.size.min(total_shares);
                total_shares -= sold;
                // Selling realizes the average cost, never moves it
                total_cost -= sold * avg_price;

                if total_shares <= DUST_SHARES {
                    total_shares = 0.0;
                    total_cost = 0.0;
                    first_acquired_sec = None;
                    last_acquired_sec = None;
                }
            }
        }
    }

    if total_shares <= DUST_SHARES {
        return None;
    }
    let (first_sec, last_sec) = match (first_acquired_sec, last_acquired_sec) {
        (Some(f), Some(l)) => (f, l),
        _ => return None,
    };

    let first_ms = (first_sec * 1000.0) as i64;
    let last_ms = (last_sec * 1000.0) as i64;
    let meta = EntryMeta {
        avg_entry_price_cents: total_cost / total_shares * 100.0,
        first_acquired_at_ms: first_ms,
        last_acquired_at_ms: last_ms,
        time_held_sec: (now_ms - first_ms).div_euclid(1000),
        remaining_shares: total_shares,
    };
    debug!(
        remaining_shares = meta.remaining_shares,
        avg_entry_price_cents = meta.avg_entry_price_cents,
        "entry meta resolved"
    );
    Some(meta)
}

fn is_valid(trade: &HistoryTrade) -> bool {
    trade.size.is_finite()
        && trade.size > 0.0
        && trade.price.is_finite()
        && trade.price >= 0.0
        && trade.timestamp.is_finite()
        && trade.timestamp > 0.0
}

/// Verdict of reconciling computed shares against a live exchange count
#[derive(Debug, Clone, PartialEq)]
pub struct ShareReconciliation {
    pub trusted: bool,
    pub reason: Option<String>,
}

/// Compare the reconstructed share count against the exchange's live count
///
/// A live count that is missing or non-positive is no evidence either way,
/// so the computed value is trusted unconditionally. Otherwise the computed
/// value is distrusted when the relative difference exceeds 2% OR the
/// absolute difference exceeds half a share; either threshold alone is
/// enough.
pub fn reconcile_shares(computed: f64, live: Option<f64>) -> ShareReconciliation {
    let live = match live {
        Some(l) if l > 0.0 => l,
        _ => {
            return ShareReconciliation {
                trusted: true,
                reason: None,
            }
        }
    };

    let difference = (computed - live).abs();
    let percent_diff = difference / live * 100.0;

    if percent_diff > 2.0 || difference > 0.5 {
        ShareReconciliation {
            trusted: false,
            reason: Some(format!(
                "computed {:.4} shares vs live {:.4} ({:.2}% / {:.4} shares apart)",
                computed, live, percent_diff, difference
            )),
        }
    } else {
        ShareReconciliation {
            trusted: true,
            reason: None,
        }
    }
}
