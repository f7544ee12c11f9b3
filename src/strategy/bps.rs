//! Basis-point math for intra-market arbitrage
//!
//! Buying one YES and one NO share pays out exactly $1.00 at resolution, so
//! any combined ask cost below $1.00 is a locked-in edge. These helpers keep
//! the arithmetic in one place; everything downstream works in bps.

/// Basis points of discount below $1.00 on the combined ask cost of one YES
/// plus one NO share. Positive when `yes_ask + no_ask < 1`.
pub fn edge_bps(yes_ask: f64, no_ask: f64) -> f64 {
    (1.0 - (yes_ask + no_ask)) * 10_000.0
}

/// Bid/ask gap on one leg, in basis points normalized by the ask
pub fn spread_bps(bid: f64, ask: f64) -> f64 {
    (ask - bid) / ask * 10_000.0
}

/// Estimated net profit in USD for a trade of `size_usd`
///
/// Gross edge-implied profit minus modeled transaction costs, both
/// proportional to trade size. With zero costs this equals the gross edge;
/// costs only ever reduce it.
pub fn estimate_profit_usd(size_usd: f64, edge_bps: f64, fee_bps: f64, slippage_bps: f64) -> f64 {
    let gross = size_usd * edge_bps / 10_000.0;
    let costs = size_usd * (fee_bps + slippage_bps) / 10_000.0;
    gross - costs
}
