//! Position sizing under exposure caps
//!
//! Raw size comes from the configured base scaled by edge, then gets clipped
//! to whatever room remains in the market and in the wallet.

use crate::common::types::SizeTier;
use crate::config::SizeScaling;

/// Inputs to a single sizing decision
#[derive(Debug, Clone, Copy)]
pub struct SizingInputs {
    pub base_usd: f64,
    pub edge_bps: f64,
    pub scaling: SizeScaling,
    /// Edge at which the sqrt multiplier is exactly 1.0
    pub reference_edge_bps: f64,
    /// Upper bound on the sqrt multiplier
    pub max_scale_multiplier: f64,
    pub max_position_usd: f64,
    pub max_wallet_exposure_usd: f64,
    pub market_exposure_usd: f64,
    pub wallet_exposure_usd: f64,
}

/// A sized amount plus the label of whichever cap clipped it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizedAmount {
    pub size_usd: f64,
    pub tier: SizeTier,
}

/// Compute a risk-bounded position size in USD
///
/// The scaling curve is monotonically non-decreasing in edge and bounded by
/// `max_scale_multiplier`; the result is always clipped to the remaining
/// market room and wallet room, floored at zero.
pub fn compute_size_usd(inputs: &SizingInputs) -> SizedAmount {
    let raw = match inputs.scaling {
        SizeScaling::Flat => inputs.base_usd,
        SizeScaling::SqrtEdge => {
            let reference = if inputs.reference_edge_bps > 0.0 {
                inputs.reference_edge_bps
            } else {
                1.0
            };
            let multiplier = (inputs.edge_bps.max(0.0) / reference)
                .sqrt()
                .min(inputs.max_scale_multiplier);
            inputs.base_usd * multiplier
        }
    };

    let market_room = (inputs.max_position_usd - inputs.market_exposure_usd).max(0.0);
    let wallet_room = (inputs.max_wallet_exposure_usd - inputs.wallet_exposure_usd).max(0.0);

    let size_usd = raw.min(market_room).min(wallet_room).max(0.0);

    let tier = if size_usd <= 0.0 {
        SizeTier::NoRoom
    } else if size_usd + f64::EPSILON >= raw {
        SizeTier::Uncapped
    } else if market_room <= wallet_room {
        SizeTier::CappedByMarket
    } else {
        SizeTier::CappedByWallet
    };

    SizedAmount { size_usd, tier }
}
