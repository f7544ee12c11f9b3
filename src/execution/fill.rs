//! Fill information extraction from order responses

use crate::common::types::FillInfo;
use crate::exchange::messages::OrderPostResponse;

/// Extract fill information from an order response
///
/// Returns `None` when the response carries neither `takingAmount` nor
/// `makingAmount`, since it is not a fill-reporting shape. When at least one
/// is present, the absent one defaults to `"0"`.
pub fn extract_fill_info(response: &OrderPostResponse) -> Option<FillInfo> {
    if response.taking_amount.is_none() && response.making_amount.is_none() {
        return None;
    }

    Some(FillInfo {
        taking_amount: response
            .taking_amount
            .clone()
            .unwrap_or_else(|| "0".to_string()),
        making_amount: response
            .making_amount
            .clone()
            .unwrap_or_else(|| "0".to_string()),
        status: response.status.clone(),
    })
}

/// Judge whether a fill-or-kill order was killed with zero fill
///
/// `Some(true)` when both amounts parse to exactly zero, `Some(false)` when
/// either side filled, `None` when an amount is present but unparseable.
/// Callers must treat `None` as "cannot determine" rather than blocking.
pub fn fok_killed(fill: &FillInfo) -> Option<bool> {
    let taking: f64 = fill.taking_amount.parse().ok()?;
    let making: f64 = fill.making_amount.parse().ok()?;
    if !taking.is_finite() || !making.is_finite() {
        return None;
    }
    Some(taking == 0.0 && making == 0.0)
}
