//! Wire types for the CLOB REST API

use serde::{Deserialize, Serialize};

/// Response to posting an order
///
/// The exchange reports fill progress through `takingAmount`/`makingAmount`
/// as numeric strings; either may be absent for shapes that carry no fill
/// information at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPostResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taking_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub making_amount: Option<String>,
}

/// One price level as reported by the book endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: String,
    pub size: String,
}

/// Order book response from `/book`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookResponse {
    #[serde(default)]
    pub market: String,
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub bids: Vec<BookLevel>,
    #[serde(default)]
    pub asks: Vec<BookLevel>,
}

/// One outcome token in a simplified market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketToken {
    #[serde(default)]
    pub token_id: String,
    #[serde(default)]
    pub outcome: String,
}

/// One market from `/simplified-markets`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedMarket {
    #[serde(default)]
    pub condition_id: String,
    #[serde(default)]
    pub tokens: Vec<MarketToken>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_iso: Option<String>,
}

/// Paged response from `/simplified-markets`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedMarketsResponse {
    #[serde(default)]
    pub data: Vec<SimplifiedMarket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
