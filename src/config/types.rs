//! Configuration types

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Arbitrage strategy thresholds and sizing parameters
    #[serde(default)]
    pub arb: ArbConfig,
    /// Order submission throttling and cooldowns
    #[serde(default)]
    pub submission: SubmissionConfig,
    /// Exchange endpoints
    #[serde(default)]
    pub exchange: ExchangeConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Size scaling curve applied to the base trade size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeScaling {
    /// Base size unchanged regardless of edge
    Flat,
    /// Base size scaled by sqrt(edge / reference edge), bounded above
    SqrtEdge,
}

/// Arbitrage strategy configuration, immutable per run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbConfig {
    /// Minimum edge in basis points to consider a market
    #[serde(default = "default_min_edge_bps")]
    pub min_edge_bps: f64,
    /// Minimum estimated net profit in USD per trade
    #[serde(default = "default_min_profit_usd")]
    pub min_profit_usd: f64,
    /// Minimum reported market liquidity in USD
    #[serde(default = "default_min_liquidity_usd")]
    pub min_liquidity_usd: f64,
    /// Maximum tolerated bid/ask spread in basis points (wider leg)
    #[serde(default = "default_max_spread_bps")]
    pub max_spread_bps: f64,
    /// Maximum minutes until resolution we are willing to hold
    #[serde(default = "default_max_hold_minutes")]
    pub max_hold_minutes: i64,
    /// Base trade size in USD before scaling and clipping
    #[serde(default = "default_trade_base_usd")]
    pub trade_base_usd: f64,
    /// Maximum position per market in USD
    #[serde(default = "default_max_position_usd")]
    pub max_position_usd: f64,
    /// Maximum wallet-wide exposure in USD
    #[serde(default = "default_max_wallet_exposure_usd")]
    pub max_wallet_exposure_usd: f64,
    /// Size scaling mode
    #[serde(default = "default_size_scaling")]
    pub size_scaling: SizeScaling,
    /// Reference edge for sqrt scaling; at this edge the multiplier is 1.0.
    /// The exact curve is tunable; only monotonicity and cap-clipping are
    /// contractual.
    #[serde(default = "default_reference_edge_bps")]
    pub reference_edge_bps: f64,
    /// Upper bound on the sqrt-scaling multiplier
    #[serde(default = "default_max_scale_multiplier")]
    pub max_scale_multiplier: f64,
    /// Modeled exchange fee in basis points
    #[serde(default = "default_fee_bps")]
    pub fee_bps: f64,
    /// Modeled slippage in basis points
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: f64,
    /// Divide cents-scale prices (>1.5) by 100 once before rejecting
    #[serde(default = "default_units_auto_fix")]
    pub units_auto_fix: bool,
}

impl Default for ArbConfig {
    fn default() -> Self {
        Self {
            min_edge_bps: default_min_edge_bps(),
            min_profit_usd: default_min_profit_usd(),
            min_liquidity_usd: default_min_liquidity_usd(),
            max_spread_bps: default_max_spread_bps(),
            max_hold_minutes: default_max_hold_minutes(),
            trade_base_usd: default_trade_base_usd(),
            max_position_usd: default_max_position_usd(),
            max_wallet_exposure_usd: default_max_wallet_exposure_usd(),
            size_scaling: default_size_scaling(),
            reference_edge_bps: default_reference_edge_bps(),
            max_scale_multiplier: default_max_scale_multiplier(),
            fee_bps: default_fee_bps(),
            slippage_bps: default_slippage_bps(),
            units_auto_fix: default_units_auto_fix(),
        }
    }
}

fn default_min_edge_bps() -> f64 {
    100.0
}

fn default_min_profit_usd() -> f64 {
    0.25
}

fn default_min_liquidity_usd() -> f64 {
    500.0
}

fn default_max_spread_bps() -> f64 {
    800.0
}

fn default_max_hold_minutes() -> i64 {
    24 * 60
}

fn default_trade_base_usd() -> f64 {
    25.0
}

fn default_max_position_usd() -> f64 {
    100.0
}

fn default_max_wallet_exposure_usd() -> f64 {
    500.0
}

fn default_size_scaling() -> SizeScaling {
    SizeScaling::SqrtEdge
}

fn default_reference_edge_bps() -> f64 {
    100.0
}

fn default_max_scale_multiplier() -> f64 {
    3.0
}

fn default_fee_bps() -> f64 {
    0.0
}

fn default_slippage_bps() -> f64 {
    20.0
}

fn default_units_auto_fix() -> bool {
    true
}

/// Order submission throttling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Global minimum gap between submissions in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: i64,
    /// Rolling hourly submission cap
    #[serde(default = "default_max_per_hour")]
    pub max_per_hour: usize,
    /// Per-market cooldown after any submission, in milliseconds
    #[serde(default = "default_market_cooldown_ms")]
    pub market_cooldown_ms: i64,
    /// Suppress duplicate submissions to the same market within this window
    #[serde(default = "default_duplicate_prevention_ms")]
    pub duplicate_prevention_ms: i64,
    /// Global cooldown after a Cloudflare block, in milliseconds
    #[serde(default = "default_cloudflare_cooldown_ms")]
    pub cloudflare_cooldown_ms: i64,
    /// Global cooldown after an auth failure, in milliseconds
    #[serde(default = "default_auth_cooldown_ms")]
    pub auth_cooldown_ms: i64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            max_per_hour: default_max_per_hour(),
            market_cooldown_ms: default_market_cooldown_ms(),
            duplicate_prevention_ms: default_duplicate_prevention_ms(),
            cloudflare_cooldown_ms: default_cloudflare_cooldown_ms(),
            auth_cooldown_ms: default_auth_cooldown_ms(),
        }
    }
}

fn default_min_interval_ms() -> i64 {
    2_000
}

fn default_max_per_hour() -> usize {
    60
}

fn default_market_cooldown_ms() -> i64 {
    60_000
}

fn default_duplicate_prevention_ms() -> i64 {
    120_000
}

fn default_cloudflare_cooldown_ms() -> i64 {
    10 * 60_000
}

fn default_auth_cooldown_ms() -> i64 {
    30 * 60_000
}

/// Exchange endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Base URL for the CLOB REST API
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            rest_url: default_rest_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_rest_url() -> String {
    "https://clob.polymarket.com".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Delay between scan cycles in milliseconds
    #[serde(default = "default_scan_interval")]
    pub scan_interval_ms: u64,
    /// When set, opportunities are logged but never submitted
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            scan_interval_ms: default_scan_interval(),
            dry_run: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_scan_interval() -> u64 {
    5_000
}
