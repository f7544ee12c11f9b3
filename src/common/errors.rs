//! Error types for the bot

use thiserror::Error;

/// Result type alias using our BotError
pub type Result<T> = std::result::Result<T, BotError>;

/// Main error type for bot operations
#[derive(Error, Debug)]
pub enum BotError {
    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Exchange-reported errors (classified at the I/O boundary)
    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Classification of an exchange-reported failure
///
/// Produced once at the HTTP boundary and consumed by `match` logic
/// downstream, so failure handling never relies on string heuristics layered
/// on generic errors. The one remaining string heuristic (Cloudflare
/// challenge detection) lives in [`ExchangeErrorKind::classify`] and can
/// false-positive on 403 bodies that merely mention Cloudflare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeErrorKind {
    /// 403 carrying Cloudflare challenge markers
    CloudflareBlocked,
    /// 401 from the exchange
    Unauthorized,
    /// Any other HTTP failure
    Other,
}

impl ExchangeErrorKind {
    /// Classify an HTTP failure by status, body, and the cf-ray header.
    ///
    /// Cloudflare challenges arrive as 403s with "cloudflare" somewhere in
    /// the HTML body, a `cf-ray` response header, or challenge page markup.
    pub fn classify(status: u16, body: &str, has_cf_ray: bool) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => {
                let lower = body.to_lowercase();
                if lower.contains("cloudflare")
                    || has_cf_ray
                    || lower.contains("challenge-platform")
                    || lower.contains("cf-challenge")
                {
                    Self::CloudflareBlocked
                } else {
                    Self::Other
                }
            }
            _ => Self::Other,
        }
    }
}

/// An HTTP-level failure reported by the exchange
///
/// Carries the raw status and a body snippet so callers can log context,
/// but downstream logic should branch on `kind` only.
#[derive(Error, Debug, Clone)]
#[error("exchange returned status {status}: {body}")]
pub struct ExchangeError {
    pub status: u16,
    pub body: String,
    pub kind: ExchangeErrorKind,
}

impl ExchangeError {
    /// Build a classified error from the raw HTTP failure parts
    pub fn from_response(status: u16, body: String, has_cf_ray: bool) -> Self {
        let kind = ExchangeErrorKind::classify(status, &body, has_cf_ray);
        Self { status, body, kind }
    }

    /// Wrap a transport-level failure (no HTTP status available)
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self {
            status: 0,
            body: err.to_string(),
            kind: ExchangeErrorKind::Other,
        }
    }
}
