//! Order submission controller
//!
//! Single chokepoint for every order that leaves the bot. Four independent
//! throttles run before the exchange is ever contacted, and every failure
//! that comes back is classified into a typed reason. Two failure classes
//! (Cloudflare challenge, auth rejection) open global cooldowns that block
//! all markets until they lapse.
//!
//! One controller instance assumes at most one in-flight submission at a
//! time: all gate checks and state mutation are synchronous around the
//! single await of the exchange call.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use tracing::{info, warn};

use super::fill::{extract_fill_info, fok_killed};
use crate::common::errors::{BotError, ExchangeError, ExchangeErrorKind, Result};
use crate::common::types::{FillInfo, OrderPlan, OrderType};
use crate::config::SubmissionConfig;
use crate::exchange::messages::OrderPostResponse;

/// Why a submission was skipped before reaching the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitSkipReason {
    /// Global Cloudflare cooldown active
    CloudflareBlock,
    /// Global auth cooldown active
    AuthBlock,
    /// This market's post-submission cooldown active
    MarketCooldown,
    /// Minimum interval or rolling hourly cap violated
    RateLimited,
    /// Same market submitted within the duplicate-prevention window
    Duplicate,
}

/// Why a submission that reached the exchange failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitFailReason {
    /// 403 with Cloudflare challenge markers
    CloudflareBlock,
    /// 401 from the exchange
    AuthUnauthorized,
    /// Accepted fill-or-kill order immediately killed with zero fill
    FokOrderKilled,
}

/// Outcome of one `submit` call
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitReceipt {
    Submitted {
        order_id: Option<String>,
        fill: Option<FillInfo>,
    },
    Skipped {
        reason: SubmitSkipReason,
        blocked_until: Option<DateTime<Utc>>,
    },
    Failed {
        reason: SubmitFailReason,
        blocked_until: Option<DateTime<Utc>>,
    },
}

impl SubmitReceipt {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}

/// Throttling and failure-classification wrapper around order submission
pub struct OrderSubmissionController {
    config: SubmissionConfig,
    /// Most recent submission that reached the exchange, any market
    last_submit_at: Option<DateTime<Utc>>,
    /// Timestamps of submissions within the rolling hour
    hourly_window: VecDeque<DateTime<Utc>>,
    /// Most recent submission per market
    market_last_submit: HashMap<String, DateTime<Utc>>,
    cloudflare_blocked_until: Option<DateTime<Utc>>,
    auth_blocked_until: Option<DateTime<Utc>>,
}

impl OrderSubmissionController {
    pub fn new(config: SubmissionConfig) -> Self {
        Self {
            config,
            last_submit_at: None,
            hourly_window: VecDeque::new(),
            market_last_submit: HashMap::new(),
            cloudflare_blocked_until: None,
            auth_blocked_until: None,
        }
    }

    /// Submissions that reached the exchange within the rolling hour
    pub fn hourly_count(&mut self, now: DateTime<Utc>) -> usize {
        self.prune_hourly_window(now);
        self.hourly_window.len()
    }

    pub fn cloudflare_blocked_until(&self) -> Option<DateTime<Utc>> {
        self.cloudflare_blocked_until
    }

    pub fn auth_blocked_until(&self) -> Option<DateTime<Utc>> {
        self.auth_blocked_until
    }

    /// Submit one order through the gate chain
    ///
    /// `submit_fn` is invoked only when every gate passes; a call that
    /// reaches the exchange counts against rate limits even if it then
    /// fails. Unclassified exchange errors propagate to the caller.
    pub async fn submit<F, Fut>(
        &mut self,
        plan: &OrderPlan,
        now: DateTime<Utc>,
        submit_fn: F,
    ) -> Result<SubmitReceipt>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<OrderPostResponse, ExchangeError>>,
    {
        if let Some(receipt) = self.check_gates(plan, now) {
            return Ok(receipt);
        }

        // The call is going out: record it against every throttle before
        // awaiting, so failures still count.
        self.last_submit_at = Some(now);
        self.hourly_window.push_back(now);
        self.market_last_submit.insert(plan.market_id.clone(), now);

        match submit_fn().await {
            Ok(response) => Ok(self.classify_response(plan, response)),
            Err(err) => self.classify_error(plan, now, err),
        }
    }

    /// Pre-submission gates, in priority order
    fn check_gates(&mut self, plan: &OrderPlan, now: DateTime<Utc>) -> Option<SubmitReceipt> {
        if let Some(until) = self.cloudflare_blocked_until {
            if now < until {
                warn!(
                    market_id = %plan.market_id,
                    blocked_until = %until,
                    "skipping submission: Cloudflare cooldown active"
                );
                return Some(SubmitReceipt::Skipped {
                    reason: SubmitSkipReason::CloudflareBlock,
                    blocked_until: Some(until),
                });
            }
        }

        if let Some(until) = self.auth_blocked_until {
            if now < until {
                warn!(
                    market_id = %plan.market_id,
                    blocked_until = %until,
                    "skipping submission: auth cooldown active"
                );
                return Some(SubmitReceipt::Skipped {
                    reason: SubmitSkipReason::AuthBlock,
                    blocked_until: Some(until),
                });
            }
        }

        if let Some(&last) = self.market_last_submit.get(&plan.market_id) {
            let until = last + Duration::milliseconds(self.config.market_cooldown_ms);
            if now < until {
                info!(
                    market_id = %plan.market_id,
                    blocked_until = %until,
                    "skipping submission: market cooldown active"
                );
                return Some(SubmitReceipt::Skipped {
                    reason: SubmitSkipReason::MarketCooldown,
                    blocked_until: Some(until),
                });
            }
        }

        if let Some(last) = self.last_submit_at {
            let until = last + Duration::milliseconds(self.config.min_interval_ms);
            if now < until {
                info!(
                    market_id = %plan.market_id,
                    blocked_until = %until,
                    "skipping submission: minimum interval not elapsed"
                );
                return Some(SubmitReceipt::Skipped {
                    reason: SubmitSkipReason::RateLimited,
                    blocked_until: Some(until),
                });
            }
        }

        self.prune_hourly_window(now);
        if self.hourly_window.len() >= self.config.max_per_hour {
            let until = self
                .hourly_window
                .front()
                .map(|&oldest| oldest + Duration::hours(1));
            info!(
                market_id = %plan.market_id,
                count = self.hourly_window.len(),
                "skipping submission: hourly cap reached"
            );
            return Some(SubmitReceipt::Skipped {
                reason: SubmitSkipReason::RateLimited,
                blocked_until: until,
            });
        }

        if let Some(&last) = self.market_last_submit.get(&plan.market_id) {
            let until = last + Duration::milliseconds(self.config.duplicate_prevention_ms);
            if now < until {
                info!(
                    market_id = %plan.market_id,
                    blocked_until = %until,
                    "skipping submission: duplicate within prevention window"
                );
                return Some(SubmitReceipt::Skipped {
                    reason: SubmitSkipReason::Duplicate,
                    blocked_until: Some(until),
                });
            }
        }

        None
    }

    fn classify_response(&self, plan: &OrderPlan, response: OrderPostResponse) -> SubmitReceipt {
        let fill = extract_fill_info(&response);

        if plan.order_type == OrderType::Fok {
            if let Some(ref fill_info) = fill {
                // Unparseable amounts mean we cannot determine the kill
                // state, so the order is treated as submitted.
                if fok_killed(fill_info) == Some(true) {
                    warn!(
                        market_id = %plan.market_id,
                        order_id = ?response.order_id,
                        "FOK order accepted but killed with zero fill"
                    );
                    return SubmitReceipt::Failed {
                        reason: SubmitFailReason::FokOrderKilled,
                        blocked_until: None,
                    };
                }
            }
        }

        info!(
            market_id = %plan.market_id,
            order_id = ?response.order_id,
            "order submitted"
        );
        SubmitReceipt::Submitted {
            order_id: response.order_id,
            fill,
        }
    }

    fn classify_error(
        &mut self,
        plan: &OrderPlan,
        now: DateTime<Utc>,
        err: ExchangeError,
    ) -> Result<SubmitReceipt> {
        match err.kind {
            ExchangeErrorKind::CloudflareBlocked => {
                let until = now + Duration::milliseconds(self.config.cloudflare_cooldown_ms);
                self.cloudflare_blocked_until = Some(until);
                warn!(
                    market_id = %plan.market_id,
                    blocked_until = %until,
                    "Cloudflare block detected, opening global cooldown"
                );
                Ok(SubmitReceipt::Failed {
                    reason: SubmitFailReason::CloudflareBlock,
                    blocked_until: Some(until),
                })
            }
            ExchangeErrorKind::Unauthorized => {
                let until = now + Duration::milliseconds(self.config.auth_cooldown_ms);
                self.auth_blocked_until = Some(until);
                warn!(
                    market_id = %plan.market_id,
                    blocked_until = %until,
                    "exchange rejected credentials, opening auth cooldown"
                );
                Ok(SubmitReceipt::Failed {
                    reason: SubmitFailReason::AuthUnauthorized,
                    blocked_until: Some(until),
                })
            }
            // Unknown failure modes are not swallowed
            ExchangeErrorKind::Other => Err(BotError::Exchange(err)),
        }
    }

    fn prune_hourly_window(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::hours(1);
        while matches!(self.hourly_window.front(), Some(&ts) if ts <= cutoff) {
            self.hourly_window.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Side;
    use std::cell::Cell;

    fn test_config() -> SubmissionConfig {
        SubmissionConfig {
            min_interval_ms: 1_000,
            max_per_hour: 5,
            market_cooldown_ms: 10_000,
            duplicate_prevention_ms: 20_000,
            cloudflare_cooldown_ms: 600_000,
            auth_cooldown_ms: 1_800_000,
        }
    }

    fn plan(market_id: &str) -> OrderPlan {
        OrderPlan {
            market_id: market_id.to_string(),
            token_id: format!("{}-yes", market_id),
            side: Side::Buy,
            order_type: OrderType::Fok,
            size_usd: 25.0,
            price: None,
        }
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn accepted_response(taking: &str, making: &str) -> OrderPostResponse {
        OrderPostResponse {
            success: true,
            order_id: Some("0xorder".to_string()),
            status: Some("matched".to_string()),
            taking_amount: Some(taking.to_string()),
            making_amount: Some(making.to_string()),
            ..Default::default()
        }
    }

    fn cloudflare_error() -> ExchangeError {
        ExchangeError::from_response(
            403,
            "<html>Attention Required! | Cloudflare</html>".to_string(),
            true,
        )
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let mut ctl = OrderSubmissionController::new(test_config());
        let receipt = ctl
            .submit(&plan("m1"), t0(), || async {
                Ok(accepted_response("100.5", "45.2"))
            })
            .await
            .unwrap();

        match receipt {
            SubmitReceipt::Submitted { order_id, fill } => {
                assert_eq!(order_id.as_deref(), Some("0xorder"));
                assert!(fill.is_some());
            }
            other => panic!("expected Submitted, got {:?}", other),
        }
        assert_eq!(ctl.hourly_count(t0()), 1);
    }

    #[tokio::test]
    async fn test_fok_killed_is_failed_not_submitted() {
        let mut ctl = OrderSubmissionController::new(test_config());
        let receipt = ctl
            .submit(&plan("m1"), t0(), || async {
                Ok(accepted_response("0", "0"))
            })
            .await
            .unwrap();

        assert_eq!(
            receipt,
            SubmitReceipt::Failed {
                reason: SubmitFailReason::FokOrderKilled,
                blocked_until: None,
            }
        );
    }

    #[tokio::test]
    async fn test_fok_with_nonzero_taking_is_submitted() {
        let mut ctl = OrderSubmissionController::new(test_config());
        let receipt = ctl
            .submit(&plan("m1"), t0(), || async {
                Ok(accepted_response("100.5", "0"))
            })
            .await
            .unwrap();
        assert!(receipt.is_submitted());
    }

    #[tokio::test]
    async fn test_unparseable_amounts_default_to_submitted() {
        let mut ctl = OrderSubmissionController::new(test_config());
        let receipt = ctl
            .submit(&plan("m1"), t0(), || async { Ok(accepted_response("", "")) })
            .await
            .unwrap();
        assert!(receipt.is_submitted());
    }

    #[tokio::test]
    async fn test_gtc_order_never_fok_killed() {
        let mut ctl = OrderSubmissionController::new(test_config());
        let mut gtc = plan("m1");
        gtc.order_type = OrderType::Gtc;
        gtc.price = Some(0.45);

        let receipt = ctl
            .submit(&gtc, t0(), || async { Ok(accepted_response("0", "0")) })
            .await
            .unwrap();
        assert!(receipt.is_submitted());
    }

    #[tokio::test]
    async fn test_cloudflare_block_opens_global_cooldown() {
        let mut ctl = OrderSubmissionController::new(test_config());
        let receipt = ctl
            .submit(&plan("m1"), t0(), || async { Err(cloudflare_error()) })
            .await
            .unwrap();

        let expected_until = t0() + Duration::milliseconds(600_000);
        assert_eq!(
            receipt,
            SubmitReceipt::Failed {
                reason: SubmitFailReason::CloudflareBlock,
                blocked_until: Some(expected_until),
            }
        );

        // The next call for any other market is skipped without invoking
        // the callback.
        let called = Cell::new(false);
        let receipt = ctl
            .submit(&plan("m2"), t0() + Duration::seconds(30), || async {
                called.set(true);
                Ok(accepted_response("1", "1"))
            })
            .await
            .unwrap();

        assert!(!called.get());
        assert_eq!(
            receipt,
            SubmitReceipt::Skipped {
                reason: SubmitSkipReason::CloudflareBlock,
                blocked_until: Some(expected_until),
            }
        );
    }

    #[tokio::test]
    async fn test_cloudflare_cooldown_lapses() {
        let mut ctl = OrderSubmissionController::new(test_config());
        ctl.submit(&plan("m1"), t0(), || async { Err(cloudflare_error()) })
            .await
            .unwrap();

        let after = t0() + Duration::milliseconds(600_001);
        let receipt = ctl
            .submit(&plan("m2"), after, || async {
                Ok(accepted_response("1", "1"))
            })
            .await
            .unwrap();
        assert!(receipt.is_submitted());
    }

    #[tokio::test]
    async fn test_auth_failure_opens_auth_cooldown() {
        let mut ctl = OrderSubmissionController::new(test_config());
        let receipt = ctl
            .submit(&plan("m1"), t0(), || async {
                Err(ExchangeError::from_response(401, "unauthorized".into(), false))
            })
            .await
            .unwrap();

        let expected_until = t0() + Duration::milliseconds(1_800_000);
        assert_eq!(
            receipt,
            SubmitReceipt::Failed {
                reason: SubmitFailReason::AuthUnauthorized,
                blocked_until: Some(expected_until),
            }
        );

        let receipt = ctl
            .submit(&plan("m2"), t0() + Duration::minutes(1), || async {
                Ok(accepted_response("1", "1"))
            })
            .await
            .unwrap();
        assert_eq!(
            receipt,
            SubmitReceipt::Skipped {
                reason: SubmitSkipReason::AuthBlock,
                blocked_until: Some(expected_until),
            }
        );
    }

    #[tokio::test]
    async fn test_unclassified_error_propagates() {
        let mut ctl = OrderSubmissionController::new(test_config());
        let result = ctl
            .submit(&plan("m1"), t0(), || async {
                Err(ExchangeError::from_response(500, "boom".into(), false))
            })
            .await;

        assert!(matches!(result, Err(BotError::Exchange(_))));
        // The failed call still counted against the rolling hour.
        assert_eq!(ctl.hourly_count(t0()), 1);
    }

    #[tokio::test]
    async fn test_market_cooldown_blocks_same_market() {
        let mut ctl = OrderSubmissionController::new(test_config());
        ctl.submit(&plan("m1"), t0(), || async {
            Ok(accepted_response("1", "1"))
        })
        .await
        .unwrap();

        let receipt = ctl
            .submit(&plan("m1"), t0() + Duration::seconds(5), || async {
                Ok(accepted_response("1", "1"))
            })
            .await
            .unwrap();
        assert_eq!(
            receipt,
            SubmitReceipt::Skipped {
                reason: SubmitSkipReason::MarketCooldown,
                blocked_until: Some(t0() + Duration::seconds(10)),
            }
        );
    }

    #[tokio::test]
    async fn test_duplicate_window_outlives_market_cooldown() {
        let mut ctl = OrderSubmissionController::new(test_config());
        ctl.submit(&plan("m1"), t0(), || async {
            Ok(accepted_response("1", "1"))
        })
        .await
        .unwrap();

        // Past the 10s market cooldown but inside the 20s duplicate window.
        let receipt = ctl
            .submit(&plan("m1"), t0() + Duration::seconds(15), || async {
                Ok(accepted_response("1", "1"))
            })
            .await
            .unwrap();
        assert_eq!(
            receipt,
            SubmitReceipt::Skipped {
                reason: SubmitSkipReason::Duplicate,
                blocked_until: Some(t0() + Duration::seconds(20)),
            }
        );
    }

    #[tokio::test]
    async fn test_min_interval_blocks_across_markets() {
        let mut ctl = OrderSubmissionController::new(test_config());
        ctl.submit(&plan("m1"), t0(), || async {
            Ok(accepted_response("1", "1"))
        })
        .await
        .unwrap();

        let receipt = ctl
            .submit(&plan("m2"), t0() + Duration::milliseconds(500), || async {
                Ok(accepted_response("1", "1"))
            })
            .await
            .unwrap();
        assert_eq!(
            receipt,
            SubmitReceipt::Skipped {
                reason: SubmitSkipReason::RateLimited,
                blocked_until: Some(t0() + Duration::milliseconds(1_000)),
            }
        );
    }

    #[tokio::test]
    async fn test_hourly_cap() {
        let mut ctl = OrderSubmissionController::new(test_config());
        for i in 0..5 {
            let receipt = ctl
                .submit(
                    &plan(&format!("m{}", i)),
                    t0() + Duration::seconds(i * 2),
                    || async { Ok(accepted_response("1", "1")) },
                )
                .await
                .unwrap();
            assert!(receipt.is_submitted());
        }

        let receipt = ctl
            .submit(&plan("m6"), t0() + Duration::seconds(12), || async {
                Ok(accepted_response("1", "1"))
            })
            .await
            .unwrap();
        assert!(matches!(
            receipt,
            SubmitReceipt::Skipped {
                reason: SubmitSkipReason::RateLimited,
                ..
            }
        ));

        // An hour after the first submission there is room again.
        let receipt = ctl
            .submit(&plan("m6"), t0() + Duration::seconds(3601), || async {
                Ok(accepted_response("1", "1"))
            })
            .await
            .unwrap();
        assert!(receipt.is_submitted());
    }

    #[tokio::test]
    async fn test_gates_do_not_consume_rate_budget() {
        let mut ctl = OrderSubmissionController::new(test_config());
        ctl.submit(&plan("m1"), t0(), || async {
            Ok(accepted_response("1", "1"))
        })
        .await
        .unwrap();

        // Blocked by min interval; must not count toward the hour.
        ctl.submit(&plan("m2"), t0() + Duration::milliseconds(100), || async {
            Ok(accepted_response("1", "1"))
        })
        .await
        .unwrap();

        assert_eq!(ctl.hourly_count(t0() + Duration::seconds(1)), 1);
    }
}
