//! Trading engine - per-cycle orchestration
//!
//! One cycle: fetch snapshots, scan for opportunities, gate each through the
//! risk manager, and push the survivors through the submission controller.
//! Cycles run strictly one at a time, so the controller never sees more than
//! one in-flight submission.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::common::errors::{ExchangeError, Result};
use crate::common::traits::{
    BoxedMarketDataProvider, BoxedRiskManager, BoxedTradeExecutor, TradeExecutor,
};
use crate::common::types::{OrderPlan, OrderType, Opportunity, Side};
use crate::exchange::messages::OrderPostResponse;
use crate::execution::controller::{OrderSubmissionController, SubmitReceipt};
use crate::execution::fill::{extract_fill_info, fok_killed};
use crate::strategy::IntraMarketArbStrategy;

/// Counters for one completed cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub markets_scanned: usize,
    pub opportunities: usize,
    pub submitted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Per-cycle orchestrator over injected collaborators
pub struct TradingEngine {
    provider: BoxedMarketDataProvider,
    executor: BoxedTradeExecutor,
    risk: BoxedRiskManager,
    strategy: IntraMarketArbStrategy,
    controller: OrderSubmissionController,
    dry_run: bool,
}

impl TradingEngine {
    pub fn new(
        provider: BoxedMarketDataProvider,
        executor: BoxedTradeExecutor,
        risk: BoxedRiskManager,
        strategy: IntraMarketArbStrategy,
        controller: OrderSubmissionController,
        dry_run: bool,
    ) -> Self {
        Self {
            provider,
            executor,
            risk,
            strategy,
            controller,
            dry_run,
        }
    }

    pub fn strategy(&self) -> &IntraMarketArbStrategy {
        &self.strategy
    }

    /// Run one full scan-and-submit cycle
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> Result<CycleSummary> {
        let markets = self.provider.get_active_markets().await?;
        let opportunities = self.strategy.find_opportunities(&markets, now);

        let mut summary = CycleSummary {
            markets_scanned: markets.len(),
            opportunities: opportunities.len(),
            ..Default::default()
        };

        for opportunity in &opportunities {
            let verdict = self.risk.can_execute(opportunity);
            if !verdict.allowed {
                info!(
                    market_id = %opportunity.market_id,
                    reason = ?verdict.reason,
                    "risk manager denied opportunity"
                );
                summary.skipped += 1;
                continue;
            }

            let gas = self.risk.ensure_gas_balance().await?;
            if !gas.ok {
                warn!(balance = gas.balance, "insufficient gas, halting cycle");
                break;
            }

            if self.dry_run {
                info!(
                    market_id = %opportunity.market_id,
                    size_usd = opportunity.size_usd,
                    edge_bps = opportunity.edge_bps,
                    "dry run: would submit"
                );
                summary.skipped += 1;
                continue;
            }

            let yes_plan = leg_plan(opportunity, Side::Buy, true);
            let no_plan = leg_plan(opportunity, Side::Buy, false);

            self.risk.on_trade_submitted(opportunity);
            let executor = self.executor.as_ref();
            let receipt = self
                .controller
                .submit(&yes_plan, now, || {
                    execute_pair(executor, &yes_plan, &no_plan)
                })
                .await;

            match receipt {
                Ok(SubmitReceipt::Submitted { order_id, .. }) => {
                    info!(
                        market_id = %opportunity.market_id,
                        order_id = ?order_id,
                        "arbitrage pair submitted"
                    );
                    self.risk.on_trade_success(opportunity);
                    summary.submitted += 1;
                }
                Ok(SubmitReceipt::Skipped { reason, .. }) => {
                    info!(
                        market_id = %opportunity.market_id,
                        reason = ?reason,
                        "submission throttled"
                    );
                    summary.skipped += 1;
                }
                Ok(SubmitReceipt::Failed { reason, .. }) => {
                    warn!(
                        market_id = %opportunity.market_id,
                        reason = ?reason,
                        "submission failed"
                    );
                    self.risk.on_trade_failure(opportunity);
                    summary.failed += 1;
                }
                Err(err) => {
                    error!(
                        market_id = %opportunity.market_id,
                        error = %err,
                        "unclassified submission error"
                    );
                    self.risk.on_trade_failure(opportunity);
                    summary.failed += 1;
                }
            }
        }

        info!(
            markets = summary.markets_scanned,
            opportunities = summary.opportunities,
            submitted = summary.submitted,
            skipped = summary.skipped,
            failed = summary.failed,
            "cycle complete"
        );
        Ok(summary)
    }
}

fn leg_plan(opportunity: &Opportunity, side: Side, yes_leg: bool) -> OrderPlan {
    OrderPlan {
        market_id: opportunity.market_id.clone(),
        token_id: if yes_leg {
            opportunity.yes_token_id.clone()
        } else {
            opportunity.no_token_id.clone()
        },
        side,
        order_type: OrderType::Fok,
        size_usd: opportunity.size_usd,
        price: None,
    }
}

/// Place both legs of an intra-market pair, YES first
///
/// The NO leg is only attempted if the YES leg filled something; a killed
/// first leg is returned as-is so the controller classifies it.
async fn execute_pair(
    executor: &dyn TradeExecutor,
    yes_plan: &OrderPlan,
    no_plan: &OrderPlan,
) -> std::result::Result<OrderPostResponse, ExchangeError> {
    let yes_response = executor.execute(yes_plan).await?;
    if let Some(fill) = extract_fill_info(&yes_response) {
        if fok_killed(&fill) == Some(true) {
            return Ok(yes_response);
        }
    }
    executor.execute(no_plan).await
}
