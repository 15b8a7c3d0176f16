//! Order lifecycle manager.
//!
//! Each tick that is due runs the full cycle:
//!
//! ```text
//! Idle -> Cancelling -> Quoting -> Settled -> Idle
//! ```
//!
//! Cancelling removes every resting order on the instrument. Quoting runs
//! indicators, quote generation and the budget check, then submits whatever
//! survives. A tick that is not due yet does nothing at all.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use quoter_core::error::{BrokerError, QuoteError};
use quoter_core::traits::{BudgetSource, CandleFeed, FillNotifier, PriceSource, Venue};
use quoter_core::types::{AvailableCapital, FillEvent, OrderProposal, PriceType, TradingPair};
use quoter_indicators::IndicatorEngine;
use quoter_risk::{BudgetAdjuster, BudgetConfig, BudgetDecision};
use quoter_strategy::{MarketPrices, QuoteGenerator};

/// Lifecycle manager settings.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    pub pair: TradingPair,
    /// Price the quotes are anchored on
    pub price_type: PriceType,
    /// Minimum time between two quoting cycles
    pub refresh_interval: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            pair: TradingPair::new("ETH", "USDT"),
            price_type: PriceType::MidPrice,
            refresh_interval: Duration::seconds(10),
        }
    }
}

/// Stage of a quoting cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Idle,
    Cancelling,
    Quoting,
    Settled,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePhase::Idle => write!(f, "idle"),
            LifecyclePhase::Cancelling => write!(f, "cancelling"),
            LifecyclePhase::Quoting => write!(f, "quoting"),
            LifecyclePhase::Settled => write!(f, "settled"),
        }
    }
}

/// When the next quoting cycle may start. Threaded through every `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub next_refresh: DateTime<Utc>,
}

impl Schedule {
    /// Due on the very first tick.
    pub fn immediate() -> Self {
        Self {
            next_refresh: DateTime::<Utc>::MIN_UTC,
        }
    }

    pub fn at(next_refresh: DateTime<Utc>) -> Self {
        Self { next_refresh }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_refresh
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::immediate()
    }
}

/// A venue command that failed during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandFailure {
    /// Order ID for cancels, side for submits, or the query that failed
    pub target: String,
    pub error: BrokerError,
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Last phase reached: `Idle` for a tick that was not due, `Settled` otherwise
    pub phase: LifecyclePhase,
    /// Schedule to pass into the next tick
    pub schedule: Schedule,
    pub cancelled: Vec<String>,
    pub cancel_failures: Vec<CommandFailure>,
    pub submitted: Vec<String>,
    pub submit_failures: Vec<CommandFailure>,
    /// Why no quotes were generated, for cancel-only ticks
    pub skipped: Option<QuoteError>,
}

impl TickReport {
    fn idle(schedule: Schedule) -> Self {
        Self {
            phase: LifecyclePhase::Idle,
            schedule,
            cancelled: Vec::new(),
            cancel_failures: Vec::new(),
            submitted: Vec::new(),
            submit_failures: Vec::new(),
            skipped: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == LifecyclePhase::Idle
    }

    /// The tick cancelled but did not attempt any submission.
    pub fn is_cancel_only(&self) -> bool {
        self.skipped.is_some()
    }
}

/// External collaborators of the lifecycle manager.
#[derive(Clone)]
pub struct Collaborators {
    pub feed: Arc<dyn CandleFeed>,
    pub venue: Arc<dyn Venue>,
    pub prices: Arc<dyn PriceSource>,
    pub budget: Arc<dyn BudgetSource>,
    pub notifier: Arc<dyn FillNotifier>,
}

/// Drives the cancel-then-requote cycle for one instrument.
///
/// Keeps no order state of its own: every tick reads the resting orders
/// from the venue and recomputes quotes from scratch.
pub struct OrderLifecycleManager {
    config: LifecycleConfig,
    symbol: String,
    indicators: IndicatorEngine,
    generator: QuoteGenerator,
    adjuster: BudgetAdjuster,
    collaborators: Collaborators,
}

impl OrderLifecycleManager {
    pub fn new(
        config: LifecycleConfig,
        indicators: IndicatorEngine,
        generator: QuoteGenerator,
        budget: BudgetConfig,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            symbol: config.pair.to_string(),
            adjuster: BudgetAdjuster::new(config.pair.clone(), budget),
            config,
            indicators,
            generator,
            collaborators,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn feed(&self) -> &Arc<dyn CandleFeed> {
        &self.collaborators.feed
    }

    pub fn venue(&self) -> &Arc<dyn Venue> {
        &self.collaborators.venue
    }

    /// Run one tick at `now`.
    ///
    /// Never fails: quoting problems end the tick as cancel-only and venue
    /// command failures are recorded per command.
    pub async fn tick(&self, now: DateTime<Utc>, schedule: Schedule) -> TickReport {
        let mut report = TickReport::idle(schedule);
        if !schedule.is_due(now) {
            return report;
        }

        self.enter(&mut report, LifecyclePhase::Cancelling);
        let (cancelled, cancel_failures) = self.cancel_all().await;
        report.cancelled = cancelled;
        report.cancel_failures = cancel_failures;

        self.enter(&mut report, LifecyclePhase::Quoting);
        match self.build_proposals().await {
            Ok(proposals) => self.submit_all(proposals, &mut report).await,
            Err(reason) => {
                info!(pair = %self.symbol, %reason, "No quotes this tick");
                report.skipped = Some(reason);
            }
        }

        let next_refresh = now
            .checked_add_signed(self.config.refresh_interval)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        report.schedule = Schedule::at(next_refresh);
        self.enter(&mut report, LifecyclePhase::Settled);

        info!(
            pair = %self.symbol,
            cancelled = report.cancelled.len(),
            submitted = report.submitted.len(),
            failures = report.cancel_failures.len() + report.submit_failures.len(),
            next_refresh = %report.schedule.next_refresh,
            "Quoting cycle complete"
        );
        report
    }

    /// Cancel every resting order on the instrument.
    ///
    /// Each cancel is independent: a failure is recorded and the rest are
    /// still attempted.
    pub async fn cancel_all(&self) -> (Vec<String>, Vec<CommandFailure>) {
        let venue = &self.collaborators.venue;
        let orders = match venue.active_orders(&self.symbol).await {
            Ok(orders) => orders,
            Err(error) => {
                warn!(pair = %self.symbol, %error, "Failed to list active orders");
                let failure = CommandFailure {
                    target: "active_orders".to_string(),
                    error,
                };
                return (Vec::new(), vec![failure]);
            }
        };

        let mut cancelled = Vec::with_capacity(orders.len());
        let mut failures = Vec::new();
        for order in orders {
            match venue.cancel(&self.symbol, &order.id).await {
                Ok(()) => cancelled.push(order.id),
                Err(error) => {
                    warn!(order_id = %order.id, %error, "Cancel failed");
                    failures.push(CommandFailure {
                        target: order.id,
                        error,
                    });
                }
            }
        }
        (cancelled, failures)
    }

    /// Produce the record for a fill and hand it to the notifier.
    ///
    /// Resting orders are left alone; the next refresh replaces them.
    pub fn on_fill(&self, fill: &FillEvent) -> String {
        let message = fill.summary();
        self.collaborators.notifier.notify(fill, &message);
        message
    }

    async fn build_proposals(&self) -> Result<Vec<OrderProposal>, QuoteError> {
        let window = self.collaborators.feed.window();
        let snapshot = self.indicators.compute(&window)?;
        debug!(
            volatility = snapshot.volatility,
            trend_up = snapshot.trend_up,
            floored = snapshot.floored,
            "Indicators"
        );

        let source = &self.collaborators.prices;
        let prices = MarketPrices {
            reference_type: self.config.price_type,
            reference: source.price(&self.symbol, self.config.price_type).await,
            best_bid: source.best_bid(&self.symbol).await,
            best_ask: source.best_ask(&self.symbol).await,
        };
        let quotes = self.generator.generate(&prices, &snapshot)?;

        let capital = AvailableCapital::new(
            self.balance(self.config.pair.base()).await,
            self.balance(self.config.pair.quote()).await,
        );
        let rules = self.collaborators.venue.trading_rules(&self.symbol).await;

        match self
            .adjuster
            .adjust(quotes.into_vec(), &capital, rules.as_ref())
        {
            BudgetDecision::Rejected(reason) => Err(reason),
            decision => Ok(decision.into_proposals()),
        }
    }

    /// Free balance of `asset`; an unreadable balance counts as zero.
    async fn balance(&self, asset: &str) -> Decimal {
        match self.collaborators.budget.available_balance(asset).await {
            Ok(balance) => balance,
            Err(error) => {
                warn!(asset, %error, "Balance unavailable, treating as zero");
                Decimal::ZERO
            }
        }
    }

    async fn submit_all(&self, proposals: Vec<OrderProposal>, report: &mut TickReport) {
        for proposal in proposals {
            let request = proposal.to_request(self.symbol.clone());
            match self.collaborators.venue.submit(request).await {
                Ok(id) => {
                    debug!(order_id = %id, side = %proposal.side, price = %proposal.price, amount = %proposal.amount, "Order submitted");
                    report.submitted.push(id);
                }
                Err(error) => {
                    warn!(side = %proposal.side, price = %proposal.price, %error, "Submit failed");
                    report.submit_failures.push(CommandFailure {
                        target: proposal.side.to_string(),
                        error,
                    });
                }
            }
        }
    }

    fn enter(&self, report: &mut TickReport, phase: LifecyclePhase) {
        trace!(pair = %self.symbol, from = %report.phase, to = %phase, "Lifecycle transition");
        report.phase = phase;
    }
}
