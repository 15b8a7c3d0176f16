//! Execution venue trait definitions.

use crate::error::BrokerError;
use crate::types::{ActiveOrder, OrderRequest, PriceType, TradingRules};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Order query and command interface of an execution venue.
///
/// The venue owns all order state; callers observe it through
/// `active_orders` and never keep their own copy.
#[async_trait]
pub trait Venue: Send + Sync {
    /// All resting orders for `symbol`.
    async fn active_orders(&self, symbol: &str) -> Result<Vec<ActiveOrder>, BrokerError>;

    /// Cancel one resting order.
    async fn cancel(&self, symbol: &str, order_id: &str) -> Result<(), BrokerError>;

    /// Submit a limit order.
    ///
    /// # Returns
    /// The venue-assigned order ID
    async fn submit(&self, request: OrderRequest) -> Result<String, BrokerError>;

    /// Size and price granularity for `symbol`, if the venue publishes any.
    async fn trading_rules(&self, _symbol: &str) -> Option<TradingRules> {
        None
    }

    /// Get the venue name.
    fn name(&self) -> &str;
}

/// Pricing queries. `None` means the price is currently unavailable.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn best_bid(&self, symbol: &str) -> Option<Decimal>;

    async fn best_ask(&self, symbol: &str) -> Option<Decimal>;

    /// Price of the given type; the default derives mid, bid and ask from the top of book.
    async fn price(&self, symbol: &str, price_type: PriceType) -> Option<Decimal> {
        match price_type {
            PriceType::BestBid => self.best_bid(symbol).await,
            PriceType::BestAsk => self.best_ask(symbol).await,
            PriceType::MidPrice => {
                let bid = self.best_bid(symbol).await?;
                let ask = self.best_ask(symbol).await?;
                Some((bid + ask) / Decimal::TWO)
            }
            PriceType::LastTrade => None,
        }
    }
}

/// Budget query. Balances are owned and mutated exclusively by the venue.
#[async_trait]
pub trait BudgetSource: Send + Sync {
    /// Free (not reserved by resting orders) balance of `asset`.
    async fn available_balance(&self, asset: &str) -> Result<Decimal, BrokerError>;
}
