//! Paper trading venue for simulation.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use quoter_core::error::BrokerError;
use quoter_core::traits::{BudgetSource, PriceSource, Venue};
use quoter_core::types::{
    ActiveOrder, FillEvent, OrderRequest, OrderStatus, PriceType, Side, TopOfBook, TradingPair,
    TradingRules,
};

#[derive(Debug, Clone)]
struct PaperOrder {
    id: String,
    pair: TradingPair,
    side: Side,
    price: Decimal,
    amount: Decimal,
}

impl PaperOrder {
    fn to_active(&self) -> ActiveOrder {
        ActiveOrder {
            id: self.id.clone(),
            symbol: self.pair.to_string(),
            side: self.side,
            price: self.price,
            amount: self.amount,
        }
    }
}

/// Closed order IDs remembered so a late cancel is rejected rather than not found.
const CLOSED_HISTORY: usize = 256;

#[derive(Debug, Default)]
struct VenueState {
    /// Total balance per asset, including funds reserved by open orders
    balances: HashMap<String, Decimal>,
    /// Resting orders only; filled and canceled ones move to `closed`
    orders: HashMap<String, PaperOrder>,
    closed: VecDeque<(String, OrderStatus)>,
    books: HashMap<String, TopOfBook>,
    rules: HashMap<String, TradingRules>,
}

impl VenueState {
    fn close(&mut self, id: &str, status: OrderStatus) -> Option<PaperOrder> {
        let order = self.orders.remove(id)?;
        if self.closed.len() == CLOSED_HISTORY {
            self.closed.pop_front();
        }
        self.closed.push_back((order.id.clone(), status));
        Some(order)
    }

    fn closed_status(&self, id: &str) -> Option<OrderStatus> {
        self.closed
            .iter()
            .rev()
            .find(|(closed_id, _)| closed_id == id)
            .map(|(_, status)| *status)
    }
}

/// In-memory venue: resting maker orders, balances and a top of book per symbol.
///
/// Orders fill at their limit price when `update_book` moves the opposite
/// touch through them. Fills are published to subscribers.
pub struct PaperVenue {
    state: Arc<Mutex<VenueState>>,
    fill_tx: Arc<Mutex<Option<mpsc::UnboundedSender<FillEvent>>>>,
    /// Maker fee in percent of notional, charged in the quote asset
    fee_pct: Decimal,
}

impl PaperVenue {
    /// Create an empty paper venue.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(VenueState::default())),
            fill_tx: Arc::new(Mutex::new(None)),
            fee_pct: dec!(0.1),
        }
    }

    /// Set the maker fee percentage.
    pub fn with_fee(mut self, fee_pct: Decimal) -> Self {
        self.fee_pct = fee_pct;
        self
    }

    /// Credit an asset balance.
    pub fn with_balance(self, asset: impl Into<String>, amount: Decimal) -> Self {
        self.deposit(asset, amount);
        self
    }

    /// Publish trading rules for a symbol.
    pub fn with_rules(self, symbol: impl Into<String>, rules: TradingRules) -> Self {
        self.lock().rules.insert(symbol.into(), rules);
        self
    }

    pub fn deposit(&self, asset: impl Into<String>, amount: Decimal) {
        *self.lock().balances.entry(asset.into()).or_default() += amount;
    }

    /// Total balance of an asset, including funds reserved by open orders.
    pub fn total_balance(&self, asset: &str) -> Decimal {
        self.lock().balances.get(asset).copied().unwrap_or_default()
    }

    /// Receive every fill produced from now on. Replaces any earlier subscriber.
    pub fn subscribe_fills(&self) -> mpsc::UnboundedReceiver<FillEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self
            .fill_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(tx);
        rx
    }

    /// Update the top of book for `symbol` and fill every resting order it crosses.
    pub fn update_book(&self, symbol: &str, book: TopOfBook) -> Vec<FillEvent> {
        let fills = {
            let mut state = self.lock();
            state.books.insert(symbol.to_string(), book);
            self.match_orders(&mut state, symbol, &book)
        };

        if !fills.is_empty() {
            let tx = self.fill_tx.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(tx) = tx.as_ref() {
                for fill in &fills {
                    // A dropped receiver just means nobody is listening any more.
                    let _ = tx.send(fill.clone());
                }
            }
        }

        fills
    }

    fn lock(&self) -> MutexGuard<'_, VenueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn match_orders(
        &self,
        state: &mut VenueState,
        symbol: &str,
        book: &TopOfBook,
    ) -> Vec<FillEvent> {
        let crossed: Vec<String> = state
            .orders
            .values()
            .filter(|o| o.pair.to_string() == symbol)
            .filter(|o| match o.side {
                Side::Buy => book.ask.is_some_and(|ask| ask <= o.price),
                Side::Sell => book.bid.is_some_and(|bid| bid >= o.price),
            })
            .map(|o| o.id.clone())
            .collect();

        let mut fills = Vec::with_capacity(crossed.len());
        for id in crossed {
            let Some(order) = state.close(&id, OrderStatus::Filled) else {
                continue;
            };

            let notional = order.price * order.amount;
            let fee = notional * self.fee_pct / dec!(100);
            let (base_delta, quote_delta) = match order.side {
                Side::Buy => (order.amount, -(notional + fee)),
                Side::Sell => (-order.amount, notional - fee),
            };
            *state
                .balances
                .entry(order.pair.base().to_string())
                .or_default() += base_delta;
            *state
                .balances
                .entry(order.pair.quote().to_string())
                .or_default() += quote_delta;

            info!(order_id = %order.id, side = %order.side, price = %order.price, amount = %order.amount, "Paper fill");
            fills.push(FillEvent {
                order_id: order.id,
                symbol: symbol.to_string(),
                side: order.side,
                amount: order.amount,
                price: order.price,
                timestamp: Utc::now(),
            });
        }

        fills
    }

    /// Funds an open order holds back in its funding asset.
    fn reserved(&self, order: &PaperOrder) -> Decimal {
        match order.side {
            Side::Buy => order.price * order.amount * (Decimal::ONE + self.fee_pct / dec!(100)),
            Side::Sell => order.amount,
        }
    }

    fn available(&self, state: &VenueState, asset: &str) -> Decimal {
        let total = state.balances.get(asset).copied().unwrap_or_default();
        let reserved: Decimal = state
            .orders
            .values()
            .filter(|o| o.pair.funding_asset(o.side) == asset)
            .map(|o| self.reserved(o))
            .sum();
        total - reserved
    }
}

impl Default for PaperVenue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Venue for PaperVenue {
    async fn active_orders(&self, symbol: &str) -> Result<Vec<ActiveOrder>, BrokerError> {
        let state = self.lock();
        Ok(state
            .orders
            .values()
            .filter(|o| o.pair.to_string() == symbol)
            .map(PaperOrder::to_active)
            .collect())
    }

    async fn cancel(&self, symbol: &str, order_id: &str) -> Result<(), BrokerError> {
        let mut state = self.lock();
        let resting = state
            .orders
            .get(order_id)
            .is_some_and(|o| o.pair.to_string() == symbol);

        if !resting {
            return match state.closed_status(order_id) {
                Some(status) => Err(BrokerError::OrderRejected(format!(
                    "order {} already {:?}",
                    order_id, status
                ))),
                None => Err(BrokerError::OrderNotFound(order_id.to_string())),
            };
        }

        state.close(order_id, OrderStatus::Canceled);
        debug!(order_id, "Paper order canceled");
        Ok(())
    }

    async fn submit(&self, request: OrderRequest) -> Result<String, BrokerError> {
        let pair: TradingPair = request
            .symbol
            .parse()
            .map_err(|_| BrokerError::UnknownSymbol(request.symbol.clone()))?;

        if request.amount <= Decimal::ZERO || request.price <= Decimal::ZERO {
            return Err(BrokerError::OrderRejected(
                "amount and price must be positive".to_string(),
            ));
        }

        let mut state = self.lock();

        if request.maker_only {
            let book = state.books.get(&request.symbol).copied().unwrap_or_default();
            let crosses = match request.side {
                Side::Buy => book.ask.is_some_and(|ask| request.price >= ask),
                Side::Sell => book.bid.is_some_and(|bid| request.price <= bid),
            };
            if crosses {
                return Err(BrokerError::WouldCross {
                    side: request.side,
                    price: request.price,
                });
            }
        }

        let order = PaperOrder {
            id: Uuid::new_v4().to_string(),
            pair,
            side: request.side,
            price: request.price,
            amount: request.amount,
        };

        let asset = order.pair.funding_asset(order.side).to_string();
        let required = self.reserved(&order);
        let available = self.available(&state, &asset);
        if required > available {
            return Err(BrokerError::InsufficientFunds {
                required,
                available,
            });
        }

        let id = order.id.clone();
        state.orders.insert(id.clone(), order);
        Ok(id)
    }

    async fn trading_rules(&self, symbol: &str) -> Option<TradingRules> {
        self.lock().rules.get(symbol).cloned()
    }

    fn name(&self) -> &str {
        "paper"
    }
}

#[async_trait]
impl PriceSource for PaperVenue {
    async fn best_bid(&self, symbol: &str) -> Option<Decimal> {
        self.lock().books.get(symbol).and_then(|b| b.bid)
    }

    async fn best_ask(&self, symbol: &str) -> Option<Decimal> {
        self.lock().books.get(symbol).and_then(|b| b.ask)
    }

    async fn price(&self, symbol: &str, price_type: PriceType) -> Option<Decimal> {
        self.lock()
            .books
            .get(symbol)
            .and_then(|b| b.price(price_type))
    }
}

#[async_trait]
impl BudgetSource for PaperVenue {
    async fn available_balance(&self, asset: &str) -> Result<Decimal, BrokerError> {
        let state = self.lock();
        Ok(self.available(&state, asset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIR: &str = "ETH-USDT";

    fn venue() -> PaperVenue {
        let venue = PaperVenue::new()
            .with_fee(Decimal::ZERO)
            .with_balance("ETH", dec!(1))
            .with_balance("USDT", dec!(10000));
        venue.update_book(PAIR, TopOfBook::new(dec!(1799), dec!(1801)));
        venue
    }

    fn limit(side: Side, price: Decimal) -> OrderRequest {
        OrderRequest {
            symbol: PAIR.to_string(),
            side,
            amount: dec!(0.5),
            price,
            maker_only: true,
        }
    }

    #[tokio::test]
    async fn test_submit_and_cancel() {
        let venue = venue();

        let id = venue.submit(limit(Side::Buy, dec!(1790))).await.unwrap();
        let active = venue.active_orders(PAIR).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, id);

        venue.cancel(PAIR, &id).await.unwrap();
        assert!(venue.active_orders(PAIR).await.unwrap().is_empty());

        // Second cancel is rejected, unknown IDs are not found.
        assert!(matches!(
            venue.cancel(PAIR, &id).await,
            Err(BrokerError::OrderRejected(_))
        ));
        assert!(matches!(
            venue.cancel(PAIR, "missing").await,
            Err(BrokerError::OrderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_closed_orders_leave_the_book() {
        let venue = venue();

        for _ in 0..1000 {
            let id = venue.submit(limit(Side::Buy, dec!(1790))).await.unwrap();
            venue.cancel(PAIR, &id).await.unwrap();
        }
        let filled = venue.submit(limit(Side::Buy, dec!(1790))).await.unwrap();
        venue.update_book(PAIR, TopOfBook::new(dec!(1785), dec!(1789)));

        {
            let state = venue.lock();
            assert!(state.orders.is_empty());
            assert_eq!(state.closed.len(), CLOSED_HISTORY);
        }
        assert!(matches!(
            venue.cancel(PAIR, &filled).await,
            Err(BrokerError::OrderRejected(_))
        ));
        assert_eq!(venue.available_balance("USDT").await.unwrap(), dec!(9105));
    }

    #[tokio::test]
    async fn test_maker_only_rejects_crossing_orders() {
        let venue = venue();

        let buy = venue.submit(limit(Side::Buy, dec!(1801))).await;
        assert!(matches!(buy, Err(BrokerError::WouldCross { side: Side::Buy, .. })));

        let sell = venue.submit(limit(Side::Sell, dec!(1799))).await;
        assert!(matches!(sell, Err(BrokerError::WouldCross { side: Side::Sell, .. })));
    }

    #[tokio::test]
    async fn test_open_orders_reserve_funds() {
        let venue = venue();
        venue.submit(limit(Side::Sell, dec!(1810))).await.unwrap();

        assert_eq!(venue.available_balance("ETH").await.unwrap(), dec!(0.5));
        assert_eq!(venue.total_balance("ETH"), dec!(1));

        venue.submit(limit(Side::Sell, dec!(1811))).await.unwrap();
        let third = venue.submit(limit(Side::Sell, dec!(1812))).await;
        assert!(matches!(third, Err(BrokerError::InsufficientFunds { .. })));
    }

    #[tokio::test]
    async fn test_book_update_fills_crossed_orders() {
        let venue = venue();
        let mut fills_rx = venue.subscribe_fills();
        let buy_id = venue.submit(limit(Side::Buy, dec!(1790))).await.unwrap();
        venue.submit(limit(Side::Sell, dec!(1810))).await.unwrap();

        let fills = venue.update_book(PAIR, TopOfBook::new(dec!(1785), dec!(1789)));

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].order_id, buy_id);
        assert_eq!(fills[0].summary(), "BUY 0.5 ETH-USDT at 1790");
        assert_eq!(fills_rx.recv().await.unwrap(), fills[0]);

        assert_eq!(venue.total_balance("ETH"), dec!(1.5));
        assert_eq!(venue.total_balance("USDT"), dec!(9105));
        // The resting sell is untouched.
        assert_eq!(venue.active_orders(PAIR).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_prices_from_book() {
        let venue = venue();

        assert_eq!(venue.best_bid(PAIR).await, Some(dec!(1799)));
        assert_eq!(venue.price(PAIR, PriceType::MidPrice).await, Some(dec!(1800)));
        assert_eq!(venue.price(PAIR, PriceType::LastTrade).await, None);
        assert_eq!(venue.best_ask("BTC-USDT").await, None);
    }

    #[tokio::test]
    async fn test_fee_charged_on_fill() {
        let venue = PaperVenue::new()
            .with_fee(dec!(0.1))
            .with_balance("USDT", dec!(2000));
        venue.update_book(PAIR, TopOfBook::new(dec!(999), dec!(1001)));

        venue
            .submit(OrderRequest {
                amount: dec!(1),
                ..limit(Side::Buy, dec!(1000))
            })
            .await
            .unwrap();
        assert_eq!(venue.available_balance("USDT").await.unwrap(), dec!(999));

        venue.update_book(PAIR, TopOfBook::new(dec!(990), dec!(995)));
        assert_eq!(venue.total_balance("USDT"), dec!(999));
        assert_eq!(venue.total_balance("ETH"), dec!(1));
    }

    #[tokio::test]
    async fn test_rules_published_per_symbol() {
        let rules = TradingRules {
            tick_size: dec!(0.01),
            ..Default::default()
        };
        let venue = PaperVenue::new().with_rules(PAIR, rules.clone());

        assert_eq!(venue.trading_rules(PAIR).await, Some(rules));
        assert_eq!(venue.trading_rules("BTC-USDT").await, None);
    }
}
