//! Test doubles for the lifecycle collaborators.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

use quoter_core::error::{BrokerError, DataError};
use quoter_core::traits::{BudgetSource, CandleFeed, FillNotifier, PriceSource, Venue};
use quoter_core::types::{ActiveOrder, Bar, FillEvent, OrderRequest, Side, TopOfBook};

/// Closes 100, 101, ..., 110: enough for the default lookback, trending up.
pub fn rising_closes() -> Vec<f64> {
    (100..=110).map(f64::from).collect()
}

pub struct StaticFeed {
    bars: Vec<Bar>,
}

impl StaticFeed {
    pub fn new(closes: &[f64]) -> Self {
        Self {
            bars: closes
                .iter()
                .enumerate()
                .map(|(i, &close)| Bar::flat(i as i64 * 60_000, close))
                .collect(),
        }
    }
}

#[async_trait]
impl CandleFeed for StaticFeed {
    async fn start(&self) -> Result<(), DataError> {
        Ok(())
    }

    async fn stop(&self) {}

    fn window(&self) -> Vec<Bar> {
        self.bars.clone()
    }

    fn is_running(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[derive(Default)]
struct MockState {
    orders: Vec<ActiveOrder>,
    submitted: Vec<OrderRequest>,
    list_calls: usize,
    next_id: usize,
}

/// Venue that records commands and fails on request.
pub struct MockVenue {
    book: TopOfBook,
    balances: HashMap<String, Decimal>,
    failing_cancels: Vec<String>,
    failing_side: Option<Side>,
    state: Mutex<MockState>,
}

impl MockVenue {
    pub fn new(book: TopOfBook) -> Self {
        Self {
            book,
            balances: HashMap::new(),
            failing_cancels: Vec::new(),
            failing_side: None,
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn with_balance(mut self, asset: &str, amount: Decimal) -> Self {
        self.balances.insert(asset.to_string(), amount);
        self
    }

    pub fn with_orders(self, ids: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for id in ids {
                state.orders.push(ActiveOrder {
                    id: id.to_string(),
                    symbol: "ETH-USDT".to_string(),
                    side: Side::Buy,
                    price: Decimal::ONE,
                    amount: Decimal::ONE,
                });
            }
        }
        self
    }

    pub fn failing_cancel(mut self, id: &str) -> Self {
        self.failing_cancels.push(id.to_string());
        self
    }

    pub fn failing_submit(mut self, side: Side) -> Self {
        self.failing_side = Some(side);
        self
    }

    pub fn submitted(&self) -> Vec<OrderRequest> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn open_orders(&self) -> usize {
        self.state.lock().unwrap().orders.len()
    }
}

#[async_trait]
impl Venue for MockVenue {
    async fn active_orders(&self, symbol: &str) -> Result<Vec<ActiveOrder>, BrokerError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        Ok(state
            .orders
            .iter()
            .filter(|o| o.symbol == symbol)
            .cloned()
            .collect())
    }

    async fn cancel(&self, _symbol: &str, order_id: &str) -> Result<(), BrokerError> {
        if self.failing_cancels.iter().any(|id| id == order_id) {
            return Err(BrokerError::Connection("cancel timed out".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        state.orders.retain(|o| o.id != order_id);
        Ok(())
    }

    async fn submit(&self, request: OrderRequest) -> Result<String, BrokerError> {
        if self.failing_side == Some(request.side) {
            return Err(BrokerError::OrderRejected("rejected by mock".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("order-{}", state.next_id);
        state.orders.push(ActiveOrder {
            id: id.clone(),
            symbol: request.symbol.clone(),
            side: request.side,
            price: request.price,
            amount: request.amount,
        });
        state.submitted.push(request);
        Ok(id)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl PriceSource for MockVenue {
    async fn best_bid(&self, _symbol: &str) -> Option<Decimal> {
        self.book.bid
    }

    async fn best_ask(&self, _symbol: &str) -> Option<Decimal> {
        self.book.ask
    }
}

#[async_trait]
impl BudgetSource for MockVenue {
    async fn available_balance(&self, asset: &str) -> Result<Decimal, BrokerError> {
        self.balances
            .get(asset)
            .copied()
            .ok_or_else(|| BrokerError::Connection(format!("no balance for {}", asset)))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl FillNotifier for RecordingNotifier {
    fn notify(&self, _fill: &FillEvent, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
