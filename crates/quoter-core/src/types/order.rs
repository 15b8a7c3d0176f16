//! Order types and structures.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Both sides, bid first.
    pub const BOTH: [Side; 2] = [Side::Buy, Side::Sell];

    /// Direction a quote moves away from the reference price (-1 for bids, +1 for asks).
    pub fn away_from_mid(&self) -> Decimal {
        match self {
            Side::Buy => -Decimal::ONE,
            Side::Sell => Decimal::ONE,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// How an order left the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Completely filled
    Filled,
    /// Canceled by the owner
    Canceled,
}

/// A candidate resting order produced by the quote generator.
///
/// The budget adjuster may reduce `amount` or snap `price` to the venue tick,
/// but never flips the side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProposal {
    pub side: Side,
    pub price: Decimal,
    pub amount: Decimal,
    /// Post-only: the order must never take liquidity.
    pub is_maker: bool,
}

impl OrderProposal {
    /// Create a maker-only limit proposal.
    pub fn maker(side: Side, price: Decimal, amount: Decimal) -> Self {
        Self {
            side,
            price,
            amount,
            is_maker: true,
        }
    }

    /// Quote-currency value of the proposal.
    pub fn notional(&self) -> Decimal {
        self.price * self.amount
    }

    /// Turn the proposal into a venue request for `symbol`.
    pub fn to_request(&self, symbol: impl Into<String>) -> OrderRequest {
        OrderRequest {
            symbol: symbol.into(),
            side: self.side,
            amount: self.amount,
            price: self.price,
            maker_only: self.is_maker,
        }
    }
}

/// Limit order request sent to the venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Symbol to trade
    pub symbol: String,
    /// Buy or sell
    pub side: Side,
    /// Quantity in the base asset
    pub amount: Decimal,
    /// Limit price
    pub price: Decimal,
    /// Reject instead of executing against resting liquidity
    pub maker_only: bool,
}

/// A resting order as reported by the venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveOrder {
    pub id: String,
    pub symbol: String,
    pub side: Side,
    pub price: Decimal,
    pub amount: Decimal,
}

/// Execution report for a resting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    /// Order this fill belongs to
    pub order_id: String,
    pub symbol: String,
    pub side: Side,
    /// Quantity filled
    pub amount: Decimal,
    /// Price at which the fill occurred
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl FillEvent {
    /// Human-readable one-liner, e.g. `BUY 0.02 ETH-USDT at 1800.5`.
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} at {}",
            self.side,
            self.amount.normalize(),
            self.symbol,
            self.price.normalize()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_side_direction() {
        assert_eq!(Side::Buy.away_from_mid(), dec!(-1));
        assert_eq!(Side::Sell.away_from_mid(), dec!(1));
        assert_eq!(Side::BOTH, [Side::Buy, Side::Sell]);
    }

    #[test]
    fn test_side_serde() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"buy\"");
        assert_eq!(Side::Sell.to_string(), "SELL");
    }

    #[test]
    fn test_proposal_to_request() {
        let proposal = OrderProposal::maker(Side::Sell, dec!(1810.5), dec!(0.02));
        let request = proposal.to_request("ETH-USDT");

        assert_eq!(request.symbol, "ETH-USDT");
        assert_eq!(request.side, Side::Sell);
        assert_eq!(request.price, dec!(1810.5));
        assert!(request.maker_only);
        assert_eq!(proposal.notional(), dec!(36.210));
    }

    #[test]
    fn test_fill_summary() {
        let fill = FillEvent {
            order_id: "abc".to_string(),
            symbol: "ETH-USDT".to_string(),
            side: Side::Buy,
            amount: dec!(0.0200),
            price: dec!(1800.50),
            timestamp: Utc::now(),
        };

        assert_eq!(fill.summary(), "BUY 0.02 ETH-USDT at 1800.5");
    }

    #[test]
    fn test_order_status_serde() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Canceled).unwrap(),
            "\"canceled\""
        );
    }
}
