//! Instrument and market-state types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Side;

/// A `BASE-QUOTE` instrument such as `ETH-USDT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TradingPair {
    base: String,
    quote: String,
}

impl TradingPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Asset received on a buy and given up on a sell.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Asset paid on a buy and received on a sell.
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Asset that funds an order on `side`.
    pub fn funding_asset(&self, side: Side) -> &str {
        match side {
            Side::Buy => &self.quote,
            Side::Sell => &self.base,
        }
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.quote)
    }
}

impl FromStr for TradingPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((base, quote))
                if !base.is_empty() && !quote.is_empty() && !quote.contains('-') =>
            {
                Ok(Self::new(base.to_uppercase(), quote.to_uppercase()))
            }
            _ => Err(format!("Invalid trading pair '{}', expected BASE-QUOTE", s)),
        }
    }
}

impl TryFrom<String> for TradingPair {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TradingPair> for String {
    fn from(pair: TradingPair) -> Self {
        pair.to_string()
    }
}

/// Which market price anchors the quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    #[default]
    MidPrice,
    BestBid,
    BestAsk,
    LastTrade,
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceType::MidPrice => write!(f, "mid_price"),
            PriceType::BestBid => write!(f, "best_bid"),
            PriceType::BestAsk => write!(f, "best_ask"),
            PriceType::LastTrade => write!(f, "last_trade"),
        }
    }
}

/// Best bid/ask and last trade for one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TopOfBook {
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub last: Option<Decimal>,
}

impl TopOfBook {
    pub fn new(bid: Decimal, ask: Decimal) -> Self {
        Self {
            bid: Some(bid),
            ask: Some(ask),
            last: None,
        }
    }

    /// Get the mid price, if both sides are present.
    pub fn mid(&self) -> Option<Decimal> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }

    /// Resolve a price of the given type.
    pub fn price(&self, price_type: PriceType) -> Option<Decimal> {
        match price_type {
            PriceType::MidPrice => self.mid(),
            PriceType::BestBid => self.bid,
            PriceType::BestAsk => self.ask,
            PriceType::LastTrade => self.last,
        }
    }
}

/// Venue-side constraints on order size and price granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingRules {
    /// Minimum price increment (0 = unrestricted)
    pub tick_size: Decimal,
    /// Minimum amount increment (0 = unrestricted)
    pub step_size: Decimal,
    pub min_amount: Decimal,
    pub min_notional: Decimal,
}

impl Default for TradingRules {
    fn default() -> Self {
        Self {
            tick_size: Decimal::ZERO,
            step_size: Decimal::ZERO,
            min_amount: Decimal::ZERO,
            min_notional: Decimal::ZERO,
        }
    }
}

impl TradingRules {
    /// Snap a price onto the tick grid, away from the mid so a maker quote
    /// never becomes more aggressive than requested.
    pub fn quantize_price(&self, side: Side, price: Decimal) -> Decimal {
        if self.tick_size <= Decimal::ZERO {
            return price;
        }
        let ticks = price / self.tick_size;
        let ticks = match side {
            Side::Buy => ticks.floor(),
            Side::Sell => ticks.ceil(),
        };
        (ticks * self.tick_size).normalize()
    }

    /// Round an amount down to the step grid.
    pub fn quantize_amount(&self, amount: Decimal) -> Decimal {
        if self.step_size <= Decimal::ZERO {
            return amount;
        }
        ((amount / self.step_size).floor() * self.step_size).normalize()
    }
}

/// Free balances of both legs of a pair, as reported by the venue.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AvailableCapital {
    pub base: Decimal,
    pub quote: Decimal,
}

impl AvailableCapital {
    pub fn new(base: Decimal, quote: Decimal) -> Self {
        Self { base, quote }
    }

    /// Balance that funds an order on `side`.
    pub fn for_side(&self, side: Side) -> Decimal {
        match side {
            Side::Buy => self.quote,
            Side::Sell => self.base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trading_pair_parse() {
        let pair: TradingPair = "eth-usdt".parse().unwrap();
        assert_eq!(pair.base(), "ETH");
        assert_eq!(pair.quote(), "USDT");
        assert_eq!(pair.to_string(), "ETH-USDT");
        assert_eq!(pair.funding_asset(Side::Buy), "USDT");
        assert_eq!(pair.funding_asset(Side::Sell), "ETH");

        assert!("ETHUSDT".parse::<TradingPair>().is_err());
        assert!("-USDT".parse::<TradingPair>().is_err());
        assert!("A-B-C".parse::<TradingPair>().is_err());
    }

    #[test]
    fn test_top_of_book_prices() {
        let mut book = TopOfBook::new(dec!(99.9), dec!(100.1));
        assert_eq!(book.mid(), Some(dec!(100.0)));
        assert_eq!(book.price(PriceType::BestAsk), Some(dec!(100.1)));
        assert_eq!(book.price(PriceType::LastTrade), None);

        book.last = Some(dec!(100.05));
        assert_eq!(book.price(PriceType::LastTrade), Some(dec!(100.05)));

        book.ask = None;
        assert_eq!(book.mid(), None);
    }

    #[test]
    fn test_quantize_price_moves_away_from_mid() {
        let rules = TradingRules {
            tick_size: dec!(0.01),
            ..Default::default()
        };
        assert_eq!(rules.quantize_price(Side::Buy, dec!(99.8765)), dec!(99.87));
        assert_eq!(rules.quantize_price(Side::Sell, dec!(100.1234)), dec!(100.13));
        assert_eq!(rules.quantize_price(Side::Sell, dec!(100.12)), dec!(100.12));
    }

    #[test]
    fn test_quantize_amount_rounds_down() {
        let rules = TradingRules {
            step_size: dec!(0.001),
            ..Default::default()
        };
        assert_eq!(rules.quantize_amount(dec!(0.02049)), dec!(0.02));
        assert_eq!(TradingRules::default().quantize_amount(dec!(0.02049)), dec!(0.02049));
    }

    #[test]
    fn test_available_capital_for_side() {
        let capital = AvailableCapital::new(dec!(1), dec!(2000));
        assert_eq!(capital.for_side(Side::Buy), dec!(2000));
        assert_eq!(capital.for_side(Side::Sell), dec!(1));
    }
}
