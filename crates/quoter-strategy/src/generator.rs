//! Quote generator.

use quoter_core::error::{PriceKind, QuoteError};
use quoter_core::types::{decimal_from_f64, OrderProposal, PriceType, Side};
use quoter_indicators::IndicatorSnapshot;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::SpreadSkew;

/// Configuration for the quote generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Fixed size of both quotes, in the base asset
    pub order_amount: Decimal,
    /// Skew applied when the trend is up
    pub uptrend_skew: SpreadSkew,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            order_amount: dec!(0.02),
            uptrend_skew: SpreadSkew::default(),
        }
    }
}

impl QuoteConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.order_amount <= Decimal::ZERO {
            return Err("order amount must be positive".into());
        }
        if self.uptrend_skew.bid_factor < Decimal::ZERO
            || self.uptrend_skew.ask_factor < Decimal::ZERO
        {
            return Err("spread factors must not be negative".into());
        }
        Ok(())
    }
}

/// Prices read from the venue at the start of quoting. `None` = unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarketPrices {
    pub reference_type: PriceType,
    pub reference: Option<Decimal>,
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
}

impl MarketPrices {
    pub fn new(reference: Decimal, best_bid: Decimal, best_ask: Decimal) -> Self {
        Self {
            reference_type: PriceType::MidPrice,
            reference: Some(reference),
            best_bid: Some(best_bid),
            best_ask: Some(best_ask),
        }
    }

    /// All three prices, or the first one that is missing or non-positive.
    fn resolve(&self) -> Result<(Decimal, Decimal, Decimal), QuoteError> {
        let usable = |price: Option<Decimal>, kind: PriceKind| {
            price
                .filter(|p| *p > Decimal::ZERO)
                .ok_or(QuoteError::PriceUnavailable(kind))
        };
        Ok((
            usable(self.reference, PriceKind::Reference(self.reference_type))?,
            usable(self.best_bid, PriceKind::BestBid)?,
            usable(self.best_ask, PriceKind::BestAsk)?,
        ))
    }
}

/// One buy and one sell proposal for the same tick.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotePair {
    pub buy: OrderProposal,
    pub sell: OrderProposal,
    pub bid_spread: Decimal,
    pub ask_spread: Decimal,
}

impl QuotePair {
    pub fn into_vec(self) -> Vec<OrderProposal> {
        vec![self.buy, self.sell]
    }
}

/// Builds the quote pair from prices and indicators.
#[derive(Debug, Clone)]
pub struct QuoteGenerator {
    config: QuoteConfig,
}

impl QuoteGenerator {
    pub fn new(config: QuoteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    /// Skew to use for the given trend.
    pub fn skew(&self, trend_up: bool) -> SpreadSkew {
        if trend_up {
            self.config.uptrend_skew
        } else {
            SpreadSkew::NEUTRAL
        }
    }

    /// Price one side: spread away from the reference, then clamp to the touch.
    fn quote_side(
        &self,
        side: Side,
        volatility: Decimal,
        skew: SpreadSkew,
        reference: Decimal,
        best_bid: Decimal,
        best_ask: Decimal,
    ) -> Result<(OrderProposal, Decimal), QuoteError> {
        let out_of_range = || QuoteError::InvalidProposal {
            side,
            reason: format!("volatility {} puts the quote out of range", volatility),
        };
        let spread = volatility
            .checked_mul(skew.factor(side))
            .ok_or_else(out_of_range)?;
        let desired = Decimal::ONE
            .checked_add(side.away_from_mid() * spread)
            .and_then(|scale| reference.checked_mul(scale))
            .ok_or_else(out_of_range)?;
        // Never improve on the touch: a maker quote inside the book would cross.
        let price = match side {
            Side::Buy => desired.min(best_bid),
            Side::Sell => desired.max(best_ask),
        };
        if price <= Decimal::ZERO {
            return Err(QuoteError::InvalidProposal {
                side,
                reason: format!("price {} is not positive", price),
            });
        }
        if price.checked_mul(self.config.order_amount).is_none() {
            return Err(out_of_range());
        }
        Ok((
            OrderProposal::maker(side, price, self.config.order_amount),
            spread,
        ))
    }

    pub fn generate(
        &self,
        prices: &MarketPrices,
        snapshot: &IndicatorSnapshot,
    ) -> Result<QuotePair, QuoteError> {
        let (reference, best_bid, best_ask) = prices.resolve()?;

        let volatility =
            decimal_from_f64(snapshot.volatility).ok_or_else(|| QuoteError::InvalidProposal {
                side: Side::Buy,
                reason: format!("volatility {} is not a finite number", snapshot.volatility),
            })?;
        let skew = self.skew(snapshot.trend_up);

        let (buy, bid_spread) =
            self.quote_side(Side::Buy, volatility, skew, reference, best_bid, best_ask)?;
        let (sell, ask_spread) =
            self.quote_side(Side::Sell, volatility, skew, reference, best_bid, best_ask)?;

        debug!(
            %reference, %best_bid, %best_ask, trend_up = snapshot.trend_up,
            %bid_spread, %ask_spread, buy = %buy.price, sell = %sell.price,
            "Generated quotes"
        );

        Ok(QuotePair {
            buy,
            sell,
            bid_spread,
            ask_spread,
        })
    }
}
