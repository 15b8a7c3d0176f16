//! All-or-none budget adjuster.

use quoter_core::error::QuoteError;
use quoter_core::types::{AvailableCapital, OrderProposal, Side, TradingPair, TradingRules};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Budget checking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Fee reserved on top of a buy's notional, in percent
    pub fee_pct: Decimal,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self { fee_pct: dec!(0.1) }
    }
}

/// Outcome of checking one tick's proposals.
#[derive(Debug, Clone, PartialEq)]
pub enum BudgetDecision {
    /// Every proposal is affordable as generated
    Approved(Vec<OrderProposal>),
    /// Every proposal is affordable after snapping to the venue's grid
    Scaled {
        proposals: Vec<OrderProposal>,
        reason: String,
    },
    /// Nothing may be submitted this tick
    Rejected(QuoteError),
}

impl BudgetDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, BudgetDecision::Approved(_) | BudgetDecision::Scaled { .. })
    }

    /// Proposals cleared for submission; empty when rejected.
    pub fn proposals(&self) -> &[OrderProposal] {
        match self {
            BudgetDecision::Approved(proposals) => proposals,
            BudgetDecision::Scaled { proposals, .. } => proposals,
            BudgetDecision::Rejected(_) => &[],
        }
    }

    pub fn into_proposals(self) -> Vec<OrderProposal> {
        match self {
            BudgetDecision::Approved(proposals) => proposals,
            BudgetDecision::Scaled { proposals, .. } => proposals,
            BudgetDecision::Rejected(_) => Vec::new(),
        }
    }
}

/// Filters a proposal set against available capital.
///
/// Read-only: balances are only ever consumed by the venue on fill.
#[derive(Debug, Clone)]
pub struct BudgetAdjuster {
    pair: TradingPair,
    config: BudgetConfig,
}

impl BudgetAdjuster {
    pub fn new(pair: TradingPair, config: BudgetConfig) -> Self {
        Self { pair, config }
    }

    /// Capital `proposal` ties up in its funding asset, fees included.
    pub fn requirement(&self, proposal: &OrderProposal) -> Decimal {
        match proposal.side {
            Side::Buy => proposal.notional() * (Decimal::ONE + self.config.fee_pct / dec!(100)),
            Side::Sell => proposal.amount,
        }
    }

    /// Check `proposals` against `capital`, applying `rules` when the venue has any.
    pub fn adjust(
        &self,
        proposals: Vec<OrderProposal>,
        capital: &AvailableCapital,
        rules: Option<&TradingRules>,
    ) -> BudgetDecision {
        let original = proposals.clone();
        let mut adjusted = Vec::with_capacity(proposals.len());

        for proposal in proposals {
            match Self::apply_rules(proposal, rules) {
                Ok(proposal) => adjusted.push(proposal),
                Err(err) => return self.reject(err),
            }
        }

        for side in Side::BOTH {
            let required: Decimal = adjusted
                .iter()
                .filter(|p| p.side == side)
                .map(|p| self.requirement(p))
                .sum();
            let available = capital.for_side(side);

            if required > available {
                return self.reject(QuoteError::BudgetInsufficient {
                    asset: self.pair.funding_asset(side).to_string(),
                    required,
                    available,
                });
            }
        }

        if adjusted == original {
            BudgetDecision::Approved(adjusted)
        } else {
            BudgetDecision::Scaled {
                proposals: adjusted,
                reason: "snapped to venue trading rules".to_string(),
            }
        }
    }

    fn apply_rules(
        mut proposal: OrderProposal,
        rules: Option<&TradingRules>,
    ) -> Result<OrderProposal, QuoteError> {
        if let Some(rules) = rules {
            proposal.price = rules.quantize_price(proposal.side, proposal.price);
            proposal.amount = rules.quantize_amount(proposal.amount);

            if proposal.amount < rules.min_amount {
                return Err(QuoteError::InvalidProposal {
                    side: proposal.side,
                    reason: format!(
                        "amount {} below minimum {}",
                        proposal.amount, rules.min_amount
                    ),
                });
            }
            if proposal.notional() < rules.min_notional {
                return Err(QuoteError::InvalidProposal {
                    side: proposal.side,
                    reason: format!(
                        "notional {} below minimum {}",
                        proposal.notional(),
                        rules.min_notional
                    ),
                });
            }
        }

        if proposal.amount <= Decimal::ZERO || proposal.price <= Decimal::ZERO {
            return Err(QuoteError::InvalidProposal {
                side: proposal.side,
                reason: "amount and price must be positive".to_string(),
            });
        }

        Ok(proposal)
    }

    fn reject(&self, err: QuoteError) -> BudgetDecision {
        debug!(pair = %self.pair, error = %err, "Dropping all proposals for this tick");
        BudgetDecision::Rejected(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjuster() -> BudgetAdjuster {
        BudgetAdjuster::new("ETH-USDT".parse().unwrap(), BudgetConfig::default())
    }

    fn quotes() -> Vec<OrderProposal> {
        vec![
            OrderProposal::maker(Side::Buy, dec!(1800), dec!(0.02)),
            OrderProposal::maker(Side::Sell, dec!(1820), dec!(0.02)),
        ]
    }

    #[test]
    fn test_funded_set_passes_unchanged() {
        let capital = AvailableCapital::new(dec!(1), dec!(10000));
        let decision = adjuster().adjust(quotes(), &capital, None);

        assert_eq!(decision, BudgetDecision::Approved(quotes()));
        assert!(decision.is_approved());
    }

    #[test]
    fn test_zero_capital_rejects_everything() {
        let decision = adjuster().adjust(quotes(), &AvailableCapital::default(), None);

        assert!(!decision.is_approved());
        assert!(decision.proposals().is_empty());
    }

    #[test]
    fn test_missing_base_drops_the_buy_too() {
        // Plenty of USDT for the buy, but no ETH to sell.
        let capital = AvailableCapital::new(Decimal::ZERO, dec!(10000));
        let decision = adjuster().adjust(quotes(), &capital, None);

        match &decision {
            BudgetDecision::Rejected(QuoteError::BudgetInsufficient {
                asset, required, ..
            }) => {
                assert_eq!(asset, "ETH");
                assert_eq!(*required, dec!(0.02));
            }
            other => panic!("unexpected decision: {:?}", other),
        }
        assert!(decision.into_proposals().is_empty());
    }

    #[test]
    fn test_buy_requirement_includes_fee() {
        let adjuster = adjuster();
        let buy = OrderProposal::maker(Side::Buy, dec!(1000), dec!(1));
        assert_eq!(adjuster.requirement(&buy), dec!(1001));

        // Exactly the notional is not enough once the fee is reserved.
        let capital = AvailableCapital::new(dec!(1), dec!(1000));
        let decision = adjuster.adjust(vec![buy], &capital, None);
        assert!(!decision.is_approved());
    }

    #[test]
    fn test_requirements_aggregate_per_asset() {
        let proposals = vec![
            OrderProposal::maker(Side::Sell, dec!(1820), dec!(0.6)),
            OrderProposal::maker(Side::Sell, dec!(1830), dec!(0.6)),
        ];
        let capital = AvailableCapital::new(dec!(1), dec!(10000));

        assert!(!adjuster().adjust(proposals, &capital, None).is_approved());
    }

    #[test]
    fn test_rules_snap_prices_and_amounts() {
        let rules = TradingRules {
            tick_size: dec!(0.1),
            step_size: dec!(0.01),
            min_amount: dec!(0.01),
            min_notional: dec!(10),
        };
        let proposals = vec![
            OrderProposal::maker(Side::Buy, dec!(1800.37), dec!(0.025)),
            OrderProposal::maker(Side::Sell, dec!(1820.31), dec!(0.025)),
        ];
        let capital = AvailableCapital::new(dec!(1), dec!(10000));

        match adjuster().adjust(proposals, &capital, Some(&rules)) {
            BudgetDecision::Scaled { proposals, .. } => {
                assert_eq!(proposals[0].price, dec!(1800.3));
                assert_eq!(proposals[1].price, dec!(1820.4));
                assert!(proposals.iter().all(|p| p.amount == dec!(0.02)));
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_rule_violation_rejects_whole_set() {
        let rules = TradingRules {
            min_notional: dec!(50),
            ..Default::default()
        };
        let capital = AvailableCapital::new(dec!(1), dec!(10000));
        let decision = adjuster().adjust(quotes(), &capital, Some(&rules));

        assert!(matches!(
            decision,
            BudgetDecision::Rejected(QuoteError::InvalidProposal {
                side: Side::Buy,
                ..
            })
        ));
    }

    #[test]
    fn test_output_is_all_or_none() {
        let adjuster = adjuster();
        let balances = [dec!(0), dec!(0.01), dec!(0.02), dec!(1)];
        let cash = [dec!(0), dec!(30), dec!(36.036), dec!(10000)];

        for base in balances {
            for quote in cash {
                let capital = AvailableCapital::new(base, quote);
                let size = adjuster.adjust(quotes(), &capital, None).proposals().len();
                assert!(size == 0 || size == 2, "partial book for {:?}", capital);
            }
        }
    }
}
