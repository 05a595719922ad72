//! Arbitrage detection and stake allocation

use super::{
    Allocation, BestQuote, BestQuotes, EngineError, Evaluation, Market, NoArbitrage,
    NoArbitrageReason, Opportunity,
};
use indexmap::map::Entry;
use tracing::{debug, warn};

/// Minimum number of distinct outcomes needed to compare prices
pub const MIN_OUTCOMES: usize = 2;

/// Stateless arbitrage engine.
///
/// Every call is a pure function of its inputs, so one engine can be shared
/// freely between tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArbitrageEngine;

impl ArbitrageEngine {
    /// Create a new engine
    pub fn new() -> Self {
        Self
    }

    /// Find the highest price per outcome name.
    ///
    /// Quotes are visited in input order and a later quote only replaces the
    /// current best when strictly higher, so ties go to the first bookmaker seen.
    /// Invalid prices are skipped and recorded in [`BestQuotes::rejected`].
    pub fn find_best_quotes(&self, market: &Market) -> Result<BestQuotes, EngineError> {
        let mut best = BestQuotes::default();

        for outcome in &market.outcomes {
            if let Err(e) = outcome.validate() {
                warn!(
                    outcome = %outcome.name,
                    bookmaker = %outcome.bookmaker,
                    price = outcome.price,
                    "Excluding quote: {}", e
                );
                best.rejected.push(e);
                continue;
            }

            match best.quotes.entry(outcome.name.clone()) {
                Entry::Occupied(mut entry) => {
                    let current = entry.get_mut();
                    if outcome.price > current.price {
                        current.price = outcome.price;
                        current.bookmaker = outcome.bookmaker.clone();
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(BestQuote {
                        outcome_name: outcome.name.clone(),
                        price: outcome.price,
                        bookmaker: outcome.bookmaker.clone(),
                    });
                }
            }
        }

        if best.len() < MIN_OUTCOMES {
            return Err(EngineError::InsufficientMarket {
                valid_outcomes: best.len(),
            });
        }

        Ok(best)
    }

    /// Evaluate a market for arbitrage at the given total stake
    pub fn evaluate(&self, market: &Market, total_stake: f64) -> Result<Evaluation, EngineError> {
        validate_stake(total_stake)?;
        let best = self.find_best_quotes(market)?;
        self.evaluate_quotes(&best, total_stake)
    }

    /// Evaluate already-selected best quotes.
    ///
    /// Stakes are `(total / price) / margin`, which makes `stake * price`
    /// equal to `total / margin` for every outcome. Floating-point residue is
    /// folded into the first allocation so stakes sum to `total_stake`.
    pub fn evaluate_quotes(
        &self,
        best: &BestQuotes,
        total_stake: f64,
    ) -> Result<Evaluation, EngineError> {
        validate_stake(total_stake)?;

        if best.len() < MIN_OUTCOMES {
            return Err(EngineError::InsufficientMarket {
                valid_outcomes: best.len(),
            });
        }

        let implied_margin = best.implied_margin();

        if implied_margin >= 1.0 {
            debug!(implied_margin, outcomes = best.len(), "No arbitrage at best prices");
            return Ok(Evaluation::NoArbitrage(NoArbitrage {
                reason: NoArbitrageReason::NoEdge,
                implied_margin,
            }));
        }

        let mut allocations: Vec<Allocation> = best
            .iter()
            .map(|quote| Allocation {
                outcome_name: quote.outcome_name.clone(),
                bookmaker: quote.bookmaker.clone(),
                price: quote.price,
                stake: (total_stake / quote.price) / implied_margin,
            })
            .collect();

        let residue = total_stake - allocations.iter().map(|a| a.stake).sum::<f64>();
        if residue.abs() > 0.0 {
            if let Some(first) = allocations.first_mut() {
                first.stake += residue;
            }
        }

        let guaranteed_return = total_stake / implied_margin;
        if !guaranteed_return.is_finite() || allocations.iter().any(|a| !a.stake.is_finite()) {
            warn!(total_stake, implied_margin, "Stake allocation overflowed");
            return Err(EngineError::InvalidStake { stake: total_stake });
        }

        let profit = guaranteed_return - total_stake;
        let roi_percent = profit / total_stake * 100.0;

        debug!(
            implied_margin,
            guaranteed_return,
            roi_percent,
            "Arbitrage found across {} outcomes",
            allocations.len()
        );

        Ok(Evaluation::Opportunity(Opportunity {
            total_stake,
            implied_margin,
            allocations,
            guaranteed_return,
            profit,
            roi_percent,
        }))
    }
}

/// Reject stakes that are not finite and strictly positive
pub fn validate_stake(total_stake: f64) -> Result<(), EngineError> {
    if !total_stake.is_finite() || total_stake <= 0.0 {
        return Err(EngineError::InvalidStake { stake: total_stake });
    }
    Ok(())
}
