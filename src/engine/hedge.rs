//! Two-way hedge calculator

use super::{validate_stake, ArbitrageEngine, EngineError, Evaluation, Market, Outcome};
use serde::{Deserialize, Serialize};

/// Equal-payout split of `total` across two prices.
///
/// This is the two-outcome case of the engine's allocation:
/// `stake_1 = total * p2 / (p1 + p2)`.
pub fn two_way_split(total: f64, price1: f64, price2: f64) -> (f64, f64) {
    let stake1 = total * price2 / (price1 + price2);
    (stake1, total - stake1)
}

/// Outcome of a manual or computed two-way hedge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeResult {
    /// Total stake across both bets
    pub total_stake: f64,
    /// Stake on the first price
    pub stake1: f64,
    /// Stake on the second price
    pub stake2: f64,
    /// Profit if the first outcome wins
    pub profit1: f64,
    /// Profit if the second outcome wins
    pub profit2: f64,
    /// Whether both profits are non-negative
    pub risk_free: bool,
}

/// Two-way hedge calculator.
///
/// `stake1` overrides the equal-payout split; the second stake is always the
/// remainder of the total.
#[derive(Debug, Clone, Copy)]
pub struct HedgeCalculator {
    price1: f64,
    price2: f64,
    total_stake: f64,
}

impl HedgeCalculator {
    /// Build a calculator, validating prices and stake through the engine's rules
    pub fn new(price1: f64, price2: f64, total_stake: f64) -> Result<Self, EngineError> {
        Outcome::new("1", price1, "hedge").validate()?;
        Outcome::new("2", price2, "hedge").validate()?;
        validate_stake(total_stake)?;
        Ok(Self {
            price1,
            price2,
            total_stake,
        })
    }

    /// Equal-profit split
    pub fn balanced(&self) -> HedgeResult {
        let (stake1, _) = two_way_split(self.total_stake, self.price1, self.price2);
        self.split(stake1)
    }

    /// Profit per outcome for a manual first stake.
    ///
    /// `stake1` must lie within `[0, total_stake]`.
    pub fn with_stake1(&self, stake1: f64) -> Result<HedgeResult, EngineError> {
        if !stake1.is_finite() || stake1 < 0.0 || stake1 > self.total_stake {
            return Err(EngineError::InvalidStake { stake: stake1 });
        }
        Ok(self.split(stake1))
    }

    fn split(&self, stake1: f64) -> HedgeResult {
        let stake2 = self.total_stake - stake1;
        let profit1 = stake1 * self.price1 - self.total_stake;
        let profit2 = stake2 * self.price2 - self.total_stake;
        HedgeResult {
            total_stake: self.total_stake,
            stake1,
            stake2,
            profit1,
            profit2,
            risk_free: profit1 >= 0.0 && profit2 >= 0.0,
        }
    }

    /// Full engine evaluation of the two prices
    pub fn evaluate(&self, engine: &ArbitrageEngine) -> Result<Evaluation, EngineError> {
        let market = Market::new(vec![
            Outcome::new("Outcome 1", self.price1, "book 1"),
            Outcome::new("Outcome 2", self.price2, "book 2"),
        ]);
        engine.evaluate(&market, self.total_stake)
    }
}
