//! Cent-rounded bet slips

use super::Opportunity;
use crate::{ArbitrageError, Result};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// One bet to place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetSlipLeg {
    /// Outcome name
    pub outcome_name: String,
    /// Bookmaker
    pub bookmaker: String,
    /// Decimal price
    pub price: Decimal,
    /// Rounded stake
    pub stake: Decimal,
    /// Payout if this outcome wins
    pub payout: Decimal,
}

/// Bets rounded to placeable amounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetSlip {
    /// Legs in allocation order
    pub legs: Vec<BetSlipLeg>,
    /// Total staked, equal to the rounded opportunity stake
    pub total_stake: Decimal,
    /// Smallest payout across legs
    pub worst_case_return: Decimal,
    /// Worst-case return minus total stake
    pub worst_case_profit: Decimal,
}

impl BetSlip {
    /// Round every stake of `opportunity` to `decimal_places`.
    ///
    /// The first leg absorbs the rounding difference so the legs still sum to
    /// the rounded total.
    pub fn from_opportunity(opportunity: &Opportunity, decimal_places: u32) -> Result<Self> {
        let total_stake = to_decimal(opportunity.total_stake, "total stake")?.round_dp(decimal_places);

        let mut legs = opportunity
            .allocations
            .iter()
            .map(|allocation| {
                Ok(BetSlipLeg {
                    outcome_name: allocation.outcome_name.clone(),
                    bookmaker: allocation.bookmaker.clone(),
                    price: to_decimal(allocation.price, "price")?,
                    stake: to_decimal(allocation.stake, "stake")?.round_dp(decimal_places),
                    payout: Decimal::ZERO,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let allocated: Decimal = legs.iter().map(|leg| leg.stake).sum();
        if let Some(first) = legs.first_mut() {
            first.stake += total_stake - allocated;
        }

        for leg in &mut legs {
            leg.payout = leg.stake * leg.price;
        }

        let worst_case_return = legs
            .iter()
            .map(|leg| leg.payout)
            .min()
            .unwrap_or(Decimal::ZERO);

        Ok(Self {
            legs,
            total_stake,
            worst_case_return,
            worst_case_profit: worst_case_return - total_stake,
        })
    }
}

fn to_decimal(value: f64, what: &str) -> Result<Decimal> {
    Decimal::from_f64(value).ok_or_else(|| {
        ArbitrageError::DataParsing(format!("Cannot represent {} {} as a decimal", what, value)).into()
    })
}
