//! Property sweeps over the arbitrage engine

use rand::{rngs::StdRng, Rng, SeedableRng};
use sports_arbitrage::engine::{
    ArbitrageEngine, BetSlip, EngineError, Evaluation, Market, Outcome,
};

const SWEEPS: usize = 500;

fn random_market(rng: &mut StdRng) -> (Market, usize) {
    let outcomes = rng.gen_range(2..=4);
    let bookmakers = rng.gen_range(1..=5);
    let mut market = Market::default();

    for book in 0..bookmakers {
        for outcome in 0..outcomes {
            let price = rng.gen_range(1.05..(outcomes as f64 * 1.6));
            market.push(Outcome::new(
                format!("outcome-{}", outcome),
                price,
                format!("book-{}", book),
            ));
        }
    }

    (market, outcomes)
}

#[test]
fn test_allocation_invariants_hold() {
    let engine = ArbitrageEngine::new();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut opportunities = 0;

    for _ in 0..SWEEPS {
        let (market, outcomes) = random_market(&mut rng);
        let stake = rng.gen_range(10.0..100_000.0);
        let best = engine.find_best_quotes(&market).unwrap();
        let margin = best.implied_margin();

        match engine.evaluate(&market, stake).unwrap() {
            Evaluation::Opportunity(opportunity) => {
                opportunities += 1;
                assert!(margin < 1.0);
                assert_eq!(opportunity.allocations.len(), outcomes);

                let total: f64 = opportunity.allocations.iter().map(|a| a.stake).sum();
                assert!((total - stake).abs() <= 1e-9 * stake);

                for allocation in &opportunity.allocations {
                    assert!(allocation.stake > 0.0);
                    assert!((allocation.payout() - opportunity.guaranteed_return).abs() <= 1e-6 * stake);
                    // Every allocation takes the best price for its outcome
                    assert_eq!(best.get(&allocation.outcome_name).unwrap().price, allocation.price);
                }

                assert!(opportunity.profit > 0.0);
                let expected_roi = (1.0 / margin - 1.0) * 100.0;
                assert!((opportunity.roi_percent - expected_roi).abs() < 1e-9);
            }
            Evaluation::NoArbitrage(no_arb) => {
                assert!(margin >= 1.0);
                assert_eq!(no_arb.implied_margin, margin);
            }
        }
    }

    // The price range guarantees both branches are exercised
    assert!(opportunities > 0);
    assert!(opportunities < SWEEPS);
}

#[test]
fn test_evaluation_is_deterministic() {
    let engine = ArbitrageEngine::new();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..100 {
        let (market, _) = random_market(&mut rng);
        let first = engine.evaluate(&market, 1000.0).unwrap();
        let second = engine.evaluate(&market, 1000.0).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_better_price_never_raises_margin() {
    let engine = ArbitrageEngine::new();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..SWEEPS {
        let (mut market, _) = random_market(&mut rng);
        let before = engine.find_best_quotes(&market).unwrap().implied_margin();

        let target = market.outcomes[rng.gen_range(0..market.len())].name.clone();
        let boost = rng.gen_range(0.0..3.0);
        market.push(Outcome::new(target, 1.05 + boost, "late-book"));

        let after = engine.find_best_quotes(&market).unwrap().implied_margin();
        assert!(after <= before);
    }
}

#[test]
fn test_invalid_quotes_are_skipped_not_fatal() {
    let engine = ArbitrageEngine::new();
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..100 {
        let (mut market, outcomes) = random_market(&mut rng);
        market.push(Outcome::new("outcome-0", 0.5, "broken-book"));
        market.push(Outcome::new("outcome-1", f64::NAN, "broken-book"));

        let best = engine.find_best_quotes(&market).unwrap();
        assert_eq!(best.len(), outcomes);
        assert_eq!(best.rejected.len(), 2);
        assert!(best.iter().all(|q| q.bookmaker != "broken-book"));
    }
}

#[test]
fn test_single_outcome_markets_are_insufficient() {
    let engine = ArbitrageEngine::new();
    let market = Market::new(vec![
        Outcome::new("Lakers", 2.5, "FanDuel"),
        Outcome::new("Lakers", 2.7, "DraftKings"),
        Outcome::new("Celtics", 1.0, "DraftKings"),
    ]);

    let err = engine.evaluate(&market, 1000.0).unwrap_err();
    assert_eq!(err, EngineError::InsufficientMarket { valid_outcomes: 1 });
    assert_eq!(err.code(), "insufficient_market");
}

#[test]
fn test_bet_slip_keeps_total_across_sweeps() {
    let engine = ArbitrageEngine::new();
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..SWEEPS {
        let (market, _) = random_market(&mut rng);
        let stake = rng.gen_range(10.0..10_000.0_f64).round();

        if let Evaluation::Opportunity(opportunity) = engine.evaluate(&market, stake).unwrap() {
            let slip = BetSlip::from_opportunity(&opportunity, 2).unwrap();
            let legs: rust_decimal::Decimal = slip.legs.iter().map(|l| l.stake).sum();
            assert_eq!(legs, slip.total_stake);
            assert_eq!(slip.legs.len(), opportunity.allocations.len());
        }
    }
}
