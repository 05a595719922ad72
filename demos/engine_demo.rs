//! Engine walkthrough: best-price selection, stake allocation and bet slips

use sports_arbitrage::{
    engine::{ArbitrageEngine, BetSlip, Evaluation, HedgeCalculator, Market, Outcome},
    utils::logger,
    Result,
};
use tracing::info;

fn main() -> Result<()> {
    logger::init("info", "logs/engine_demo.log")?;

    let engine = ArbitrageEngine::new();

    println!("Two-way market across two bookmakers");
    println!("====================================");
    let market = Market::new(vec![
        Outcome::new("Lakers", 2.10, "FanDuel"),
        Outcome::new("Celtics", 1.80, "FanDuel"),
        Outcome::new("Lakers", 1.90, "DraftKings"),
        Outcome::new("Celtics", 2.05, "DraftKings"),
    ]);
    print_evaluation(&engine.evaluate(&market, 1000.0)?)?;

    println!();
    println!("Three-way market with a draw");
    println!("============================");
    let market = Market::new(vec![
        Outcome::new("Arsenal", 4.20, "Bet365"),
        Outcome::new("Draw", 3.80, "William Hill"),
        Outcome::new("Chelsea", 4.50, "Betfair"),
        Outcome::new("Arsenal", 3.90, "Betfair"),
    ]);
    print_evaluation(&engine.evaluate(&market, 500.0)?)?;

    println!();
    println!("Ordinary market with a bookmaker margin");
    println!("=======================================");
    let market = Market::new(vec![
        Outcome::new("Home", 1.85, "Pinnacle"),
        Outcome::new("Away", 1.95, "Pinnacle"),
    ]);
    print_evaluation(&engine.evaluate(&market, 1000.0)?)?;

    println!();
    println!("Manual hedge");
    println!("============");
    let hedge = HedgeCalculator::new(2.10, 2.05, 1000.0)?;
    for result in [hedge.balanced(), hedge.with_stake1(600.0)?] {
        println!(
            "  stake1 {:.2} stake2 {:.2} -> profit {:.2} / {:.2} (risk free: {})",
            result.stake1, result.stake2, result.profit1, result.profit2, result.risk_free
        );
    }

    info!("Engine demo completed");
    Ok(())
}

fn print_evaluation(evaluation: &Evaluation) -> Result<()> {
    match evaluation {
        Evaluation::Opportunity(opportunity) => {
            println!(
                "  Margin {:.4}, ROI {:.3}%, guaranteed return {:.2}",
                opportunity.implied_margin, opportunity.roi_percent, opportunity.guaranteed_return
            );
            for allocation in &opportunity.allocations {
                println!(
                    "    {:<10} {:>9.2} @ {:.2} on {}",
                    allocation.outcome_name, allocation.stake, allocation.price, allocation.bookmaker
                );
            }

            let slip = BetSlip::from_opportunity(opportunity, 2)?;
            println!(
                "  Rounded slip: worst-case return {} profit {}",
                slip.worst_case_return.round_dp(2),
                slip.worst_case_profit.round_dp(2)
            );
        }
        Evaluation::NoArbitrage(no_arb) => {
            println!("  {} (margin {:.4})", no_arb.reason, no_arb.implied_margin);
        }
    }
    Ok(())
}
