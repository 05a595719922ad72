use clap::{ArgGroup, Parser, Subcommand};
use sports_arbitrage::{
    config::{EngineConfig, ScannerConfig},
    engine::{
        american_to_decimal, decimal_to_american, format_american, implied_probability,
        validate_stake, ArbitrageEngine, BestQuotes, BetSlip, Evaluation, HedgeCalculator, Market,
        OddsFormat, Outcome,
    },
    scanner::{LogNotifier, ScanReport, Scanner},
    utils::{logger, metrics},
    ArbitrageError, Result,
};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "arbitrage")]
#[command(about = "Sports-betting arbitrage scanner and stake calculator")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/scanner.toml")]
    config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Log file path
    #[arg(long, default_value = "logs/arbitrage.log")]
    log_file: PathBuf,

    /// Emit console logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch odds once and print ranked opportunities
    Scan {
        /// Total stake per event, defaults to the configured stake
        #[arg(long)]
        stake: Option<f64>,

        /// Print the scan report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Poll providers until interrupted
    Watch,
    /// Evaluate a manually entered market
    Calc {
        /// Quote as NAME=PRICE@BOOKMAKER, repeat for each quote
        #[arg(short, long = "quote", required = true)]
        quotes: Vec<String>,

        /// Total stake
        #[arg(long, default_value_t = 1000.0)]
        stake: f64,

        /// Price format of the quotes (decimal or american)
        #[arg(long, default_value_t = OddsFormat::Decimal)]
        format: OddsFormat,
    },
    /// Split a stake across a two-way market
    Hedge {
        /// Decimal price of the first outcome
        #[arg(long)]
        odds1: f64,

        /// Decimal price of the second outcome
        #[arg(long)]
        odds2: f64,

        /// Total stake
        #[arg(long, default_value_t = 1000.0)]
        stake: f64,

        /// Manual stake on the first outcome instead of the balanced split
        #[arg(long)]
        stake1: Option<f64>,
    },
    /// Convert between decimal and American odds
    #[command(group(ArgGroup::new("odds").required(true).args(["decimal", "american"])))]
    Convert {
        /// Decimal odds
        #[arg(long)]
        decimal: Option<f64>,

        /// American odds
        #[arg(long, allow_hyphen_values = true)]
        american: Option<f64>,
    },
    /// Validate configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let format = if cli.log_json {
        logger::LogFormat::Json
    } else {
        logger::LogFormat::Pretty
    };
    logger::init_with_format(&cli.log_level, &cli.log_file, format)?;

    info!("Starting Sports Arbitrage Scanner v{}", sports_arbitrage::VERSION);

    match cli.command {
        Commands::Scan { stake, json } => {
            let config = load_config(&cli.config)?;
            run_scan(config, stake, json).await
        }
        Commands::Watch => {
            let config = load_config(&cli.config)?;
            run_watch(config).await
        }
        Commands::Calc { quotes, stake, format } => {
            let engine_config = load_engine_config(&cli.config)?;
            run_calc(&quotes, stake, format, engine_config.stake_decimal_places)
        }
        Commands::Hedge { odds1, odds2, stake, stake1 } => run_hedge(odds1, odds2, stake, stake1),
        Commands::Convert { decimal, american } => run_convert(decimal, american),
        Commands::Validate => {
            let config = load_config(&cli.config)?;
            validate_config(config)
        }
    }
}

/// Load the configuration file, falling back to defaults when it does not exist
fn load_config(path: &PathBuf) -> Result<ScannerConfig> {
    if !path.exists() {
        warn!("Config file {} not found, using defaults", path.display());
        return Ok(ScannerConfig::default());
    }

    let config = ScannerConfig::from_file(path)?;
    info!("Configuration loaded from: {}", path.display());
    Ok(config)
}

/// Load the engine settings only, falling back to defaults when the file does not exist
fn load_engine_config(path: &PathBuf) -> Result<EngineConfig> {
    if !path.exists() {
        return Ok(ScannerConfig::default().engine);
    }
    EngineConfig::from_file(path)
}

async fn run_scan(config: ScannerConfig, stake: Option<f64>, json: bool) -> Result<()> {
    config.validate()?;
    metrics::install_exporter(&config.monitoring)?;

    let stake = stake.unwrap_or(config.engine.default_stake);
    let scanner = Scanner::from_config(config, Arc::new(LogNotifier::new()))?;
    let report = scanner.scan_with_stake(stake).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

async fn run_watch(config: ScannerConfig) -> Result<()> {
    config.validate()?;
    metrics::install_exporter(&config.monitoring)?;

    let scanner = Scanner::from_config(config, Arc::new(LogNotifier::new()))?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received, shutting down"),
            Err(e) => error!("Failed to listen for interrupt: {}", e),
        }
        let _ = shutdown_tx.send(true);
    });

    scanner.watch(shutdown_rx).await?;

    let stats = scanner.get_statistics().await;
    info!(
        "Watch finished: {} scans, {} opportunities, {} notifications",
        stats.scans, stats.opportunities, stats.notifications_sent
    );
    Ok(())
}

/// Best prices and evaluation of a manual market; the stake is checked before any price
fn evaluate_market(market: &Market, stake: f64) -> Result<(BestQuotes, Evaluation)> {
    validate_stake(stake)?;

    let engine = ArbitrageEngine::new();
    let best = engine.find_best_quotes(market)?;
    let evaluation = engine.evaluate_quotes(&best, stake)?;
    Ok((best, evaluation))
}

fn run_calc(quotes: &[String], stake: f64, format: OddsFormat, decimal_places: u32) -> Result<()> {
    let market = quotes
        .iter()
        .map(|q| parse_quote(q, format))
        .collect::<Result<Market>>()?;

    let (best, evaluation) = evaluate_market(&market, stake)?;

    println!("Best prices:");
    for quote in best.iter() {
        println!(
            "  {:<24} {:>8.3} ({:>6})  {}",
            quote.outcome_name,
            quote.price,
            format_american(quote.price),
            quote.bookmaker
        );
    }
    println!("Implied margin: {:.4}", best.implied_margin());

    match evaluation {
        Evaluation::Opportunity(opportunity) => {
            println!();
            println!("Arbitrage found, total stake {:.2}", opportunity.total_stake);
            for allocation in &opportunity.allocations {
                println!(
                    "  {:<24} {:>10.4} @ {:.3} on {}",
                    allocation.outcome_name, allocation.stake, allocation.price, allocation.bookmaker
                );
            }
            println!("Guaranteed return: {:.4}", opportunity.guaranteed_return);
            println!("Profit: {:.4} ({:.3}% ROI)", opportunity.profit, opportunity.roi_percent);

            let slip = BetSlip::from_opportunity(&opportunity, decimal_places)?;
            println!();
            println!("Bet slip (rounded):");
            for leg in &slip.legs {
                println!("  {:<24} {:>10} on {}", leg.outcome_name, leg.stake, leg.bookmaker);
            }
            println!(
                "Worst case: return {} profit {}",
                slip.worst_case_return.round_dp(2),
                slip.worst_case_profit.round_dp(2)
            );
        }
        Evaluation::NoArbitrage(no_arb) => {
            println!("No arbitrage: {} (margin {:.4})", no_arb.reason, no_arb.implied_margin);
        }
    }

    Ok(())
}

fn run_hedge(odds1: f64, odds2: f64, stake: f64, stake1: Option<f64>) -> Result<()> {
    let calculator = HedgeCalculator::new(odds1, odds2, stake)?;
    let result = match stake1 {
        Some(stake1) => calculator.with_stake1(stake1)?,
        None => calculator.balanced(),
    };

    println!("Stake 1: {:.2} @ {:.3}", result.stake1, odds1);
    println!("Stake 2: {:.2} @ {:.3}", result.stake2, odds2);
    println!("Profit if outcome 1 wins: {:.2}", result.profit1);
    println!("Profit if outcome 2 wins: {:.2}", result.profit2);
    println!("Risk free: {}", if result.risk_free { "yes" } else { "no" });

    Ok(())
}

fn run_convert(decimal: Option<f64>, american: Option<f64>) -> Result<()> {
    let decimal = match (decimal, american) {
        (Some(decimal), _) => decimal,
        (None, Some(american)) => american_to_decimal(american)?,
        (None, None) => {
            return Err(ArbitrageError::Config("Provide --decimal or --american".to_string()).into())
        }
    };

    let american = decimal_to_american(decimal)?;
    println!("Decimal: {:.3}", decimal);
    println!("American: {}", format_american(decimal));
    println!("Raw American: {:.2}", american);
    println!("Implied probability: {:.2}%", implied_probability(decimal) * 100.0);

    Ok(())
}

fn validate_config(config: ScannerConfig) -> Result<()> {
    info!("Validating configuration...");

    match config.validate() {
        Ok(_) => {
            info!("Configuration is valid");
            println!("Configuration validation passed!");
        }
        Err(e) => {
            error!("Configuration validation failed: {}", e);
            return Err(e);
        }
    }

    Ok(())
}

/// Parse `NAME=PRICE@BOOKMAKER`
fn parse_quote(raw: &str, format: OddsFormat) -> Result<Outcome> {
    let invalid = || ArbitrageError::DataParsing(format!("Invalid quote {:?}, expected NAME=PRICE@BOOKMAKER", raw));

    let (name, rest) = raw.split_once('=').ok_or_else(invalid)?;
    let (price, bookmaker) = rest.split_once('@').ok_or_else(invalid)?;

    let name = name.trim();
    let bookmaker = bookmaker.trim();
    if name.is_empty() || bookmaker.is_empty() {
        return Err(invalid().into());
    }

    let price: f64 = price.trim().parse().map_err(|_| invalid())?;
    let price = format.to_decimal(price)?;

    Ok(Outcome::new(name, price, bookmaker))
}

fn print_report(report: &ScanReport) {
    println!(
        "Scan {}: {} events evaluated, {} opportunities",
        report.scan_id,
        report.events_evaluated,
        report.opportunities.len()
    );

    for status in &report.providers {
        match &status.error {
            None => println!("  {}: {} events", status.provider, status.events),
            Some(e) => println!("  {}: failed after {} attempts: {}", status.provider, status.attempts, e),
        }
    }

    for ranked in &report.opportunities {
        let opportunity = &ranked.opportunity;
        println!();
        println!(
            "[{}] {} ({}) ROI {:.3}%, profit {:.2} on {:.2}",
            ranked.confidence,
            ranked.matchup,
            ranked.sport,
            opportunity.roi_percent,
            opportunity.profit,
            opportunity.total_stake
        );
        for allocation in &opportunity.allocations {
            println!(
                "    {:<24} {:>10.2} @ {:.3} on {}",
                allocation.outcome_name, allocation.stake, allocation.price, allocation.bookmaker
            );
        }
    }
}
