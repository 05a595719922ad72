//! Scan loop: fetch, evaluate, rank and notify

use super::{dedupe_events, rank, Notifier, RankedOpportunity};
use crate::{
    config::ScannerConfig,
    connectors::{OddsProvider, Provider, ProviderFactory, SportingEvent},
    engine::{ArbitrageEngine, EngineError, Evaluation},
    utils::metrics::{
        BEST_ROI_PERCENT, EVENTS_EVALUATED_TOTAL, OPPORTUNITIES_TOTAL, PROVIDER_ERRORS_TOTAL,
        SCANS_TOTAL,
    },
    ArbitrageError, Result,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures_util::future::join_all;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, sync::Arc, time::Duration};
use tokio::{
    sync::{watch, RwLock},
    time::MissedTickBehavior,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Upper bound of the random delay added to each retry
const RETRY_JITTER_MS: u64 = 250;

/// Outcome of one provider fetch within a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStatus {
    /// Provider polled
    pub provider: Provider,
    /// Events returned
    pub events: usize,
    /// Attempts made, including the first
    pub attempts: u32,
    /// Last error if every attempt failed
    pub error: Option<String>,
}

impl ProviderStatus {
    /// Whether the fetch succeeded
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a single scan pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Unique scan id
    pub scan_id: Uuid,
    /// When the scan started
    pub started_at: DateTime<Utc>,
    /// When the scan finished
    pub finished_at: DateTime<Utc>,
    /// Stake each event was evaluated at
    pub stake: f64,
    /// Per-provider fetch results
    pub providers: Vec<ProviderStatus>,
    /// Events fetched across providers, before de-duplication
    pub events_fetched: usize,
    /// Events run through the engine
    pub events_evaluated: usize,
    /// Events whose best prices leave no edge
    pub no_arbitrage: usize,
    /// Events with fewer than two usable outcomes
    pub insufficient: usize,
    /// Opportunities dropped by the ROI filter
    pub below_min_roi: usize,
    /// Opportunities, best first
    pub opportunities: Vec<RankedOpportunity>,
}

impl ScanReport {
    /// Highest ROI in the report
    pub fn best_roi(&self) -> Option<f64> {
        self.opportunities
            .iter()
            .map(|o| o.roi_percent())
            .max_by(|a, b| a.total_cmp(b))
    }
}

/// Cumulative scanner statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerStatistics {
    /// Completed scans
    pub scans: u64,
    /// Events evaluated across all scans
    pub events_evaluated: u64,
    /// Opportunities found across all scans
    pub opportunities: u64,
    /// Provider fetches that failed after retries
    pub provider_errors: u64,
    /// Notifications delivered
    pub notifications_sent: u64,
    /// Best ROI ever seen
    pub best_roi_percent: Option<f64>,
    /// When the last scan finished
    pub last_scan: Option<DateTime<Utc>>,
    /// Seconds since the scanner was created
    pub uptime_seconds: u64,
}

/// Polls odds providers and evaluates every event with the arbitrage engine
pub struct Scanner {
    /// Configuration
    config: ScannerConfig,
    /// Engine
    engine: ArbitrageEngine,
    /// Odds providers, in priority order for de-duplication
    providers: Vec<Arc<dyn OddsProvider>>,
    /// Notification sink
    notifier: Arc<dyn Notifier>,
    /// Scanner statistics
    statistics: Arc<RwLock<ScannerStatistics>>,
    /// Delivered notification keys still present in the latest report
    notified: DashMap<String, DateTime<Utc>>,
    /// Start time
    start_time: std::time::Instant,
}

impl Scanner {
    /// Create a scanner over the given providers
    pub fn new(
        config: ScannerConfig,
        providers: Vec<Arc<dyn OddsProvider>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            engine: ArbitrageEngine::new(),
            providers,
            notifier,
            statistics: Arc::new(RwLock::new(ScannerStatistics::default())),
            notified: DashMap::new(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Create a scanner over every enabled provider in the configuration
    pub fn from_config(config: ScannerConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let providers = ProviderFactory::create_enabled(&config)?;
        Ok(Self::new(config, providers, notifier))
    }

    /// Configuration in use
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Run one scan at the configured default stake
    pub async fn scan_once(&self) -> Result<ScanReport> {
        self.scan_with_stake(self.config.engine.default_stake).await
    }

    /// Run one scan, evaluating every event at `stake`
    pub async fn scan_with_stake(&self, stake: f64) -> Result<ScanReport> {
        if !stake.is_finite() || stake <= 0.0 {
            return Err(ArbitrageError::Engine(EngineError::InvalidStake { stake }).into());
        }

        let scan_id = Uuid::new_v4();
        let started_at = Utc::now();
        debug!("Starting scan {} across {} providers", scan_id, self.providers.len());

        let fetches = join_all(self.providers.iter().map(|p| self.fetch_with_retry(p.as_ref()))).await;

        let mut providers = Vec::with_capacity(fetches.len());
        let mut events = Vec::new();
        for (status, mut fetched) in fetches {
            if !status.is_ok() {
                metrics::counter!(PROVIDER_ERRORS_TOTAL, 1, "provider" => status.provider.to_string());
            }
            providers.push(status);
            events.append(&mut fetched);
        }

        let events_fetched = events.len();
        let events = dedupe_events(events);

        let mut report = ScanReport {
            scan_id,
            started_at,
            finished_at: started_at,
            stake,
            providers,
            events_fetched,
            events_evaluated: 0,
            no_arbitrage: 0,
            insufficient: 0,
            below_min_roi: 0,
            opportunities: Vec::new(),
        };

        for event in &events {
            self.evaluate_event(event, stake, &mut report);
        }

        report.opportunities = rank(std::mem::take(&mut report.opportunities));
        report.finished_at = Utc::now();

        self.record_scan(&report).await;

        info!(
            "Scan {} evaluated {} events: {} opportunities, {} without edge, {} insufficient",
            scan_id,
            report.events_evaluated,
            report.opportunities.len(),
            report.no_arbitrage,
            report.insufficient
        );

        Ok(report)
    }

    /// Poll every `poll_interval_secs` until `shutdown` flips to true
    pub async fn watch(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let poll_interval = Duration::from_secs(self.config.scan.poll_interval_secs.max(1));
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Watching for opportunities every {:?}", poll_interval);

        while !*shutdown.borrow() {
            tokio::select! {
                _ = interval.tick() => {
                    match self.scan_once().await {
                        Ok(report) => {
                            self.notify_new(&report).await;
                        }
                        Err(e) => error!("Scan failed: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Watch loop stopping");
        self.notifier.shutdown().await
    }

    /// Notify opportunities not delivered before. Returns how many were sent.
    ///
    /// Keys whose opportunity is absent from `report` are forgotten afterwards,
    /// so an opportunity that closes and later reopens is notified again.
    pub async fn notify_new(&self, report: &ScanReport) -> usize {
        let settings = &self.config.notifications;
        if !settings.enabled {
            return 0;
        }

        let mut sent = 0;
        for opportunity in &report.opportunities {
            if opportunity.confidence < settings.min_confidence {
                continue;
            }

            let key = opportunity.notification_key();
            if self.notified.contains_key(&key) {
                debug!("Already notified {}", key);
                continue;
            }

            match self.notifier.notify(opportunity).await {
                Ok(()) => {
                    self.notified.insert(key, Utc::now());
                    sent += 1;
                }
                Err(e) => error!("Failed to notify opportunity {}: {}", key, e),
            }
        }

        let live: HashSet<String> = report
            .opportunities
            .iter()
            .map(RankedOpportunity::notification_key)
            .collect();
        let tracked = self.notified.len();
        self.notified.retain(|key, _| live.contains(key));
        if self.notified.len() < tracked {
            debug!("Forgot {} closed opportunities", tracked - self.notified.len());
        }

        if sent > 0 {
            let mut stats = self.statistics.write().await;
            stats.notifications_sent += sent as u64;
        }

        sent
    }

    /// Get scanner statistics
    pub async fn get_statistics(&self) -> ScannerStatistics {
        let mut stats = self.statistics.read().await.clone();
        stats.uptime_seconds = self.start_time.elapsed().as_secs();
        stats
    }

    /// Fetch one provider, retrying failures
    async fn fetch_with_retry(&self, provider: &dyn OddsProvider) -> (ProviderStatus, Vec<SportingEvent>) {
        let max_attempts = self.config.scan.max_retry_attempts.saturating_add(1);
        let retry_delay = Duration::from_secs(self.config.scan.retry_delay_secs);
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < max_attempts {
            attempts += 1;
            match provider.fetch_events().await {
                Ok(events) => {
                    debug!("{} returned {} events", provider.provider(), events.len());
                    let status = ProviderStatus {
                        provider: provider.provider(),
                        events: events.len(),
                        attempts,
                        error: None,
                    };
                    return (status, events);
                }
                Err(e) => {
                    warn!(
                        "{} fetch attempt {}/{} failed: {}",
                        provider.provider(),
                        attempts,
                        max_attempts,
                        e
                    );
                    last_error = Some(e.to_string());

                    if attempts < max_attempts {
                        let jitter = rand::thread_rng().gen_range(0..=RETRY_JITTER_MS);
                        tokio::time::sleep(retry_delay + Duration::from_millis(jitter)).await;
                    }
                }
            }
        }

        error!("{} failed after {} attempts", provider.provider(), attempts);
        let status = ProviderStatus {
            provider: provider.provider(),
            events: 0,
            attempts,
            error: last_error,
        };
        (status, Vec::new())
    }

    /// Evaluate one event and fold the result into the report
    fn evaluate_event(&self, event: &SportingEvent, stake: f64, report: &mut ScanReport) {
        report.events_evaluated += 1;

        match self.engine.evaluate(&event.to_market(), stake) {
            Ok(Evaluation::Opportunity(opportunity)) => {
                if opportunity.roi_percent < self.config.engine.min_roi_percent {
                    debug!(
                        "Dropping {} at {:.3}% ROI, below minimum",
                        event.id, opportunity.roi_percent
                    );
                    report.below_min_roi += 1;
                    return;
                }

                crate::log_opportunity!(
                    info,
                    event.id,
                    event.matchup(),
                    format!("{:.3}", opportunity.roi_percent),
                    format!("{:.4}", opportunity.implied_margin),
                    "Opportunity detected"
                );
                report
                    .opportunities
                    .push(RankedOpportunity::new(event, opportunity));
            }
            Ok(Evaluation::NoArbitrage(no_arb)) => {
                debug!("{}: {} (margin {:.4})", event.id, no_arb.reason, no_arb.implied_margin);
                report.no_arbitrage += 1;
            }
            Err(EngineError::InsufficientMarket { valid_outcomes }) => {
                debug!("{}: only {} usable outcomes", event.id, valid_outcomes);
                report.insufficient += 1;
            }
            Err(e) => {
                warn!("{}: evaluation failed: {}", event.id, e);
            }
        }
    }

    /// Fold a finished scan into statistics and metrics
    async fn record_scan(&self, report: &ScanReport) {
        let provider_errors = report.providers.iter().filter(|p| !p.is_ok()).count() as u64;
        let best_roi = report.best_roi();

        metrics::increment_counter!(SCANS_TOTAL);
        metrics::counter!(EVENTS_EVALUATED_TOTAL, report.events_evaluated as u64);
        metrics::counter!(OPPORTUNITIES_TOTAL, report.opportunities.len() as u64);
        metrics::gauge!(BEST_ROI_PERCENT, best_roi.unwrap_or(0.0));

        let mut stats = self.statistics.write().await;
        stats.scans += 1;
        stats.events_evaluated += report.events_evaluated as u64;
        stats.opportunities += report.opportunities.len() as u64;
        stats.provider_errors += provider_errors;
        stats.last_scan = Some(report.finished_at);
        if let Some(roi) = best_roi {
            stats.best_roi_percent = Some(stats.best_roi_percent.map_or(roi, |best| best.max(roi)));
        }
    }
}
