//! Scanner tests over mocked providers

use crate::TestUtils;
use async_trait::async_trait;
use mockall::mock;
use sports_arbitrage::{
    connectors::{OddsProvider, Provider, SportingEvent},
    scanner::{Confidence, Notifier, RankedOpportunity, Scanner},
    ArbitrageError, Result,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

mock! {
    pub Feed {}

    #[async_trait]
    impl OddsProvider for Feed {
        fn provider(&self) -> Provider;
        async fn fetch_events(&self) -> Result<Vec<SportingEvent>>;
    }
}

/// Notifier that records what it was given
#[derive(Default)]
struct RecordingNotifier {
    delivered: Mutex<Vec<RankedOpportunity>>,
    shutdowns: Mutex<u32>,
}

impl RecordingNotifier {
    fn delivered(&self) -> Vec<RankedOpportunity> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, opportunity: &RankedOpportunity) -> Result<()> {
        self.delivered.lock().unwrap().push(opportunity.clone());
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        *self.shutdowns.lock().unwrap() += 1;
        Ok(())
    }
}

fn feed(provider: Provider, events: Vec<SportingEvent>) -> MockFeed {
    let mut mock = MockFeed::new();
    mock.expect_provider().return_const(provider);
    mock.expect_fetch_events()
        .returning(move || Ok(events.clone()));
    mock
}

#[tokio::test]
async fn test_scan_merges_providers_and_dedupes() {
    let odds = feed(
        Provider::TheOddsApi,
        vec![
            TestUtils::create_arbitrage_event("shared", Provider::TheOddsApi),
            TestUtils::create_flat_event("odds_only", Provider::TheOddsApi),
        ],
    );
    let rapid = feed(
        Provider::RapidApi,
        vec![
            TestUtils::create_arbitrage_event("shared", Provider::RapidApi),
            TestUtils::create_arbitrage_event("rapid_only", Provider::RapidApi),
        ],
    );

    let scanner = Scanner::new(
        TestUtils::create_test_config(),
        vec![Arc::new(odds), Arc::new(rapid)],
        Arc::new(RecordingNotifier::default()),
    );

    let report = scanner.scan_once().await.unwrap();
    assert_eq!(report.events_fetched, 4);
    assert_eq!(report.events_evaluated, 3);
    assert_eq!(report.no_arbitrage, 1);
    assert_eq!(report.opportunities.len(), 2);

    // First provider wins the duplicate
    let shared = report
        .opportunities
        .iter()
        .find(|o| o.event_id == "shared")
        .unwrap();
    assert_eq!(shared.source, Provider::TheOddsApi);
    assert_eq!(shared.confidence, Confidence::Medium);
    assert_eq!(shared.matchup, "Los Angeles Lakers vs Boston Celtics");
}

#[tokio::test]
async fn test_scan_retries_then_reports_failure() {
    let mut broken = MockFeed::new();
    broken.expect_provider().return_const(Provider::RapidApi);
    broken
        .expect_fetch_events()
        .times(2)
        .returning(|| Err(ArbitrageError::Connection("connection refused".to_string()).into()));

    let healthy = feed(
        Provider::TheOddsApi,
        vec![TestUtils::create_arbitrage_event("evt", Provider::TheOddsApi)],
    );

    let scanner = Scanner::new(
        TestUtils::create_test_config(),
        vec![Arc::new(healthy), Arc::new(broken)],
        Arc::new(RecordingNotifier::default()),
    );

    let report = scanner.scan_once().await.unwrap();
    assert_eq!(report.opportunities.len(), 1);

    let failed = &report.providers[1];
    assert_eq!(failed.provider, Provider::RapidApi);
    assert_eq!(failed.attempts, 2);
    assert!(failed.error.as_deref().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_ranking_puts_best_first() {
    let events = vec![
        TestUtils::create_event(
            "small",
            Provider::TheOddsApi,
            &[("A", "Home", 2.02), ("B", "Away", 2.00)],
        ),
        TestUtils::create_event(
            "large",
            Provider::TheOddsApi,
            &[("A", "Home", 2.30), ("B", "Away", 2.20)],
        ),
        TestUtils::create_event(
            "medium",
            Provider::TheOddsApi,
            &[("A", "Home", 2.15), ("B", "Away", 2.00)],
        ),
    ];

    let scanner = Scanner::new(
        TestUtils::create_test_config(),
        vec![Arc::new(feed(Provider::TheOddsApi, events))],
        Arc::new(RecordingNotifier::default()),
    );

    let report = scanner.scan_once().await.unwrap();
    let order: Vec<(&str, Confidence)> = report
        .opportunities
        .iter()
        .map(|o| (o.event_id.as_str(), o.confidence))
        .collect();
    assert_eq!(
        order,
        vec![
            ("large", Confidence::High),
            ("medium", Confidence::Medium),
            ("small", Confidence::Low),
        ]
    );
    assert!((report.best_roi().unwrap() - report.opportunities[0].roi_percent()).abs() < 1e-12);
}

#[tokio::test]
async fn test_notifications_respect_min_confidence() {
    let events = vec![
        TestUtils::create_event(
            "low",
            Provider::TheOddsApi,
            &[("A", "Home", 2.02), ("B", "Away", 2.00)],
        ),
        TestUtils::create_arbitrage_event("medium", Provider::TheOddsApi),
    ];

    let mut config = TestUtils::create_test_config();
    config.notifications.min_confidence = Confidence::Medium;

    let notifier = Arc::new(RecordingNotifier::default());
    let scanner = Scanner::new(
        config,
        vec![Arc::new(feed(Provider::TheOddsApi, events))],
        notifier.clone(),
    );

    let report = scanner.scan_once().await.unwrap();
    assert_eq!(report.opportunities.len(), 2);
    assert_eq!(scanner.notify_new(&report).await, 1);
    assert_eq!(notifier.delivered()[0].event_id, "medium");
}

#[tokio::test]
async fn test_notifications_disabled() {
    let mut config = TestUtils::create_test_config();
    config.notifications.enabled = false;

    let notifier = Arc::new(RecordingNotifier::default());
    let scanner = Scanner::new(
        config,
        vec![Arc::new(feed(
            Provider::TheOddsApi,
            vec![TestUtils::create_arbitrage_event("evt", Provider::TheOddsApi)],
        ))],
        notifier.clone(),
    );

    let report = scanner.scan_once().await.unwrap();
    assert_eq!(scanner.notify_new(&report).await, 0);
    assert!(notifier.delivered().is_empty());
}

#[tokio::test]
async fn test_watch_notifies_once_and_shuts_down() {
    let mut config = TestUtils::create_test_config();
    config.scan.poll_interval_secs = 1;

    let notifier = Arc::new(RecordingNotifier::default());
    let scanner = Arc::new(Scanner::new(
        config,
        vec![Arc::new(feed(
            Provider::TheOddsApi,
            vec![TestUtils::create_arbitrage_event("evt", Provider::TheOddsApi)],
        ))],
        notifier.clone(),
    ));

    let (tx, rx) = watch::channel(false);
    let handle = {
        let scanner = scanner.clone();
        tokio::spawn(async move { scanner.watch(rx).await })
    };

    // Long enough for at least two polls
    tokio::time::sleep(Duration::from_millis(1500)).await;
    tx.send(true).unwrap();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    let stats = scanner.get_statistics().await;
    assert!(stats.scans >= 2);
    assert_eq!(stats.notifications_sent, 1);
    assert_eq!(notifier.delivered().len(), 1);
    assert_eq!(*notifier.shutdowns.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_watch_exits_when_already_shut_down() {
    let mut never_called = MockFeed::new();
    never_called.expect_provider().return_const(Provider::TheOddsApi);
    never_called.expect_fetch_events().never();

    let notifier = Arc::new(RecordingNotifier::default());
    let scanner = Scanner::new(
        TestUtils::create_test_config(),
        vec![Arc::new(never_called)],
        notifier.clone(),
    );

    let (_tx, rx) = watch::channel(true);
    scanner.watch(rx).await.unwrap();
    assert_eq!(*notifier.shutdowns.lock().unwrap(), 1);
}
