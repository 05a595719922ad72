//! Odds scanning, ranking and notification

pub mod notifier;
pub mod ranking;
pub mod service;

pub use notifier::{LogNotifier, Notifier};
pub use ranking::{dedupe_events, rank, Confidence, RankedOpportunity};
pub use service::{ProviderStatus, ScanReport, Scanner, ScannerStatistics};
