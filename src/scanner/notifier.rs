//! Opportunity notification sinks

use super::RankedOpportunity;
use crate::Result;
use async_trait::async_trait;
use tracing::info;

/// Receives opportunities detected in watch mode
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one opportunity
    async fn notify(&self, opportunity: &RankedOpportunity) -> Result<()>;

    /// Flush and release resources when the watch loop stops
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

/// Notifier that writes opportunities to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl LogNotifier {
    /// Create a new log notifier
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, opportunity: &RankedOpportunity) -> Result<()> {
        crate::log_opportunity!(
            info,
            opportunity.event_id,
            opportunity.matchup,
            format!("{:.2}", opportunity.roi_percent()),
            format!("{:.4}", opportunity.opportunity.implied_margin),
            confidence = %opportunity.confidence,
            source = %opportunity.source,
            "Arbitrage opportunity"
        );

        for allocation in &opportunity.opportunity.allocations {
            crate::log_quote!(
                info,
                allocation.outcome_name,
                allocation.bookmaker,
                allocation.price,
                stake = allocation.stake,
                "Place stake"
            );
        }

        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Log notifier stopped");
        Ok(())
    }
}
