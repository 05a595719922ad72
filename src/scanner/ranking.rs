//! Opportunity confidence and ranking

use crate::{
    connectors::{Provider, SportingEvent},
    engine::Opportunity,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::HashSet, fmt};
use uuid::Uuid;

/// ROI at or above which an opportunity is rated high confidence
pub const HIGH_CONFIDENCE_ROI: f64 = 5.0;

/// ROI at or above which an opportunity is rated medium confidence
pub const MEDIUM_CONFIDENCE_ROI: f64 = 2.0;

/// Confidence bucket derived from ROI
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// ROI below 2%
    Low,
    /// ROI from 2% up to 5%
    Medium,
    /// ROI of 5% or more
    High,
}

impl Confidence {
    /// Bucket an ROI percentage
    pub fn from_roi(roi_percent: f64) -> Self {
        if roi_percent >= HIGH_CONFIDENCE_ROI {
            Confidence::High
        } else if roi_percent >= MEDIUM_CONFIDENCE_ROI {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Opportunity found for a specific event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOpportunity {
    /// Unique id of this detection
    pub id: Uuid,
    /// Provider-prefixed event id
    pub event_id: String,
    /// "Home vs Away"
    pub matchup: String,
    /// Provider the event came from
    pub source: Provider,
    /// Sport key or title
    pub sport: String,
    /// Scheduled start
    pub commence_time: DateTime<Utc>,
    /// Engine result
    pub opportunity: Opportunity,
    /// Confidence bucket
    pub confidence: Confidence,
    /// Detection time
    pub detected_at: DateTime<Utc>,
}

impl RankedOpportunity {
    /// Wrap an engine opportunity with its event context
    pub fn new(event: &SportingEvent, opportunity: Opportunity) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id: event.id.clone(),
            matchup: event.matchup(),
            source: event.source,
            sport: event.sport.clone(),
            commence_time: event.commence_time,
            confidence: Confidence::from_roi(opportunity.roi_percent),
            opportunity,
            detected_at: Utc::now(),
        }
    }

    /// ROI of the underlying opportunity
    pub fn roi_percent(&self) -> f64 {
        self.opportunity.roi_percent
    }

    /// Key identifying the same opportunity across scans
    pub fn notification_key(&self) -> String {
        format!("{}:{}", self.event_id, self.opportunity.bookmakers().join("|"))
    }
}

/// Sort by confidence, then ROI, both descending. Equal entries keep their order.
pub fn rank(mut opportunities: Vec<RankedOpportunity>) -> Vec<RankedOpportunity> {
    opportunities.sort_by(|a, b| match b.confidence.cmp(&a.confidence) {
        Ordering::Equal => b.roi_percent().total_cmp(&a.roi_percent()),
        other => other,
    });
    opportunities
}

/// Drop events whose id was already seen, keeping the first occurrence
pub fn dedupe_events(events: Vec<SportingEvent>) -> Vec<SportingEvent> {
    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter(|event| seen.insert(event.id.clone()))
        .collect()
}
