use crate::domain::rules::RuleKind;
use crate::domain::values::outcome::EventOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit context frozen at the moment an event is applied, so exports and
/// later inspection see the rules and parameters that were actually in
/// force, not whatever the config says today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSnapshot {
    /// Schema version of this snapshot.
    pub version: u32,
    pub quota: f64,
    pub target_capital: f64,
    pub remaining_events: u32,
    pub remaining_wins: u32,
    pub accumulation_percent: f64,
    pub active_rules: Vec<RuleKind>,
}

impl EventSnapshot {
    pub const CURRENT_VERSION: u32 = 1;
}

/// One entry in a plan's immutable bet log.
///
/// System entries (banking, rescue annotations, manual adjustments) carry
/// `is_system = true` and never count toward win/loss tallies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub seq: u32,
    pub stake: f64,
    pub outcome: EventOutcome,
    pub capital_after: f64,
    pub events_remaining_after: u32,
    pub wins_remaining_after: u32,
    pub odds: f64,
    pub message: Option<String>,
    pub is_system: bool,
    pub snapshot: EventSnapshot,
    pub created_at: DateTime<Utc>,
}
