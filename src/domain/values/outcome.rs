use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operator-reported result of the bet that was riding on the current event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BetOutcome {
    FullWin,
    FullLoss,
    /// A win settled below full payout (e.g. cash-out, half-win markets).
    /// `fraction` is the share of the full net profit actually realized.
    PartialWin { fraction: f64 },
    /// A loss that returned part of the stake. `fraction` is the share
    /// of the stake actually lost.
    PartialLoss { fraction: f64 },
    /// Bet voided, stake refunded.
    Void,
    /// Manual capital correction outside any bet.
    Adjustment { amount: f64 },
}

/// How an event is classified in the log. Adjustments and system
/// annotations are recorded as `Void` with the system flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    Win,
    Loss,
    Void,
}

impl fmt::Display for EventOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventOutcome::Win => write!(f, "win"),
            EventOutcome::Loss => write!(f, "loss"),
            EventOutcome::Void => write!(f, "void"),
        }
    }
}

impl FromStr for EventOutcome {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "win" => Ok(EventOutcome::Win),
            "loss" => Ok(EventOutcome::Loss),
            "void" => Ok(EventOutcome::Void),
            _ => Err(format!("Unknown event outcome: {s}")),
        }
    }
}
