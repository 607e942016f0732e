use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a plan generation.
///
/// `Active` is the only non-terminal state. `Closed` plans have spawned a
/// successor generation; `Completed` is the all-wins close; `Failed` plans
/// terminate their lineage with no successor. The rule that ended the plan
/// is recorded separately in `triggered_rule`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Active,
    Completed,
    Failed,
    Closed,
}

impl PlanStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PlanStatus::Active)
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStatus::Active => write!(f, "active"),
            PlanStatus::Completed => write!(f, "completed"),
            PlanStatus::Failed => write!(f, "failed"),
            PlanStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for PlanStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(PlanStatus::Active),
            "completed" => Ok(PlanStatus::Completed),
            "failed" => Ok(PlanStatus::Failed),
            "closed" => Ok(PlanStatus::Closed),
            _ => Err(format!("Unknown plan status: {s}")),
        }
    }
}
