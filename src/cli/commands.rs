use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "masaniello", about = "Masaniello progressive-staking bankroll manager")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a new plan lineage
    Init {
        /// JSON with initial_capital, quota, total_events, expected_wins,
        /// accumulation_percent, weekly_target_percent, milestone_bank_percent,
        /// max_consecutive_losses, stop_loss_percent
        json: String,
    },
    /// Show the stake for the next event
    Stake,
    /// Record a full win on the next event
    Won {
        /// Odds actually taken, when different from the plan quota
        #[arg(long)]
        odds: Option<f64>,
    },
    /// Record a full loss on the next event
    Lost {
        #[arg(long)]
        odds: Option<f64>,
    },
    /// Record a partially paid win
    PartialWon {
        /// Share of the full net payout realized (0.0-1.0)
        fraction: f64,
        #[arg(long)]
        odds: Option<f64>,
    },
    /// Record a partial loss (part of the stake returned)
    PartialLost {
        /// Share of the stake lost (0.0-1.0)
        fraction: f64,
        #[arg(long)]
        odds: Option<f64>,
    },
    /// Record a voided bet (stake refunded, no event consumed)
    Void,
    /// Manually adjust the bankroll
    Adjust {
        /// Signed amount to add to the current capital
        amount: f64,
    },
    /// Manually close the active plan and open the next generation
    Close,
    /// Propose a rescue configuration for a struggling plan
    RescueSuggest {
        /// Fresh capital the operator is willing to inject
        #[arg(long, default_value = "0")]
        extra_capital: f64,
    },
    /// Extend the active plan's event/win budget
    RescueApply {
        /// Events to add to the remaining counter
        events: u32,
        /// Wins to add to the remaining counter
        wins: u32,
        #[arg(long, default_value = "0")]
        extra_capital: f64,
        /// Explicit target capital instead of re-projecting
        #[arg(long)]
        target: Option<f64>,
        /// New consecutive-loss cap
        #[arg(long)]
        max_losses: Option<u32>,
    },
    /// Show the active plan and lineage aggregates
    Status,
    /// List plans, newest first
    Plans {
        /// Filter by status (active, completed, failed, closed)
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Dump a plan's event log as JSON
    Events {
        /// Plan id (defaults to the active plan)
        #[arg(long)]
        plan: Option<String>,
    },
    /// Show or change the enabled closure rules
    Rules {
        /// Rule tag to enable (e.g. auto_bank_100)
        #[arg(long)]
        enable: Option<String>,
        /// Rule tag to disable
        #[arg(long)]
        disable: Option<String>,
    },
}
