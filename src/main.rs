use clap::Parser;
use masaniello::cli::commands::{Cli, Commands};
use masaniello::domain::rules::RuleKind;
use masaniello::domain::values::config::PlanConfig;
use masaniello::domain::values::outcome::BetOutcome;
use masaniello::domain::values::status::PlanStatus;
use masaniello::Masaniello;

fn main() {
    let cli = Cli::parse();
    let db_path = std::env::var("MASANIELLO_DB").unwrap_or_else(|_| "./masaniello.db".into());

    let app = match Masaniello::new(&db_path) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error initializing masaniello: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(app, cli.command) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_command(app: Masaniello, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Init { json } => {
            let data: serde_json::Value = serde_json::from_str(&json)?;
            let config = PlanConfig::new(
                require_f64(&data, "initial_capital")?,
                require_f64(&data, "quota")?,
                require_u32(&data, "total_events")?,
                require_u32(&data, "expected_wins")?,
                data["accumulation_percent"].as_f64().unwrap_or(50.0),
                data["weekly_target_percent"].as_f64().unwrap_or(10.0),
                data["milestone_bank_percent"].as_f64().unwrap_or(30.0),
                data["max_consecutive_losses"].as_u64().map(|v| v as u32),
                data["stop_loss_percent"].as_f64(),
            )?;
            let plan = app.create_plan(config)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Commands::Stake => {
            let preview = app.next_stake()?;
            println!("{}", serde_json::to_string_pretty(&preview)?);
        }
        Commands::Won { odds } => {
            let report = app.apply_outcome(BetOutcome::FullWin, odds)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Lost { odds } => {
            let report = app.apply_outcome(BetOutcome::FullLoss, odds)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::PartialWon { fraction, odds } => {
            let report = app.apply_outcome(BetOutcome::PartialWin { fraction }, odds)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::PartialLost { fraction, odds } => {
            let report = app.apply_outcome(BetOutcome::PartialLoss { fraction }, odds)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Void => {
            let report = app.apply_outcome(BetOutcome::Void, None)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Adjust { amount } => {
            let report = app.apply_outcome(BetOutcome::Adjustment { amount }, None)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Close => {
            let report = app.close_active_plan()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::RescueSuggest { extra_capital } => {
            match app.suggest_rescue(extra_capital)? {
                Some(suggestion) => println!("{}", serde_json::to_string_pretty(&suggestion)?),
                None => println!("null"),
            }
        }
        Commands::RescueApply {
            events,
            wins,
            extra_capital,
            target,
            max_losses,
        } => {
            let plan = app.activate_rescue(events, wins, extra_capital, target, max_losses)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Commands::Status => {
            let report = app.status()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Plans { status, limit } => {
            let status = status
                .map(|s| s.parse::<PlanStatus>())
                .transpose()
                .map_err(|e: String| e)?;
            let plans = app.list_plans(status, Some(limit))?;
            println!("{}", serde_json::to_string_pretty(&plans)?);
        }
        Commands::Events { plan } => {
            let events = app.plan_events(plan.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        Commands::Rules { enable, disable } => {
            let mut rules = app.rules()?;
            if let Some(tag) = enable {
                let kind: RuleKind = tag.parse().map_err(|e: String| e)?;
                rules = app.set_rule(kind, true)?;
            }
            if let Some(tag) = disable {
                let kind: RuleKind = tag.parse().map_err(|e: String| e)?;
                rules = app.set_rule(kind, false)?;
            }
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
    }
    Ok(())
}

fn require_f64(data: &serde_json::Value, field: &str) -> Result<f64, String> {
    // Operator input arrives as JSON; numbers typed as strings are
    // accepted and coerced.
    match &data[field] {
        serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| bad_field(field)),
        serde_json::Value::String(s) => s.parse().map_err(|_| bad_field(field)),
        _ => Err(format!("Missing required field: {field}")),
    }
}

fn require_u32(data: &serde_json::Value, field: &str) -> Result<u32, String> {
    match &data[field] {
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(|v| v as u32)
            .ok_or_else(|| bad_field(field)),
        serde_json::Value::String(s) => s.parse().map_err(|_| bad_field(field)),
        _ => Err(format!("Missing required field: {field}")),
    }
}

fn bad_field(field: &str) -> String {
    format!("Field {field} is not a valid number")
}
