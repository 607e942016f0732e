use crate::domain::entities::event::Event;
use crate::domain::entities::plan::Plan;
use crate::domain::error::DomainError;
use crate::domain::ports::plan_repository::{PlanFilter, PlanRepository};
use chrono::DateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

const PLAN_COLUMNS: &str = "SELECT id, generation, start_capital, current_capital, \
    target_capital, quota, total_events, expected_wins, remaining_events, remaining_wins, \
    wins, losses, consecutive_losses, max_consecutive_losses, is_rescued, was_negative, \
    status, triggered_rule, accumulated_amount, weekly_target, milestone_high_water, \
    parent_id, children_ids, config, created_at, closed_at FROM plans";

pub struct SqlitePlanRepo {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePlanRepo {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn row_to_plan(row: &rusqlite::Row) -> Result<Plan, rusqlite::Error> {
        let status_str: String = row.get(16)?;
        let rule_str: Option<String> = row.get(17)?;
        let children_json: String = row.get(22)?;
        let config_json: String = row.get(23)?;
        let created_str: String = row.get(24)?;
        let closed_str: Option<String> = row.get(25)?;

        Ok(Plan {
            id: row.get(0)?,
            generation: row.get(1)?,
            start_capital: row.get(2)?,
            current_capital: row.get(3)?,
            target_capital: row.get(4)?,
            quota: row.get(5)?,
            total_events: row.get(6)?,
            expected_wins: row.get(7)?,
            remaining_events: row.get(8)?,
            remaining_wins: row.get(9)?,
            wins: row.get(10)?,
            losses: row.get(11)?,
            current_consecutive_losses: row.get(12)?,
            max_consecutive_losses: row.get(13)?,
            is_rescued: row.get(14)?,
            was_negative: row.get(15)?,
            status: status_str
                .parse()
                .map_err(|_| rusqlite::Error::InvalidParameterName(status_str.clone()))?,
            triggered_rule: rule_str.and_then(|s| s.parse().ok()),
            events: Vec::new(), // filled in by the caller
            accumulated_amount: row.get(18)?,
            current_weekly_target: row.get(19)?,
            milestone_high_water: row.get(20)?,
            parent_id: row.get(21)?,
            children_ids: serde_json::from_str(&children_json).unwrap_or_default(),
            config: serde_json::from_str(&config_json)
                .map_err(|_| rusqlite::Error::InvalidParameterName("config".into()))?,
            created_at: DateTime::parse_from_rfc3339(&created_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
            closed_at: closed_str.and_then(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .ok()
                    .map(|dt| dt.with_timezone(&chrono::Utc))
            }),
        })
    }

    fn row_to_event(row: &rusqlite::Row) -> Result<Event, rusqlite::Error> {
        let outcome_str: String = row.get(1)?;
        let snapshot_json: String = row.get(8)?;
        let created_str: String = row.get(9)?;

        Ok(Event {
            seq: row.get(0)?,
            outcome: outcome_str
                .parse()
                .map_err(|_| rusqlite::Error::InvalidParameterName(outcome_str.clone()))?,
            stake: row.get(2)?,
            capital_after: row.get(3)?,
            events_remaining_after: row.get(4)?,
            wins_remaining_after: row.get(5)?,
            odds: row.get(6)?,
            message: row.get(7)?,
            is_system: row.get(10)?,
            snapshot: serde_json::from_str(&snapshot_json)
                .map_err(|_| rusqlite::Error::InvalidParameterName("snapshot".into()))?,
            created_at: DateTime::parse_from_rfc3339(&created_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }

    fn load_events(conn: &Connection, plan_id: &str) -> Result<Vec<Event>, DomainError> {
        let mut stmt = conn
            .prepare(
                "SELECT seq, outcome, stake, capital_after, events_remaining, wins_remaining,
                        odds, message, snapshot, created_at, is_system
                 FROM events WHERE plan_id = ?1 ORDER BY seq",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let events = stmt
            .query_map(params![plan_id], Self::row_to_event)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(events)
    }
}

impl PlanRepository for SqlitePlanRepo {
    fn save_plan(&self, plan: &Plan) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let children = serde_json::to_string(&plan.children_ids)
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        let config = serde_json::to_string(&plan.config)
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO plans (
                id, generation, start_capital, current_capital, target_capital, quota,
                total_events, expected_wins, remaining_events, remaining_wins, wins, losses,
                consecutive_losses, max_consecutive_losses, is_rescued, was_negative,
                status, triggered_rule, accumulated_amount, weekly_target,
                milestone_high_water, parent_id, children_ids, config, created_at, closed_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                       ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)",
            params![
                plan.id,
                plan.generation,
                plan.start_capital,
                plan.current_capital,
                plan.target_capital,
                plan.quota,
                plan.total_events,
                plan.expected_wins,
                plan.remaining_events,
                plan.remaining_wins,
                plan.wins,
                plan.losses,
                plan.current_consecutive_losses,
                plan.max_consecutive_losses,
                plan.is_rescued,
                plan.was_negative,
                plan.status.to_string(),
                plan.triggered_rule.map(|r| r.to_string()),
                plan.accumulated_amount,
                plan.current_weekly_target,
                plan.milestone_high_water,
                plan.parent_id,
                children,
                config,
                plan.created_at.to_rfc3339(),
                plan.closed_at.map(|dt| dt.to_rfc3339()),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to save plan: {e}")))?;

        for event in &plan.events {
            let snapshot = serde_json::to_string(&event.snapshot)
                .map_err(|e| DomainError::Parse(e.to_string()))?;
            conn.execute(
                "INSERT OR REPLACE INTO events (
                    plan_id, seq, stake, outcome, capital_after, events_remaining,
                    wins_remaining, odds, message, is_system, snapshot, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    plan.id,
                    event.seq,
                    event.stake,
                    event.outcome.to_string(),
                    event.capital_after,
                    event.events_remaining_after,
                    event.wins_remaining_after,
                    event.odds,
                    event.message,
                    event.is_system,
                    snapshot,
                    event.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to save event: {e}")))?;
        }
        Ok(())
    }

    fn get_plan(&self, id: &str) -> Result<Option<Plan>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare(&format!("{PLAN_COLUMNS} WHERE id = ?1"))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], Self::row_to_plan)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        match rows.next() {
            Some(Ok(mut plan)) => {
                plan.events = Self::load_events(&conn, &plan.id)?;
                Ok(Some(plan))
            }
            Some(Err(e)) => Err(DomainError::Database(e.to_string())),
            None => Ok(None),
        }
    }

    fn list_plans(&self, filter: &PlanFilter) -> Result<Vec<Plan>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut sql = format!("{PLAN_COLUMNS} WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            sql.push_str(&format!(" AND status = ?{}", param_values.len() + 1));
            param_values.push(Box::new(status.to_string()));
        }
        sql.push_str(" ORDER BY created_at DESC, generation DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT ?{}", param_values.len() + 1));
            param_values.push(Box::new(limit as i64));
        }

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut plans: Vec<Plan> = stmt
            .query_map(params_refs.as_slice(), Self::row_to_plan)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        for plan in &mut plans {
            plan.events = Self::load_events(&conn, &plan.id)?;
        }
        Ok(plans)
    }

    fn active_plan_id(&self) -> Result<Option<String>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT value FROM settings WHERE key = 'active_plan_id'")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(rows.next().and_then(|r| r.ok()))
    }

    fn set_active_plan_id(&self, id: Option<&str>) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        match id {
            Some(id) => {
                conn.execute(
                    "INSERT OR REPLACE INTO settings (key, value) VALUES ('active_plan_id', ?1)",
                    params![id],
                )
                .map_err(|e| DomainError::Database(e.to_string()))?;
            }
            None => {
                conn.execute("DELETE FROM settings WHERE key = 'active_plan_id'", [])
                    .map_err(|e| DomainError::Database(e.to_string()))?;
            }
        }
        Ok(())
    }
}
