use crate::domain::error::DomainError;
use crate::domain::ports::settings_repository::SettingsRepository;
use crate::domain::rules::RuleSet;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct SqliteSettingsRepo {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSettingsRepo {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

impl SettingsRepository for SqliteSettingsRepo {
    fn get_rule_set(&self) -> Result<Option<RuleSet>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT value FROM settings WHERE key = 'rule_set'")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        match rows.next() {
            Some(Ok(json)) => {
                let rules = serde_json::from_str(&json)
                    .map_err(|e| DomainError::Parse(format!("Bad rule set: {e}")))?;
                Ok(Some(rules))
            }
            Some(Err(e)) => Err(DomainError::Database(e.to_string())),
            None => Ok(None),
        }
    }

    fn save_rule_set(&self, rules: &RuleSet) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let json = serde_json::to_string(rules).map_err(|e| DomainError::Parse(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES ('rule_set', ?1)",
            params![json],
        )
        .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(())
    }
}
