use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS plans (
            id TEXT PRIMARY KEY,
            generation INTEGER NOT NULL,
            start_capital REAL NOT NULL,
            current_capital REAL NOT NULL,
            target_capital REAL NOT NULL,
            quota REAL NOT NULL,
            total_events INTEGER NOT NULL,
            expected_wins INTEGER NOT NULL,
            remaining_events INTEGER NOT NULL,
            remaining_wins INTEGER NOT NULL,
            wins INTEGER NOT NULL,
            losses INTEGER NOT NULL,
            consecutive_losses INTEGER NOT NULL,
            max_consecutive_losses INTEGER,
            is_rescued INTEGER NOT NULL DEFAULT 0,
            was_negative INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            triggered_rule TEXT,
            accumulated_amount REAL NOT NULL DEFAULT 0,
            weekly_target REAL NOT NULL,
            milestone_high_water INTEGER NOT NULL DEFAULT 1,
            parent_id TEXT,
            children_ids TEXT NOT NULL DEFAULT '[]',
            config TEXT NOT NULL,
            created_at TEXT NOT NULL,
            closed_at TEXT
        );

        CREATE TABLE IF NOT EXISTS events (
            plan_id TEXT NOT NULL,
            seq INTEGER NOT NULL,
            stake REAL NOT NULL,
            outcome TEXT NOT NULL,
            capital_after REAL NOT NULL,
            events_remaining INTEGER NOT NULL,
            wins_remaining INTEGER NOT NULL,
            odds REAL NOT NULL,
            message TEXT,
            is_system INTEGER NOT NULL DEFAULT 0,
            snapshot TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (plan_id, seq)
        );

        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_plans_created ON plans(created_at);
        CREATE INDEX IF NOT EXISTS idx_plans_status ON plans(status);
        CREATE INDEX IF NOT EXISTS idx_plans_parent ON plans(parent_id);
        "
    ).map_err(|e| format!("Migration failed: {e}"))
}
