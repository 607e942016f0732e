use masaniello::domain::values::config::PlanConfig;
use masaniello::Masaniello;
use rusqlite::Connection;

pub fn setup() -> Masaniello {
    Masaniello::with_connection(Connection::open_in_memory().unwrap()).unwrap()
}

pub fn config(capital: f64, quota: f64, events: u32, wins: u32) -> PlanConfig {
    PlanConfig::new(capital, quota, events, wins, 50.0, 10.0, 30.0, None, None).unwrap()
}
