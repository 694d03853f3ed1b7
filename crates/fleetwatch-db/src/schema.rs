//! Database schema for Fleetwatch

/// SQLite schema initialization
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    api_key TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS trucks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    vehicle_id INTEGER NOT NULL,
    company_id INTEGER NOT NULL,
    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE,
    UNIQUE (company_id, vehicle_id)
);

CREATE INDEX IF NOT EXISTS idx_trucks_vehicle_id ON trucks(vehicle_id);
CREATE INDEX IF NOT EXISTS idx_trucks_company_id ON trucks(company_id);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_id INTEGER NOT NULL UNIQUE,
    full_name TEXT NOT NULL,
    company_ids TEXT NOT NULL DEFAULT '[]',
    balance INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS subscriptions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_id INTEGER NOT NULL,
    truck_id INTEGER NOT NULL,
    category INTEGER NOT NULL,
    every_minutes INTEGER,
    last_sent_at TEXT,
    warning_type TEXT,
    engine_status TEXT
);

CREATE INDEX IF NOT EXISTS idx_subscriptions_truck ON subscriptions(truck_id, category);
CREATE INDEX IF NOT EXISTS idx_subscriptions_chat ON subscriptions(chat_id);
"#;
