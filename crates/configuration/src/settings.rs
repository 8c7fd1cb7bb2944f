use serde::Deserialize;
use std::fmt;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(alias = "postgres")]
    pub database: DatabaseSettings,
}

/// Where the HTTP server listens and how much it accepts per request.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Upper bound for JSON bodies and multipart uploads, in bytes.
    pub max_upload_bytes: usize,
}

/// Connection parameters for the PostgreSQL database holding the contacts table.
#[derive(Clone, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// The database name.
    pub name: String,
    /// The table holding the contacts. Substituted into SQL text once at startup.
    #[serde(default = "default_table", alias = "db")]
    pub table: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_db_port() -> u16 { 5432 }
fn default_table() -> String { "entries".to_string() }
fn default_max_connections() -> u32 { 10 }
fn default_acquire_timeout_secs() -> u64 { 5 }

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_bytes: 1024 * 1024 * 50,
        }
    }
}

// The password never reaches the logs.
impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

impl Settings {
    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        let db = &self.database;
        if db.host.trim().is_empty() {
            return Err("database.host must not be empty".to_string());
        }
        if db.user.trim().is_empty() {
            return Err("database.user must not be empty".to_string());
        }
        if db.name.trim().is_empty() {
            return Err("database.name must not be empty".to_string());
        }
        if !is_sql_identifier(&db.table) {
            return Err(format!(
                "database.table {:?} is not a plain SQL identifier",
                db.table
            ));
        }
        if db.max_connections == 0 {
            return Err("database.max_connections must be at least 1".to_string());
        }
        if self.server.max_upload_bytes == 0 {
            return Err("server.max_upload_bytes must be at least 1".to_string());
        }
        Ok(())
    }
}

/// True for `[A-Za-z_][A-Za-z0-9_]*` no longer than PostgreSQL's 63-byte limit.
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
