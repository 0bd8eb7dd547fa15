//! Environment configuration.

use anyhow::Context;

pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountConfig {
    pub port: u16,
    /// Postgres when set, in-memory collaborators otherwise.
    pub database_url: Option<String>,
    pub nats_url: Option<String>,
    pub db_max_connections: u32,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT, database_url: None, nats_url: None, db_max_connections: DEFAULT_DB_MAX_CONNECTIONS }
    }
}

impl AccountConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(v) => v.parse().with_context(|| format!("PORT must be a port number, got {v:?}"))?,
            None => DEFAULT_PORT,
        };
        let db_max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse().with_context(|| format!("DB_MAX_CONNECTIONS must be a positive integer, got {v:?}"))?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };
        anyhow::ensure!(db_max_connections > 0, "DB_MAX_CONNECTIONS must be greater than zero");

        Ok(Self { port, database_url: var("DATABASE_URL"), nats_url: var("NATS_URL"), db_max_connections })
    }

    pub fn bind_address(&self) -> String { format!("0.0.0.0:{}", self.port) }
}
