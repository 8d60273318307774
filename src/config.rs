//! Canonical environment configuration (spec §6): the env var subset the
//! core consumes directly. Loading from files or CLI flags stays out of
//! scope — this is the typed view over `std::env` a caller wires into
//! `Atlas`.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub sslmode: String,
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
    pub conn_max_lifetime: Duration,
    pub conn_max_idle_time: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("DB_HOST", "localhost"),
            port: env_parse("DB_PORT", 5432),
            user: env_or("DB_USER", "postgres"),
            password: env_or("DB_PASSWORD", ""),
            name: env_or("DB_NAME", "codeatlas"),
            sslmode: env_or("DB_SSLMODE", "disable"),
            max_open_conns: env_parse("DB_MAX_OPEN_CONNS", 10),
            max_idle_conns: env_parse("DB_MAX_IDLE_CONNS", 5),
            conn_max_lifetime: Duration::from_secs(env_parse("DB_CONN_MAX_LIFETIME", 1800)),
            conn_max_idle_time: Duration::from_secs(env_parse("DB_CONN_MAX_IDLE_TIME", 300)),
        }
    }

    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.user, self.password, self.host, self.port, self.name, self.sslmode
        )
    }
}

/// `INDEXER_*` knobs from spec §6, converted directly into `IndexOptions`.
#[derive(Debug, Clone)]
pub struct IndexerEnvConfig {
    pub batch_size: usize,
    pub worker_count: usize,
    pub skip_vectors: bool,
    pub incremental: bool,
    pub use_transactions: bool,
    pub graph_name: String,
}

impl IndexerEnvConfig {
    pub fn from_env() -> Self {
        Self {
            batch_size: env_parse("INDEXER_BATCH_SIZE", 50),
            worker_count: env_parse("INDEXER_WORKER_COUNT", num_cpus()),
            skip_vectors: env_bool("INDEXER_SKIP_VECTORS", false),
            incremental: env_bool("INDEXER_INCREMENTAL", false),
            use_transactions: env_bool("INDEXER_USE_TRANSACTIONS", true),
            graph_name: env_or("INDEXER_GRAPH_NAME", "code_graph"),
        }
    }

    pub fn to_options(&self) -> codeatlas_types::IndexOptions {
        codeatlas_types::IndexOptions {
            incremental: self.incremental,
            skip_vectors: self.skip_vectors,
            batch_size: self.batch_size,
            worker_count: self.worker_count,
            embedding_model: None,
            use_transactions: self.use_transactions,
            ..codeatlas_types::IndexOptions::default()
        }
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_config_builds_a_connection_string() {
        let c = DatabaseConfig {
            host: "h".into(),
            port: 5432,
            user: "u".into(),
            password: "p".into(),
            name: "n".into(),
            sslmode: "disable".into(),
            max_open_conns: 1,
            max_idle_conns: 1,
            conn_max_lifetime: Duration::from_secs(1),
            conn_max_idle_time: Duration::from_secs(1),
        };
        assert_eq!(c.connection_string(), "postgres://u:p@h:5432/n?sslmode=disable");
    }

    #[test]
    fn indexer_env_config_defaults_are_usable() {
        let c = IndexerEnvConfig {
            batch_size: 50,
            worker_count: 4,
            skip_vectors: false,
            incremental: true,
            use_transactions: true,
            graph_name: "code_graph".into(),
        };
        let opts = c.to_options();
        assert_eq!(opts.batch_size, 50);
        assert!(opts.incremental);
    }
}
