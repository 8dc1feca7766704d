//! Database sink (TimescaleDB / Postgres)
//!
//! Every project gets its own table, created lazily on first write with
//! `CREATE TABLE IF NOT EXISTS`. Table names can't be bound as query
//! parameters, so this sink builds its SQL dynamically rather than through
//! `sqlx::query!`'s compile-time macros. A background task drains an
//! unbounded channel so a slow or down database never blocks ingestion, and
//! a periodic health check mirrors the original client's reconnect timer
//! (default every 30 minutes, configurable) — on failure it rebuilds the
//! pool rather than just logging.

use crate::config::TimescaleDbConfig;
use crate::error::{IngestError, Result, SinkError};
use crate::record::LogRecord;
use parking_lot::RwLock;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Converts a validated project name into a safe Postgres identifier:
/// lowercased, non `[a-z0-9_]` bytes replaced with `_`, and prefixed so a
/// project name that starts with a digit still yields a legal identifier.
pub fn table_name(project: &str) -> String {
    let mut name = String::with_capacity(project.len() + 4);
    name.push_str("log_");
    for ch in project.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            name.push(ch);
        } else {
            name.push('_');
        }
    }
    name
}

fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS \"{table}\" (\
            id BIGSERIAL PRIMARY KEY, \
            level VARCHAR(7) NOT NULL, \
            timestamp TIMESTAMPTZ NOT NULL, \
            module VARCHAR(100), \
            function VARCHAR(100), \
            message TEXT NOT NULL, \
            code INTEGER NOT NULL DEFAULT 0\
        ); \
        CREATE INDEX IF NOT EXISTS \"{table}_level_timestamp_idx\" ON \"{table}\" (level, timestamp); \
        CREATE INDEX IF NOT EXISTS \"{table}_module_function_idx\" ON \"{table}\" (module, function);"
    )
}

fn insert_sql(table: &str) -> String {
    format!(
        "INSERT INTO \"{table}\" (level, timestamp, module, function, message, code) \
         VALUES ($1, $2, $3, $4, $5, $6)"
    )
}

async fn connect(config: &TimescaleDbConfig) -> sqlx::Result<PgPool> {
    let url = format!(
        "postgres://{}:{}@{}:{}/{}",
        config.username, config.password, config.host, config.port, config.database
    );
    PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
}

async fn ensure_table(pool: &PgPool, known: &RwLock<HashSet<String>>, table: &str) -> Result<()> {
    if known.read().contains(table) {
        return Ok(());
    }
    sqlx::query(&create_table_sql(table))
        .execute(pool)
        .await
        .map_err(|e| IngestError::from(SinkError::Database(e.to_string())))?;
    known.write().insert(table.to_string());
    Ok(())
}

async fn insert_record(pool: &PgPool, record: &LogRecord) -> Result<()> {
    let table = table_name(&record.project);
    sqlx::query(&insert_sql(&table))
        .bind(record.level.as_str())
        .bind(record.timestamp)
        .bind(&record.module)
        .bind(&record.function)
        .bind(&record.message)
        .bind(record.code as i32)
        .execute(pool)
        .await
        .map_err(|e| IngestError::from(SinkError::Database(e.to_string())))?;
    Ok(())
}

/// Background-tasked writer for the database sink. `write` enqueues and
/// returns immediately; the draining task owns the pool, the per-project
/// table cache, and a periodic connectivity check.
pub struct DatabaseSink {
    sender: mpsc::UnboundedSender<LogRecord>,
}

impl DatabaseSink {
    pub async fn connect_and_spawn(config: TimescaleDbConfig) -> Result<Self> {
        let mut pool = connect(&config)
            .await
            .map_err(|e| IngestError::from(SinkError::Database(e.to_string())))?;
        let known_tables = Arc::new(RwLock::new(HashSet::new()));
        let (sender, mut receiver) = mpsc::unbounded_channel::<LogRecord>();
        let check_interval = Duration::from_secs(config.reconnect_check_interval_secs);

        tokio::spawn(async move {
            let mut health_check = tokio::time::interval(check_interval);
            health_check.tick().await;

            loop {
                tokio::select! {
                    record = receiver.recv() => {
                        let Some(record) = record else { break };
                        let table = table_name(&record.project);
                        if let Err(err) = ensure_table(&pool, &known_tables, &table).await {
                            tracing::warn!(error = %err, project = %record.project, "failed to ensure log table exists");
                            continue;
                        }
                        if let Err(err) = insert_record(&pool, &record).await {
                            tracing::warn!(error = %err, project = %record.project, "failed to insert log record");
                        }
                    }
                    _ = health_check.tick() => {
                        if let Err(err) = sqlx::query("SELECT 1").fetch_one(&pool).await {
                            tracing::warn!(error = %err, "database health check failed, reconnecting");
                            match connect(&config).await {
                                Ok(new_pool) => {
                                    pool = new_pool;
                                    tracing::info!("database reconnected");
                                }
                                Err(err) => {
                                    tracing::warn!(error = %err, "database reconnect attempt failed, will retry at next check");
                                }
                            }
                        }
                    }
                }
            }
        });

        Ok(Self { sender })
    }

    /// Enqueues `record` for insertion. Never blocks the caller.
    pub fn write(&self, record: LogRecord) {
        let _ = self.sender.send(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_sanitizes_spaces_and_hyphens() {
        assert_eq!(table_name("home logger-two"), "log_home_logger_two");
    }

    #[test]
    fn table_name_lowercases() {
        assert_eq!(table_name("HomeLogger"), "log_homelogger");
    }

    #[test]
    fn create_table_sql_quotes_identifier() {
        let sql = create_table_sql("log_home");
        assert!(sql.contains("\"log_home\""));
        assert!(sql.contains("IF NOT EXISTS"));
    }

    #[test]
    fn insert_sql_has_six_placeholders() {
        let sql = insert_sql("log_home");
        for i in 1..=6 {
            assert!(sql.contains(&format!("${i}")));
        }
    }
}
