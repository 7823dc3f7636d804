//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::upsert::excluded;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    AlertRepository, ErrorContext, PoolStats, RepositoryError, RepositoryResult,
    SampleRepository,
};
use crate::models::{
    AlertConfig, AlertDispatch, NewBatch, SampleId, SampleRecord, ScoredSample, UploadBatch,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connection_timeout_sec: u64,
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables (see module docs).
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let mut config = Self::with_url(database_url);
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }

    /// Override pool and retry settings from `PG_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        fn env_num<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok().and_then(|v| v.parse().ok())
        }

        if let Some(v) = env_num("PG_POOL_MAX") {
            self.max_pool_size = v;
        }
        if let Some(v) = env_num("PG_POOL_MIN") {
            self.min_pool_size = v;
        }
        if let Some(v) = env_num("PG_CONN_TIMEOUT_SEC") {
            self.connection_timeout_sec = v;
        }
        if let Some(v) = env_num("PG_IDLE_TIMEOUT_SEC") {
            self.idle_timeout_sec = v;
        }
        if let Some(v) = env_num("PG_MAX_RETRIES") {
            self.max_retries = v;
        }
        if let Some(v) = env_num("PG_RETRY_DELAY_MS") {
            self.retry_delay_ms = v;
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        log::info!(
            "Postgres repository ready (pool max={}, min={})",
            config.max_pool_size,
            config.min_pool_size
        );

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Run a database operation on a pooled connection, retrying transient
    /// failures with exponential backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::warn!("Retrying after transient database error: {}", e);
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await?
    }

    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }
}

fn load_samples(
    conn: &mut PgConnection,
    sample_id: Option<i64>,
) -> RepositoryResult<Vec<SampleRecord>> {
    let mut query = water_samples::table
        .inner_join(pollution_results::table)
        .select((WaterSampleRow::as_select(), PollutionResultRow::as_select()))
        .order(water_samples::sample_id.asc())
        .into_boxed();

    if let Some(id) = sample_id {
        query = query.filter(water_samples::sample_id.eq(id));
    }

    query
        .load::<(WaterSampleRow, PollutionResultRow)>(conn)?
        .into_iter()
        .map(|(sample, result)| sample_record(sample, result))
        .collect()
}

#[async_trait]
impl SampleRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| sql_query("SELECT 1").execute(conn).map(|_| true).map_err(Into::into))
            .await
    }

    fn pool_stats(&self) -> Option<PoolStats> {
        Some(self.get_pool_stats())
    }

    async fn store_batch(
        &self,
        batch: &NewBatch,
        samples: &[ScoredSample],
    ) -> RepositoryResult<(UploadBatch, Vec<SampleRecord>)> {
        let new_batch = NewUploadBatchRow {
            file_name: batch.file_name.clone(),
            format: batch.format.as_str().to_string(),
            checksum: batch.checksum.clone(),
            sample_count: i32::try_from(samples.len()).map_err(|_| {
                RepositoryError::validation_with_context(
                    format!("Too many samples in one upload: {}", samples.len()),
                    ErrorContext::new("store_batch").with_entity("batch"),
                )
            })?,
        };
        let samples = samples.to_vec();

        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let inserted: UploadBatchRow = diesel::insert_into(upload_batches::table)
                    .values(&new_batch)
                    .returning(UploadBatchRow::as_returning())
                    .get_result(tx)?;

                // Each result is keyed by the sample_id its own insert returned.
                let mut records = Vec::with_capacity(samples.len());
                for scored in &samples {
                    let stored: WaterSampleRow = diesel::insert_into(water_samples::table)
                        .values(NewWaterSampleRow::from_scored(inserted.batch_id, scored))
                        .returning(WaterSampleRow::as_returning())
                        .get_result(tx)?;

                    let result = PollutionResultRow::new(stored.sample_id, &scored.result);
                    diesel::insert_into(pollution_results::table)
                        .values(&result)
                        .execute(tx)?;

                    records.push(sample_record(stored, result)?);
                }

                Ok((UploadBatch::try_from(inserted)?, records))
            })
            .map_err(|e| e.with_operation("store_batch"))
        })
        .await
    }

    async fn list_samples(&self) -> RepositoryResult<Vec<SampleRecord>> {
        self.with_conn(|conn| load_samples(conn, None)).await
    }

    async fn get_sample(&self, sample_id: SampleId) -> RepositoryResult<SampleRecord> {
        let id = sample_id.value();
        self.with_conn(move |conn| {
            load_samples(conn, Some(id))?.pop().ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Sample {} not found", id),
                    ErrorContext::new("get_sample")
                        .with_entity("sample")
                        .with_entity_id(id),
                )
            })
        })
        .await
    }

    async fn list_batches(&self) -> RepositoryResult<Vec<UploadBatch>> {
        self.with_conn(|conn| {
            upload_batches::table
                .select(UploadBatchRow::as_select())
                .order(upload_batches::batch_id.asc())
                .load::<UploadBatchRow>(conn)?
                .into_iter()
                .map(UploadBatch::try_from)
                .collect()
        })
        .await
    }
}

#[async_trait]
impl AlertRepository for PostgresRepository {
    async fn get_alert_config(&self) -> RepositoryResult<AlertConfig> {
        self.with_conn(|conn| {
            let row = alert_configs::table
                .filter(alert_configs::config_id.eq(ALERT_CONFIG_ID))
                .select(AlertConfigRow::as_select())
                .first::<AlertConfigRow>(conn)
                .optional()?;
            Ok(row.map(AlertConfig::from).unwrap_or_default())
        })
        .await
    }

    async fn save_alert_config(&self, config: &AlertConfig) -> RepositoryResult<AlertConfig> {
        let upsert = AlertConfigUpsert::from(config);
        self.with_conn(move |conn| {
            let row = diesel::insert_into(alert_configs::table)
                .values(&upsert)
                .on_conflict(alert_configs::config_id)
                .do_update()
                .set((
                    alert_configs::hpi_threshold.eq(excluded(alert_configs::hpi_threshold)),
                    alert_configs::cd_threshold.eq(excluded(alert_configs::cd_threshold)),
                    alert_configs::email_recipients.eq(excluded(alert_configs::email_recipients)),
                    alert_configs::sms_recipients.eq(excluded(alert_configs::sms_recipients)),
                    alert_configs::policy.eq(excluded(alert_configs::policy)),
                    alert_configs::updated_at.eq(excluded(alert_configs::updated_at)),
                ))
                .returning(AlertConfigRow::as_returning())
                .get_result::<AlertConfigRow>(conn)?;
            Ok(AlertConfig::from(row))
        })
        .await
    }

    async fn record_dispatch(&self, dispatch: &AlertDispatch) -> RepositoryResult<()> {
        let row = AlertDispatchRow::from(dispatch);
        self.with_conn(move |conn| {
            diesel::insert_into(alert_dispatches::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn list_dispatches(&self) -> RepositoryResult<Vec<AlertDispatch>> {
        self.with_conn(|conn| {
            alert_dispatches::table
                .select(AlertDispatchRow::as_select())
                .order(alert_dispatches::created_at.desc())
                .load::<AlertDispatchRow>(conn)?
                .into_iter()
                .map(AlertDispatch::try_from)
                .collect()
        })
        .await
    }
}
