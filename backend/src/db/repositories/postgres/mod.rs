//! Postgres repository implementation using Diesel.
//!
//! Teachers live in a single `teachers` table (see the embedded migrations).
//! Uniqueness of `employee_id` and `email` is enforced by named constraints,
//! and violations come back as [`RepositoryError::Conflict`].
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry with exponential backoff for transient failures
//! - Automatic migration execution on construction
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
use diesel::dsl::count;
use diesel::expression_methods::AggregateExpressionMethods;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    ErrorContext, RepositoryError, RepositoryResult, StatsRepository, TeacherRepository,
};
use crate::models::{
    NewTeacher, Teacher, TeacherId, TeacherPatch, TeacherQuery, TeacherStats, TeacherStatus,
};

mod models;
mod schema;

use models::{NewTeacherRow, TeacherChangeset, TeacherRow};
use schema::teachers;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of idle connections kept in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
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

/// Parse an optional numeric environment variable, falling back on absence or
/// garbage.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// Only the connection URL is required; see the module docs for the
    /// optional tuning variables and their defaults.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total operations executed
    pub total_queries: u64,
    /// Total failed operations
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

#[derive(Debug, Default)]
struct QueryCounters {
    total: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
}

/// Diesel-backed teacher repository.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    counters: Arc<QueryCounters>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if connection or migration fails
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
            conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
                RepositoryError::internal_with_context(
                    format!("Migration failed: {}", e),
                    ErrorContext::new("run_migrations"),
                )
            })?;
        }

        log::info!(
            "Postgres repository ready (pool max={}, min={})",
            config.max_pool_size,
            config.min_pool_size
        );

        Ok(Self {
            pool,
            config,
            counters: Arc::new(QueryCounters::default()),
        })
    }

    /// Run a blocking Diesel operation on the blocking thread pool.
    ///
    /// Retryable failures (pool checkout, serialization failures) are retried
    /// up to `max_retries` times with exponential backoff.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let mut retry_delay = Duration::from_millis(self.config.retry_delay_ms);
        let counters = self.counters.clone();

        task::spawn_blocking(move || {
            let mut attempt = 0;
            loop {
                let result = match pool.get() {
                    Ok(mut conn) => {
                        counters.total.fetch_add(1, Ordering::Relaxed);
                        f.clone()(&mut conn)
                    }
                    Err(e) => Err(RepositoryError::connection_with_context(
                        e.to_string(),
                        ErrorContext::new("get_connection")
                            .with_details(format!("attempt={}", attempt + 1)),
                    )),
                };

                match result {
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::warn!(
                            "{} failed (attempt {}), retrying in {:?}: {}",
                            operation,
                            attempt + 1,
                            retry_delay,
                            e
                        );
                        counters.retried.fetch_add(1, Ordering::Relaxed);
                        std::thread::sleep(retry_delay);
                        retry_delay *= 2;
                        attempt += 1;
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        return Err(e.with_operation(operation));
                    }
                    Ok(value) => return Ok(value),
                }
            }
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new(operation).with_details("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.counters.total.load(Ordering::Relaxed),
            failed_queries: self.counters.failed.load(Ordering::Relaxed),
            retried_operations: self.counters.retried.load(Ordering::Relaxed),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

fn rows_to_teachers(rows: Vec<TeacherRow>) -> RepositoryResult<Vec<Teacher>> {
    rows.into_iter().map(Teacher::try_from).collect()
}

fn load_teacher(conn: &mut PgConnection, id: i64) -> RepositoryResult<Option<Teacher>> {
    teachers::table
        .find(id)
        .select(TeacherRow::as_select())
        .first::<TeacherRow>(conn)
        .optional()
        .map_err(map_diesel_error)?
        .map(Teacher::try_from)
        .transpose()
}

fn count_as_usize(n: i64) -> usize {
    usize::try_from(n).unwrap_or_default()
}

#[async_trait]
impl TeacherRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create(&self, teacher: NewTeacher) -> RepositoryResult<Teacher> {
        let row = NewTeacherRow::from(teacher);
        self.with_conn("create", move |conn| {
            let inserted: TeacherRow = diesel::insert_into(teachers::table)
                .values(&row)
                .returning(TeacherRow::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?;
            Teacher::try_from(inserted)
        })
        .await
    }

    async fn get(&self, id: TeacherId) -> RepositoryResult<Option<Teacher>> {
        self.with_conn("get", move |conn| load_teacher(conn, id.value()))
            .await
    }

    async fn get_by_employee_id(&self, employee_id: &str) -> RepositoryResult<Option<Teacher>> {
        let employee_id = employee_id.to_string();
        self.with_conn("get_by_employee_id", move |conn| {
            teachers::table
                .filter(teachers::employee_id.eq(&employee_id))
                .select(TeacherRow::as_select())
                .first::<TeacherRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Teacher::try_from)
                .transpose()
        })
        .await
    }

    async fn list(&self) -> RepositoryResult<Vec<Teacher>> {
        self.with_conn("list", |conn| {
            let rows = teachers::table
                .order(teachers::id.asc())
                .select(TeacherRow::as_select())
                .load::<TeacherRow>(conn)
                .map_err(map_diesel_error)?;
            rows_to_teachers(rows)
        })
        .await
    }

    async fn update(
        &self,
        id: TeacherId,
        patch: TeacherPatch,
    ) -> RepositoryResult<Option<Teacher>> {
        if patch.is_empty() {
            // Diesel rejects an UPDATE with an empty SET clause
            return self.get(id).await;
        }

        let changeset = TeacherChangeset::from(patch);
        self.with_conn("update", move |conn| {
            diesel::update(teachers::table.find(id.value()))
                .set(&changeset)
                .returning(TeacherRow::as_returning())
                .get_result::<TeacherRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Teacher::try_from)
                .transpose()
        })
        .await
    }

    async fn delete(&self, id: TeacherId) -> RepositoryResult<bool> {
        self.with_conn("delete", move |conn| {
            diesel::delete(teachers::table.find(id.value()))
                .execute(conn)
                .map(|affected| affected > 0)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn search(&self, query: &TeacherQuery) -> RepositoryResult<Vec<Teacher>> {
        let query = query.clone();
        self.with_conn("search", move |conn| {
            let mut sql = teachers::table
                .order(teachers::id.asc())
                .select(TeacherRow::as_select())
                .into_boxed();

            if let Some(department) = query.department_filter() {
                sql = sql.filter(teachers::department.eq(department.to_string()));
            }
            if let Some(status) = query.status_filter() {
                sql = sql.filter(teachers::status.eq(status.to_string()));
            }

            let rows = sql.load::<TeacherRow>(conn).map_err(map_diesel_error)?;
            let teachers = rows_to_teachers(rows)?;
            Ok(teachers
                .into_iter()
                .filter(|t| query.matches_text(t))
                .collect())
        })
        .await
    }
}

#[async_trait]
impl StatsRepository for PostgresRepository {
    async fn stats(&self) -> RepositoryResult<TeacherStats> {
        self.with_conn("stats", |conn| {
            let total: i64 = teachers::table
                .count()
                .get_result(conn)
                .map_err(map_diesel_error)?;
            let active: i64 = teachers::table
                .filter(teachers::status.eq(TeacherStatus::Active.as_str()))
                .count()
                .get_result(conn)
                .map_err(map_diesel_error)?;
            let on_leave: i64 = teachers::table
                .filter(teachers::status.eq(TeacherStatus::OnLeave.as_str()))
                .count()
                .get_result(conn)
                .map_err(map_diesel_error)?;
            let departments: i64 = teachers::table
                .select(count(teachers::department).aggregate_distinct())
                .get_result(conn)
                .map_err(map_diesel_error)?;

            Ok(TeacherStats {
                total_teachers: count_as_usize(total),
                active_teachers: count_as_usize(active),
                on_leave: count_as_usize(on_leave),
                departments: count_as_usize(departments),
            })
        })
        .await
    }

    async fn departments(&self) -> RepositoryResult<Vec<String>> {
        self.with_conn("departments", |conn| {
            teachers::table
                .select(teachers::department)
                .distinct()
                .order(teachers::department.asc())
                .load::<String>(conn)
                .map_err(map_diesel_error)
        })
        .await
    }
}
