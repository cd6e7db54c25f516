//! MySQL-backed request store.

use crate::config::{is_sql_identifier, DatabaseConfig};
use crate::error::BuildError;
use crate::store::RequestStore;
use crate::types::{BuildRequest, RequestStatus};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use std::time::Duration;
use tracing::{debug, info};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct MySqlRequestStore {
    pool: MySqlPool,
    table: String,
}

impl MySqlRequestStore {
    /// Open a connection pool for the configured database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, BuildError> {
        if !is_sql_identifier(&config.table) {
            return Err(BuildError::Config(format!(
                "Invalid table name: {}",
                config.table
            )));
        }

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.name);

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| {
                BuildError::Connectivity(format!(
                    "Cannot connect to database {}@{}:{}: {}",
                    config.name, config.host, config.port, e
                ))
            })?;

        info!(host = %config.host, database = %config.name, table = %config.table, "Database pool ready");
        Ok(Self::from_pool(pool, config.table.clone()))
    }

    pub fn from_pool(pool: MySqlPool, table: String) -> Self {
        Self { pool, table }
    }

    async fn set_status(
        &self,
        id: i64,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<bool, BuildError> {
        let result = sqlx::query(&update_status_sql(&self.table))
            .bind(to.as_str())
            .bind(id)
            .bind(from.as_str())
            .execute(&self.pool)
            .await?;

        debug!(id, from = %from, to = %to, rows = result.rows_affected(), "Status update");
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RequestStore for MySqlRequestStore {
    async fn fetch_pending(&self) -> Result<Option<BuildRequest>, BuildError> {
        let row = sqlx::query(&select_pending_sql(&self.table))
            .bind(RequestStatus::Pending.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| request_from_row(&row)).transpose()
    }

    async fn claim(&self, id: i64) -> Result<bool, BuildError> {
        self.set_status(id, RequestStatus::Pending, RequestStatus::Building)
            .await
    }

    async fn release(&self, id: i64) -> Result<(), BuildError> {
        self.set_status(id, RequestStatus::Building, RequestStatus::Pending)
            .await
            .map(|_| ())
    }

    async fn mark_completed(&self, id: i64) -> Result<(), BuildError> {
        let updated = self
            .set_status(id, RequestStatus::Building, RequestStatus::Completed)
            .await?;
        if !updated {
            return Err(BuildError::AlreadyClaimed(id));
        }
        Ok(())
    }
}

fn select_pending_sql(table: &str) -> String {
    format!(
        "SELECT CAST(id AS SIGNED) AS id, description, theme, user_type, status FROM {} \
         WHERE status = ? ORDER BY {}.id DESC LIMIT 1",
        table, table
    )
}

fn update_status_sql(table: &str) -> String {
    format!("UPDATE {} SET status = ? WHERE id = ? AND status = ?", table)
}

fn request_from_row(row: &MySqlRow) -> Result<BuildRequest, BuildError> {
    let status: String = row.try_get("status")?;
    let user_type: String = row.try_get("user_type")?;
    let theme: Option<String> = row.try_get("theme")?;
    let description: Option<String> = row.try_get("description")?;

    Ok(BuildRequest {
        id: row.try_get("id")?,
        description: description.unwrap_or_default(),
        theme: theme.unwrap_or_default(),
        status: status.parse()?,
        user_type: user_type.parse()?,
    })
}
