//! SQLite link repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, FromRow, SqlitePool};

use crate::domain::link::{
    DayOfWeek, Link, LinkStats, LinkStatus, Reservation, TimeSlot, UsageRecord,
};
use crate::error::{Error, Result};
use crate::infra::store::LinkStore;

/// Database row for a link
#[derive(Debug, FromRow)]
struct LinkRow {
    id: String,
    name: String,
    platform: String,
    url: String,
    credentials: Option<String>,
    status: String,
    is_deleted: bool,
    duration_limit: i64,
    allowed_days: String,
    allowed_time_slots: String,
    reservation: Option<String>,
    total_uses: i64,
    total_hours: f64,
    average_usage_minutes: f64,
    last_used: Option<String>,
    version: i64,
    created_at: String,
    updated_at: String,
}

const LINK_COLUMNS: &str = "id, name, platform, url, credentials, status, is_deleted, \
     duration_limit, allowed_days, allowed_time_slots, reservation, \
     total_uses, total_hours, average_usage_minutes, last_used, \
     version, created_at, updated_at";

fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", field, e)))
}

impl TryFrom<LinkRow> for Link {
    type Error = Error;

    fn try_from(row: LinkRow) -> Result<Self> {
        let status = LinkStatus::from_str(&row.status)
            .ok_or_else(|| Error::Internal(format!("Invalid link status: {}", row.status)))?;

        let allowed_days: Vec<DayOfWeek> = serde_json::from_str(&row.allowed_days)
            .map_err(|e| Error::Internal(format!("Failed to parse allowed_days: {}", e)))?;

        let allowed_time_slots: Vec<TimeSlot> = serde_json::from_str(&row.allowed_time_slots)
            .map_err(|e| Error::Internal(format!("Failed to parse allowed_time_slots: {}", e)))?;

        let current_reservation: Option<Reservation> = row
            .reservation
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| Error::Internal(format!("Failed to parse reservation: {}", e)))?;

        let last_used = row
            .last_used
            .as_deref()
            .map(|s| parse_timestamp(s, "last_used"))
            .transpose()?;

        Ok(Link {
            id: row.id,
            name: row.name,
            platform: row.platform,
            url: row.url,
            credentials: row.credentials,
            status,
            is_deleted: row.is_deleted,
            duration_limit: row.duration_limit,
            allowed_days,
            allowed_time_slots,
            current_reservation,
            stats: LinkStats {
                total_uses: row.total_uses,
                total_hours: row.total_hours,
                average_usage_minutes: row.average_usage_minutes,
                last_used,
            },
            version: row.version,
            created_at: parse_timestamp(&row.created_at, "created_at")?,
            updated_at: parse_timestamp(&row.updated_at, "updated_at")?,
        })
    }
}

/// Database row for a usage record
#[derive(Debug, FromRow)]
struct UsageRow {
    session_id: String,
    group_id: String,
    start_time: String,
    end_time: String,
    duration_minutes: i64,
    used_at: String,
}

impl TryFrom<UsageRow> for UsageRecord {
    type Error = Error;

    fn try_from(row: UsageRow) -> Result<Self> {
        Ok(UsageRecord {
            session_id: row.session_id,
            group_id: row.group_id,
            start_time: parse_timestamp(&row.start_time, "start_time")?,
            end_time: parse_timestamp(&row.end_time, "end_time")?,
            duration_minutes: row.duration_minutes,
            used_at: parse_timestamp(&row.used_at, "used_at")?,
        })
    }
}

/// Link repository backed by SQLite
pub struct SqliteLinkRepository {
    pool: SqlitePool,
}

impl SqliteLinkRepository {
    /// Create a new repository with the given pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database connection pool
    pub async fn init(database_url: &str) -> anyhow::Result<SqlitePool> {
        // Ensure parent directory exists
        if let Some(path) = database_url.strip_prefix("sqlite:") {
            if let Some(path) = path.split('?').next() {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        // Enable WAL mode for better concurrent performance
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl LinkStore for SqliteLinkRepository {
    async fn insert(&self, link: &Link) -> Result<()> {
        let allowed_days = serde_json::to_string(&link.allowed_days)
            .map_err(|e| Error::Internal(e.to_string()))?;
        let allowed_time_slots = serde_json::to_string(&link.allowed_time_slots)
            .map_err(|e| Error::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO links (
                id, name, platform, url, credentials, status, is_deleted,
                duration_limit, allowed_days, allowed_time_slots,
                version, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&link.id)
        .bind(&link.name)
        .bind(&link.platform)
        .bind(&link.url)
        .bind(&link.credentials)
        .bind(link.status.as_str())
        .bind(link.is_deleted)
        .bind(link.duration_limit)
        .bind(&allowed_days)
        .bind(&allowed_time_slots)
        .bind(link.version)
        .bind(link.created_at.to_rfc3339())
        .bind(link.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Link> {
        let row: LinkRow = sqlx::query_as(&format!(
            "SELECT {} FROM links WHERE id = ?",
            LINK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::LinkNotFound(id.to_string()))?;

        row.try_into()
    }

    async fn list_active(&self) -> Result<Vec<Link>> {
        let rows: Vec<LinkRow> = sqlx::query_as(&format!(
            "SELECT {} FROM links \
             WHERE is_deleted = FALSE AND status IN ('available', 'reserved') \
             ORDER BY created_at ASC",
            LINK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn set_status(
        &self,
        id: &str,
        status: LinkStatus,
        clear_reservation: bool,
        expected_version: i64,
    ) -> Result<bool> {
        let now = Utc::now();

        let result = if clear_reservation {
            sqlx::query(
                r#"
                UPDATE links
                SET status = ?, reservation = NULL, version = version + 1, updated_at = ?
                WHERE id = ? AND version = ?
                "#,
            )
            .bind(status.as_str())
            .bind(now.to_rfc3339())
            .bind(id)
            .bind(expected_version)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                UPDATE links
                SET status = ?, version = version + 1, updated_at = ?
                WHERE id = ? AND version = ?
                "#,
            )
            .bind(status.as_str())
            .bind(now.to_rfc3339())
            .bind(id)
            .bind(expected_version)
            .execute(&self.pool)
            .await?
        };

        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: &str) -> Result<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE links
            SET is_deleted = TRUE, version = version + 1, updated_at = ?
            WHERE id = ? AND is_deleted = FALSE
            "#,
        )
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::LinkNotFound(id.to_string()));
        }

        Ok(())
    }

    async fn try_reserve(
        &self,
        id: &str,
        expected_version: i64,
        reservation: &Reservation,
    ) -> Result<bool> {
        let blob =
            serde_json::to_string(reservation).map_err(|e| Error::Internal(e.to_string()))?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE links
            SET reservation = ?, status = 'reserved', version = version + 1, updated_at = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(&blob)
        .bind(now.to_rfc3339())
        .bind(id)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn try_release(
        &self,
        id: &str,
        expected_version: i64,
        record: &UsageRecord,
        stats: &LinkStats,
    ) -> Result<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE links
            SET reservation = NULL, status = 'available',
                total_uses = ?, total_hours = ?, average_usage_minutes = ?, last_used = ?,
                version = version + 1, updated_at = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(stats.total_uses)
        .bind(stats.total_hours)
        .bind(stats.average_usage_minutes)
        .bind(stats.last_used.map(|t| t.to_rfc3339()))
        .bind(now.to_rfc3339())
        .bind(id)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO usage_records (
                link_id, session_id, group_id, start_time, end_time,
                duration_minutes, used_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(&record.session_id)
        .bind(&record.group_id)
        .bind(record.start_time.to_rfc3339())
        .bind(record.end_time.to_rfc3339())
        .bind(record.duration_minutes)
        .bind(record.used_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn usage_history(&self, link_id: &str) -> Result<Vec<UsageRecord>> {
        let rows: Vec<UsageRow> = sqlx::query_as(
            r#"
            SELECT session_id, group_id, start_time, end_time, duration_minutes, used_at
            FROM usage_records
            WHERE link_id = ?
            ORDER BY used_at ASC, id ASC
            "#,
        )
        .bind(link_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    async fn usage_since(&self, link_id: &str, cutoff: DateTime<Utc>) -> Result<Vec<UsageRecord>> {
        let rows: Vec<UsageRow> = sqlx::query_as(
            r#"
            SELECT session_id, group_id, start_time, end_time, duration_minutes, used_at
            FROM usage_records
            WHERE link_id = ? AND used_at >= ?
            ORDER BY used_at ASC, id ASC
            "#,
        )
        .bind(link_id)
        .bind(cutoff.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}
