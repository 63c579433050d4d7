//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresCatStore`, a [`CatStore`] backed by `cats` and
//! `applications` tables via `sqlx::PgPool`. Search predicates are compiled
//! with `sqlx::QueryBuilder` and pages are located by row comparison against
//! the cursor row.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! pawprint = { version = "0.1", features = ["postgres"] }
//! ```

use crate::core::application::{ApplicationRecord, ApplicationStatus};
use crate::core::cat::{CatRecord, CatStatus, CatSummary};
use crate::core::error::StoreError;
use crate::core::query::{CatFilter, SortBy, SortDir, SortOrder};
use crate::core::store::CatStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const BACKEND: &str = "PostgreSQL";

const COLUMNS: &str = "id, name, sex, age_months, breed, vaccinated, desexed, microchipped, \
     status, description, primary_image_url, owner_id, created_at";

const APPLICATION_COLUMNS: &str = "id, cat_id, user_id, status, created_at, updated_at";

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required table and indexes (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS cats (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            sex TEXT NOT NULL,
            age_months BIGINT NOT NULL CHECK (age_months >= 0),
            breed TEXT NOT NULL,
            vaccinated BOOLEAN NOT NULL DEFAULT FALSE,
            desexed BOOLEAN NOT NULL DEFAULT FALSE,
            microchipped BOOLEAN NOT NULL DEFAULT FALSE,
            status TEXT NOT NULL,
            description TEXT,
            primary_image_url TEXT,
            owner_id UUID,
            created_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(store_error)?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS applications (
            id UUID PRIMARY KEY,
            cat_id UUID NOT NULL REFERENCES cats (id) ON DELETE CASCADE,
            user_id UUID NOT NULL,
            status TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(store_error)?;

    for index in [
        "CREATE INDEX IF NOT EXISTS idx_cats_created_at ON cats (created_at, id)",
        "CREATE INDEX IF NOT EXISTS idx_cats_age_months ON cats (age_months, id)",
        "CREATE INDEX IF NOT EXISTS idx_cats_name ON cats ((name COLLATE \"C\"), id)",
        "CREATE INDEX IF NOT EXISTS idx_cats_status ON cats (status)",
        "CREATE INDEX IF NOT EXISTS idx_applications_user ON applications (user_id, created_at)",
        "CREATE INDEX IF NOT EXISTS idx_applications_cat ON applications (cat_id, status)",
        // at most one open application per user and cat
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_applications_one_pending \
         ON applications (cat_id, user_id) WHERE status = 'PENDING'",
    ] {
        sqlx::query(index)
            .execute(pool)
            .await
            .map_err(store_error)?;
    }

    Ok(())
}

fn corrupt(id: Uuid, message: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt {
        backend: BACKEND.to_string(),
        message: format!("row {}: {}", id, message),
    }
}

fn store_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => StoreError::Connection {
            backend: BACKEND.to_string(),
            message: e.to_string(),
        },
        other => StoreError::Query {
            backend: BACKEND.to_string(),
            message: other.to_string(),
        },
    }
}

/// Escape `%`, `_` and `\` so user text matches literally under LIKE
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// SQL expression for a sort key. Names compare bytewise to match `str` ordering.
fn sort_expr(by: SortBy) -> &'static str {
    match by {
        SortBy::Name => "name COLLATE \"C\"",
        other => other.column(),
    }
}

/// Append `AND ...` clauses for every constrained field of `filter`
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &CatFilter) {
    if let Some(statuses) = &filter.statuses {
        let values: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        qb.push(" AND status = ANY(").push_bind(values).push(")");
    }
    if let Some(sexes) = &filter.sexes {
        let values: Vec<String> = sexes.iter().map(|s| s.as_str().to_string()).collect();
        qb.push(" AND sex = ANY(").push_bind(values).push(")");
    }
    if let Some(min) = filter.min_age {
        qb.push(" AND age_months >= ").push_bind(i64::from(min));
    }
    if let Some(max) = filter.max_age {
        qb.push(" AND age_months <= ").push_bind(i64::from(max));
    }
    if let Some(breeds) = &filter.breeds {
        qb.push(" AND breed = ANY(").push_bind(breeds.clone()).push(")");
    }
    if let Some(desexed) = filter.desexed {
        qb.push(" AND desexed = ").push_bind(desexed);
    }
    if let Some(vaccinated) = filter.vaccinated {
        qb.push(" AND vaccinated = ").push_bind(vaccinated);
    }
    if let Some(microchipped) = filter.microchipped {
        qb.push(" AND microchipped = ").push_bind(microchipped);
    }
    if let Some(q) = &filter.name_contains {
        qb.push(" AND name ILIKE ")
            .push_bind(format!("%{}%", escape_like(q)));
    }
}

#[derive(sqlx::FromRow)]
struct CatRow {
    id: Uuid,
    name: String,
    sex: String,
    age_months: i64,
    breed: String,
    vaccinated: bool,
    desexed: bool,
    microchipped: bool,
    status: String,
    description: Option<String>,
    primary_image_url: Option<String>,
    owner_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CatRow> for CatRecord {
    type Error = StoreError;

    fn try_from(row: CatRow) -> Result<Self, Self::Error> {
        let id = row.id;
        Ok(CatRecord {
            id,
            sex: row.sex.parse().map_err(|e| corrupt(id, e))?,
            status: row.status.parse().map_err(|e| corrupt(id, e))?,
            age_months: u32::try_from(row.age_months).map_err(|e| corrupt(id, e))?,
            name: row.name,
            breed: row.breed,
            vaccinated: row.vaccinated,
            desexed: row.desexed,
            microchipped: row.microchipped,
            description: row.description,
            primary_image_url: row.primary_image_url,
            owner_id: row.owner_id,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    cat_id: Uuid,
    user_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for ApplicationRecord {
    type Error = StoreError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(ApplicationRecord {
            status: row.status.parse().map_err(|e| corrupt(row.id, e))?,
            id: row.id,
            cat_id: row.cat_id,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Cat store backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PostgresCatStore {
    pool: PgPool,
}

impl PostgresCatStore {
    /// Create a new `PostgresCatStore` with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatStore for PostgresCatStore {
    async fn fetch_page(
        &self,
        filter: &CatFilter,
        order: SortOrder,
        after: Option<Uuid>,
        take: usize,
    ) -> Result<Vec<CatSummary>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        // Share-lock the cursor row so a concurrent delete waits for the page read
        if let Some(id) = after {
            let cursor: Option<(Uuid,)> =
                sqlx::query_as("SELECT id FROM cats WHERE id = $1 FOR SHARE")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(store_error)?;
            if cursor.is_none() {
                return Err(StoreError::CursorNotFound { id });
            }
        }

        let key = sort_expr(order.by);
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM cats WHERE TRUE", COLUMNS));
        push_filter(&mut qb, filter);

        if let Some(id) = after {
            let comparison = match order.dir {
                SortDir::Asc => ">",
                SortDir::Desc => "<",
            };
            qb.push(format!(" AND ({}, id) {} (SELECT {}, id FROM cats WHERE id = ", key, comparison, key))
                .push_bind(id)
                .push(")");
        }

        let dir = order.dir.keyword();
        qb.push(format!(" ORDER BY {} {}, id {} LIMIT ", key, dir, dir))
            .push_bind(take as i64);

        let rows: Vec<CatRow> = qb
            .build_query_as()
            .fetch_all(&mut *tx)
            .await
            .map_err(store_error)?;
        tx.commit().await.map_err(store_error)?;

        rows.into_iter()
            .map(|row| CatRecord::try_from(row).map(|cat| cat.summary()))
            .collect()
    }

    async fn get(&self, id: &Uuid) -> Result<Option<CatRecord>, StoreError> {
        let row: Option<CatRow> =
            sqlx::query_as(&format!("SELECT {} FROM cats WHERE id = $1", COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(store_error)?;
        row.map(CatRecord::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<CatSummary>, StoreError> {
        let rows: Vec<CatRow> = sqlx::query_as(&format!(
            "SELECT {} FROM cats ORDER BY created_at DESC, id DESC",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter()
            .map(|row| CatRecord::try_from(row).map(|cat| cat.summary()))
            .collect()
    }

    async fn insert(&self, cat: CatRecord) -> Result<CatRecord, StoreError> {
        sqlx::query(
            "INSERT INTO cats (id, name, sex, age_months, breed, vaccinated, desexed, microchipped,
                status, description, primary_image_url, owner_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(cat.id)
        .bind(&cat.name)
        .bind(cat.sex.as_str())
        .bind(i64::from(cat.age_months))
        .bind(&cat.breed)
        .bind(cat.vaccinated)
        .bind(cat.desexed)
        .bind(cat.microchipped)
        .bind(cat.status.as_str())
        .bind(&cat.description)
        .bind(&cat.primary_image_url)
        .bind(cat.owner_id)
        .bind(cat.created_at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(cat)
    }

    async fn set_status(&self, id: &Uuid, status: CatStatus) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE cats SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM cats WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_application(&self, application: &ApplicationRecord) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO applications (id, cat_id, user_id, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (cat_id, user_id) WHERE status = 'PENDING' DO NOTHING",
        )
        .bind(application.id)
        .bind(application.cat_id)
        .bind(application.user_id)
        .bind(application.status.as_str())
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_application(&self, id: &Uuid) -> Result<Option<ApplicationRecord>, StoreError> {
        let row: Option<ApplicationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM applications WHERE id = $1",
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        row.map(ApplicationRecord::try_from).transpose()
    }

    async fn applications_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ApplicationRecord>, StoreError> {
        let rows: Vec<ApplicationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM applications WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            APPLICATION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;
        rows.into_iter().map(ApplicationRecord::try_from).collect()
    }

    async fn pending_applications(&self, cat_id: &Uuid) -> Result<u32, StoreError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM applications WHERE cat_id = $1 AND status = 'PENDING'",
        )
        .bind(cat_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn set_application_status(
        &self,
        id: &Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let row: Option<ApplicationRow> = sqlx::query_as(&format!(
            "UPDATE applications SET status = $1, updated_at = $2 WHERE id = $3 RETURNING {}",
            APPLICATION_COLUMNS
        ))
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        row.map(ApplicationRecord::try_from).transpose()
    }
}
