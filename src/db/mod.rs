mod models;

pub use models::*;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};
use std::sync::Arc;

use crate::intake::{BoundValue, NewSubmission, UpdateStatement};

pub type DbPool = Arc<PgPool>;

const SUBMISSION_COLUMNS: &str = "\
    id, first_name, last_name, email, phone, address, postal_code, \
    business_idea, requirements, status, created_at, updated_at, reviewed_at, notes";

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Database clock, used by the health check.
pub async fn ping(pool: &PgPool) -> Result<DateTime<Utc>, sqlx::Error> {
    sqlx::query_scalar("SELECT NOW()").fetch_one(pool).await
}

#[tracing::instrument(
    name = "Insert submission",
    skip(pool, submission),
    fields(email = %submission.email)
)]
pub async fn insert_submission(
    pool: &PgPool,
    submission: &NewSubmission,
) -> Result<Submission, sqlx::Error> {
    let query = format!(
        "INSERT INTO submissions \
             (first_name, last_name, email, phone, address, postal_code, \
              business_idea, requirements) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {SUBMISSION_COLUMNS}"
    );
    sqlx::query_as::<_, Submission>(&query)
        .bind(&submission.first_name)
        .bind(&submission.last_name)
        .bind(&submission.email)
        .bind(&submission.phone)
        .bind(&submission.address)
        .bind(&submission.postal_code)
        .bind(&submission.business_idea)
        .bind(&submission.requirements)
        .fetch_one(pool)
        .await
}

pub async fn get_submission(pool: &PgPool, id: i32) -> Result<Option<Submission>, sqlx::Error> {
    let query = format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1");
    sqlx::query_as::<_, Submission>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn submission_exists(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM submissions WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// One page of submissions plus the total row count.
pub async fn list_submissions(
    pool: &PgPool,
    params: &ListParams,
) -> Result<(Vec<Submission>, i64), sqlx::Error> {
    // sort column and direction come from closed enums, never from the request
    let query = format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions \
         ORDER BY {} {} \
         LIMIT $1 OFFSET $2",
        params.sort.column(),
        params.order.keyword()
    );

    let rows = sqlx::query_as::<_, Submission>(&query)
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(pool);
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM submissions").fetch_one(pool);

    let (rows, total) = tokio::try_join!(rows, total)?;
    Ok((rows, total))
}

/// Execute a statement from [`crate::intake::build_update`] and return the
/// updated row. `None` means the row vanished between lookup and update.
pub async fn apply_update(
    pool: &PgPool,
    statement: &UpdateStatement,
) -> Result<Option<Submission>, sqlx::Error> {
    let query = format!("{} RETURNING {SUBMISSION_COLUMNS}", statement.sql);

    let mut q = sqlx::query_as::<_, Submission>(&query);
    for value in &statement.values {
        q = bind_value(q, value);
    }
    q.fetch_optional(pool).await
}

fn bind_value<'q>(
    q: QueryAs<'q, Postgres, Submission, PgArguments>,
    value: &BoundValue,
) -> QueryAs<'q, Postgres, Submission, PgArguments> {
    match value {
        BoundValue::Text(text) => q.bind(text.clone()),
        BoundValue::Null => q.bind(None::<String>),
        BoundValue::Id(id) => q.bind(*id),
    }
}

/// Record a review decision. `reviewed_at` is stamped for approved/rejected
/// and cleared when a submission goes back to pending.
#[tracing::instrument(name = "Set submission status", skip(pool, notes))]
pub async fn set_status(
    pool: &PgPool,
    id: i32,
    status: SubmissionStatus,
    notes: Option<&str>,
) -> Result<Option<Submission>, sqlx::Error> {
    let query = format!(
        "UPDATE submissions SET \
             status = $1, \
             reviewed_at = CASE WHEN $2 THEN NOW() ELSE NULL END, \
             notes = COALESCE($3, notes), \
             updated_at = NOW() \
         WHERE id = $4 \
         RETURNING {SUBMISSION_COLUMNS}"
    );
    sqlx::query_as::<_, Submission>(&query)
        .bind(status.as_str())
        .bind(status.is_reviewed())
        .bind(notes)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Returns the id of the deleted row, if there was one.
pub async fn delete_submission(pool: &PgPool, id: i32) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar("DELETE FROM submissions WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn statistics(pool: &PgPool) -> Result<Statistics, sqlx::Error> {
    sqlx::query_as::<_, Statistics>(
        r#"
        SELECT
            COUNT(*) AS total_submissions,
            COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '7 days') AS recent_submissions,
            MIN(created_at) AS first_submission,
            MAX(created_at) AS last_submission,
            COUNT(*) FILTER (WHERE status = 'pending') AS pending,
            COUNT(*) FILTER (WHERE status = 'approved') AS approved,
            COUNT(*) FILTER (WHERE status = 'rejected') AS rejected
        FROM submissions
        "#,
    )
    .fetch_one(pool)
    .await
}
