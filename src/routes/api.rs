use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::db::{self, ListParams, SubmissionStatus};
use crate::error::{AppError, AppResult};
use crate::intake::{self, sanitize::clean_text, PlaceholderStyle};
use crate::state::AppState;

const NOT_FOUND: &str = "Submission not found";

type JsonPayload<T> = Result<Json<T>, JsonRejection>;

fn parse_id(raw: &str) -> AppResult<i32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::BadRequest("Invalid submission id".to_string()))
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    payload: JsonPayload<Map<String, Value>>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload?;

    let submission = intake::validate_submission(&payload)?;
    let record = db::insert_submission(state.pool.as_ref(), &submission).await?;

    tracing::info!(id = record.id, "Submission received");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Submission received successfully!",
            "data": record,
        })),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    limit: Option<String>,
    offset: Option<String>,
    sort_by: Option<String>,
    order: Option<String>,
}

impl ListQuery {
    fn params(&self) -> ListParams {
        ListParams::new(
            self.limit.as_deref().and_then(|v| v.parse().ok()),
            self.offset.as_deref().and_then(|v| v.parse().ok()),
            self.sort_by.as_deref(),
            self.order.as_deref(),
        )
    }
}

pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Value>> {
    let params = query.params();
    let (rows, total) = db::list_submissions(state.pool.as_ref(), &params).await?;

    Ok(Json(json!({
        "success": true,
        "data": rows,
        "pagination": {
            "total": total,
            "limit": params.limit,
            "offset": params.offset,
            "page": params.page(),
        },
    })))
}

pub async fn get_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id)?;
    let record = db::get_submission(state.pool.as_ref(), id)
        .await?
        .ok_or(AppError::NotFound(NOT_FOUND))?;

    Ok(Json(json!({ "success": true, "data": record })))
}

pub async fn update_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: JsonPayload<Map<String, Value>>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id)?;
    let Json(changes) = payload?;

    if !db::submission_exists(state.pool.as_ref(), id).await? {
        return Err(AppError::NotFound(NOT_FOUND));
    }

    let statement = intake::build_update(id, &changes, PlaceholderStyle::Dollar)?;
    let record = db::apply_update(state.pool.as_ref(), &statement)
        .await?
        .ok_or(AppError::NotFound(NOT_FOUND))?;

    tracing::info!(id, columns = ?statement.columns, "Submission updated");

    Ok(Json(json!({
        "success": true,
        "message": "Submission updated successfully",
        "data": record,
    })))
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    status: String,
    notes: Option<String>,
}

pub async fn review_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: JsonPayload<StatusChange>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id)?;
    let Json(change) = payload?;

    let status = SubmissionStatus::parse(&change.status).ok_or_else(|| {
        AppError::BadRequest("Status must be one of pending, approved, rejected".to_string())
    })?;
    let notes = change.notes.as_deref().map(clean_text);

    let record = db::set_status(state.pool.as_ref(), id, status, notes.as_deref())
        .await?
        .ok_or(AppError::NotFound(NOT_FOUND))?;

    tracing::info!(id, status = status.as_str(), "Submission reviewed");

    Ok(Json(json!({
        "success": true,
        "message": "Submission status updated",
        "data": record,
    })))
}

pub async fn delete_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let id = parse_id(&id)?;
    let deleted = db::delete_submission(state.pool.as_ref(), id)
        .await?
        .ok_or(AppError::NotFound(NOT_FOUND))?;

    tracing::info!(id = deleted, "Submission deleted");

    Ok(Json(json!({
        "success": true,
        "message": "Submission deleted successfully",
        "deletedId": deleted,
    })))
}

pub async fn statistics(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let stats = db::statistics(state.pool.as_ref()).await?;

    Ok(Json(json!({ "success": true, "statistics": stats })))
}
