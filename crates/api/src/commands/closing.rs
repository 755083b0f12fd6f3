//! Month closing endpoints under `/costs/monthly-closing/{year}/{month}`

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use costclose_domain::{ClosingPreview, ClosingView, Period};
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::utils::{execute, ApiError, Caller};

/// Body of a successful close.
#[derive(Debug, Serialize)]
pub struct CloseResponse {
    pub success: bool,
    pub closing: ClosingView,
}

/// Body of an explicit reopen. A blank reason is rejected.
#[derive(Debug, Deserialize)]
pub struct ReopenRequest {
    #[serde(default)]
    pub reason: String,
}

/// `GET /costs/monthly-closing/{year}/{month}`
pub async fn get_closing(
    State(ctx): State<Arc<AppContext>>,
    Caller(actor): Caller,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<ClosingView>, ApiError> {
    let period = Period::new(year, month)?;
    execute("closing::status", ctx.closing.status(actor.company_id, period, &actor.scope))
        .await
        .map(Json)
}

/// `GET /costs/monthly-closing/{year}/{month}/preview`
pub async fn preview_closing(
    State(ctx): State<Arc<AppContext>>,
    Caller(actor): Caller,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<ClosingPreview>, ApiError> {
    let period = Period::new(year, month)?;
    execute("closing::preview", ctx.closing.preview(actor.company_id, period, &actor.scope))
        .await
        .map(Json)
}

/// `POST /costs/monthly-closing/{year}/{month}/close`
///
/// A blocked close answers 400 with every validation error in `errors`.
pub async fn close_month(
    State(ctx): State<Arc<AppContext>>,
    Caller(actor): Caller,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<CloseResponse>, ApiError> {
    let period = Period::new(year, month)?;
    let closing = execute("closing::close", ctx.closing.close(&actor, period)).await?;
    Ok(Json(CloseResponse { success: true, closing }))
}

/// `POST /costs/monthly-closing/{year}/{month}/reopen`
pub async fn reopen_month(
    State(ctx): State<Arc<AppContext>>,
    Caller(actor): Caller,
    Path((year, month)): Path<(i32, u32)>,
    Json(request): Json<ReopenRequest>,
) -> Result<Json<ClosingView>, ApiError> {
    let period = Period::new(year, month)?;
    execute("closing::reopen", ctx.closing.reopen(&actor, period, &request.reason))
        .await
        .map(Json)
}
