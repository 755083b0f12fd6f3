//! Overhead line items under `/costs/monthly-overhead`

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use costclose_domain::{MonthlyOverheadCost, NewOverheadCost, OverheadCostPatch, WithWarning};
use uuid::Uuid;

use super::salaries::{DeleteResponse, PeriodQuery};
use crate::context::AppContext;
use crate::utils::{execute, ApiError, Caller};

/// `GET /costs/monthly-overhead?year=&month=`
pub async fn list_overhead(
    State(ctx): State<Arc<AppContext>>,
    Caller(actor): Caller,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<MonthlyOverheadCost>>, ApiError> {
    let period = query.period()?;
    execute("overhead::list", ctx.overhead.list(actor.company_id, period)).await.map(Json)
}

/// `POST /costs/monthly-overhead`
pub async fn create_overhead(
    State(ctx): State<Arc<AppContext>>,
    Caller(actor): Caller,
    Json(input): Json<NewOverheadCost>,
) -> Result<Json<WithWarning<MonthlyOverheadCost>>, ApiError> {
    execute("overhead::create", ctx.overhead.create(&actor, input)).await.map(Json)
}

/// `PATCH /costs/monthly-overhead/{id}`
pub async fn update_overhead(
    State(ctx): State<Arc<AppContext>>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    Json(patch): Json<OverheadCostPatch>,
) -> Result<Json<WithWarning<MonthlyOverheadCost>>, ApiError> {
    execute("overhead::update", ctx.overhead.update(&actor, id, patch)).await.map(Json)
}

/// `DELETE /costs/monthly-overhead/{id}`
pub async fn delete_overhead(
    State(ctx): State<Arc<AppContext>>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let warning = execute("overhead::delete", ctx.overhead.delete(&actor, id)).await?;
    Ok(Json(DeleteResponse { success: true, warning }))
}
