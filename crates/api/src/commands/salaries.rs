//! Monthly salary extras under `/costs/monthly-salaries`

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use costclose_domain::{MonthlyUserSalary, Period, SalaryLine, UserId, WithWarning};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::AppContext;
use crate::utils::{execute, ApiError, Caller};

/// `?year=&month=` selector shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub year: i32,
    pub month: u32,
}

impl PeriodQuery {
    pub fn period(&self) -> Result<Period, ApiError> {
        Ok(Period::new(self.year, self.month)?)
    }
}

/// Extras for one user and month. Replaces any earlier value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSalaryRequest {
    pub user_id: UserId,
    pub year: i32,
    pub month: u32,
    pub extras: Decimal,
}

/// Answer of every delete endpoint.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// `GET /costs/monthly-salaries?year=&month=`
pub async fn list_salaries(
    State(ctx): State<Arc<AppContext>>,
    Caller(actor): Caller,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<SalaryLine>>, ApiError> {
    let period = query.period()?;
    execute("salaries::list", ctx.salaries.list(actor.company_id, period)).await.map(Json)
}

/// `POST /costs/monthly-salaries`
pub async fn upsert_salary(
    State(ctx): State<Arc<AppContext>>,
    Caller(actor): Caller,
    Json(request): Json<UpsertSalaryRequest>,
) -> Result<Json<WithWarning<MonthlyUserSalary>>, ApiError> {
    let period = Period::new(request.year, request.month)?;
    execute(
        "salaries::upsert_extras",
        ctx.salaries.upsert_extras(&actor, request.user_id, period, request.extras),
    )
    .await
    .map(Json)
}

/// `DELETE /costs/monthly-salaries/{id}`
pub async fn delete_salary(
    State(ctx): State<Arc<AppContext>>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let warning = execute("salaries::delete", ctx.salaries.delete(&actor, id)).await?;
    Ok(Json(DeleteResponse { success: true, warning }))
}
