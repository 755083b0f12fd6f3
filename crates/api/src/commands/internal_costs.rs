use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use costclose_domain::{Period, ProjectInternalCost};

use crate::context::AppContext;
use crate::utils::{execute, ApiError, Caller};

/// `GET /costs/internal-costs/{year}/{month}`
///
/// Live-mode internal cost (hours × current hourly cost) per visible project.
pub async fn get_internal_costs(
    State(ctx): State<Arc<AppContext>>,
    Caller(actor): Caller,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<Vec<ProjectInternalCost>>, ApiError> {
    let period = Period::new(year, month)?;
    execute(
        "internal_costs::for_month",
        ctx.internal_costs.for_month(actor.company_id, period, &actor.scope),
    )
    .await
    .map(Json)
}
