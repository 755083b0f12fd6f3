//! HTTP router for the cost endpoints.

use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::commands;
use crate::context::AppContext;

/// Build the application router.
///
/// # Routes
///
/// - `GET /health`
/// - `GET /costs/monthly-closing/{year}/{month}` and `/preview`
/// - `POST /costs/monthly-closing/{year}/{month}/close` and `/reopen`
/// - `GET|POST /costs/monthly-salaries`, `DELETE /costs/monthly-salaries/{id}`
/// - `GET|POST /costs/monthly-overhead`, `PATCH|DELETE /costs/monthly-overhead/{id}`
/// - `GET /costs/internal-costs/{year}/{month}`
pub fn router(ctx: Arc<AppContext>) -> Router {
    let costs = Router::new()
        .route("/monthly-closing/{year}/{month}", get(commands::get_closing))
        .route("/monthly-closing/{year}/{month}/preview", get(commands::preview_closing))
        .route("/monthly-closing/{year}/{month}/close", post(commands::close_month))
        .route("/monthly-closing/{year}/{month}/reopen", post(commands::reopen_month))
        .route(
            "/monthly-salaries",
            get(commands::list_salaries).post(commands::upsert_salary),
        )
        .route("/monthly-salaries/{id}", delete(commands::delete_salary))
        .route(
            "/monthly-overhead",
            get(commands::list_overhead).post(commands::create_overhead),
        )
        .route(
            "/monthly-overhead/{id}",
            patch(commands::update_overhead).delete(commands::delete_overhead),
        )
        .route("/internal-costs/{year}/{month}", get(commands::get_internal_costs));

    Router::new()
        .route("/health", get(commands::get_health))
        .nest("/costs", costs)
        .with_state(ctx)
}
