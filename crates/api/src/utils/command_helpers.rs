//! Handler execution helpers
//!
//! Every HTTP handler funnels its service call through [`execute`] so timing
//! and outcome logging look the same across endpoints.

use std::future::Future;
use std::time::Instant;

use costclose_domain::Result as DomainResult;

use crate::utils::error::ApiError;
use crate::utils::logging::log_command_execution;

/// Run a service call, log its duration and outcome, and lift the error into
/// an [`ApiError`].
///
/// # Example
///
/// ```rust,ignore
/// pub async fn get_closing(...) -> Result<Json<ClosingView>, ApiError> {
///     execute("closing::status", ctx.closing.status(company, period, &scope))
///         .await
///         .map(Json)
/// }
/// ```
pub async fn execute<Fut, T>(command: &str, call: Fut) -> Result<T, ApiError>
where
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = call.await;

    log_command_execution(
        command,
        start.elapsed(),
        result.is_ok(),
        result.as_ref().err().map(|err| err.label()),
    );

    result.map_err(ApiError::from)
}
