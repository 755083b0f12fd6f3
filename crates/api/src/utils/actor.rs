//! Caller identity from gateway headers
//!
//! Authentication happens upstream. The gateway forwards the authenticated
//! company and user ids plus the caller's project visibility:
//!
//! - `x-company-id`, `x-user-id`: required UUIDs
//! - `x-access-scope: full`: full admin, sees every project
//! - `x-project-ids`: comma separated UUIDs visible to a scoped caller

use std::collections::HashSet;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use costclose_domain::{Actor, CostCloseError, ProjectScope};
use uuid::Uuid;

use super::error::ApiError;

pub const COMPANY_HEADER: &str = "x-company-id";
pub const USER_HEADER: &str = "x-user-id";
pub const SCOPE_HEADER: &str = "x-access-scope";
pub const PROJECTS_HEADER: &str = "x-project-ids";

/// Authenticated caller, extracted from request headers.
#[derive(Debug, Clone)]
pub struct Caller(pub Actor);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers).map(Caller).map_err(ApiError)
    }
}

/// Build the caller from gateway headers. Missing or malformed ids are
/// `Auth` errors; without a full scope only the listed projects are visible.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, CostCloseError> {
    let company_id = uuid_header(headers, COMPANY_HEADER)?;
    let user_id = uuid_header(headers, USER_HEADER)?;

    let full = header_str(headers, SCOPE_HEADER)?
        .is_some_and(|scope| scope.trim().eq_ignore_ascii_case("full"));
    let scope = if full {
        ProjectScope::All
    } else {
        let ids = header_str(headers, PROJECTS_HEADER)?
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                Uuid::parse_str(raw).map_err(|_| {
                    CostCloseError::Auth(format!("malformed project id in {PROJECTS_HEADER}"))
                })
            })
            .collect::<Result<HashSet<_>, _>>()?;
        ProjectScope::Only(ids)
    };

    Ok(Actor { user_id, company_id, scope })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, CostCloseError> {
    headers
        .get(name)
        .map(|value| {
            value.to_str().map_err(|_| CostCloseError::Auth(format!("{name} is not valid text")))
        })
        .transpose()
}

fn uuid_header(headers: &HeaderMap, name: &str) -> Result<Uuid, CostCloseError> {
    let raw = header_str(headers, name)?
        .ok_or_else(|| CostCloseError::Auth(format!("missing {name} header")))?;
    Uuid::parse_str(raw.trim()).map_err(|_| CostCloseError::Auth(format!("malformed {name} header")))
}
