//! Refresh webhook endpoint.
//!
//! Drops the cached tags and branches of the upstream repository, e.g. when
//! a release is published.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use tracing::{info, warn};

use crate::error::ServerError;
use crate::state::AppState;

/// Handle POST /api/refresh.
pub(crate) async fn post_refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ServerError> {
    let expected = state
        .refresh_token
        .as_deref()
        .ok_or(ServerError::RefreshDisabled)?;

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if provided != Some(expected) {
        warn!("Rejected refresh request with missing or invalid token");
        return Err(ServerError::Unauthorized);
    }

    state.docs.registry().invalidate(state.docs.repo());
    info!(repo = %state.docs.repo(), "Version cache refreshed");
    Ok(StatusCode::NO_CONTENT)
}
