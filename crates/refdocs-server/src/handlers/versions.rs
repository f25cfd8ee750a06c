//! Versions API endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use refdocs_refs::VersionSet;

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /api/versions.
pub(crate) async fn get_versions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VersionSet>, ServerError> {
    let versions = state.docs.versions().await?;
    Ok(Json(versions))
}
