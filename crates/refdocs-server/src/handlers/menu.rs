//! Menu API endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use refdocs_docs::MenuNode;

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /api/menu/{lang}/{ref}.
pub(crate) async fn get_menu(
    Path((lang, ref_)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MenuNode>>, ServerError> {
    let menu = state.docs.get_menu(&ref_, &lang).await?;
    Ok(Json(menu))
}
