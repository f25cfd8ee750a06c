//! Docs page endpoint.
//!
//! Canonicalizes `/docs/{lang}/{ref}/{*rest}` paths: non-canonical paths are
//! redirected, canonical ones return the page and its menu.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use refdocs_docs::{Doc, MenuNode};
use refdocs_refs::{ParamTriple, is_language_code};
use serde::Serialize;
use tracing::debug;

use crate::error::ServerError;
use crate::state::AppState;

/// Response for a canonical docs path.
#[derive(Serialize)]
struct DocResponse {
    /// The requested page.
    doc: Doc,
    /// Menu of the page's ref and language.
    menu: Vec<MenuNode>,
}

/// Handle GET /docs/{lang}.
pub(crate) async fn get_lang(
    Path(lang): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    serve(ParamTriple::new(lang), &state).await
}

/// Handle GET /docs/{lang}/{ref}.
pub(crate) async fn get_ref(
    Path((lang, ref_)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    serve(ParamTriple::new(lang).with_ref(ref_), &state).await
}

/// Handle GET /docs/{lang}/{ref}/{*rest}.
pub(crate) async fn get_rest(
    Path((lang, ref_, rest)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    serve(ParamTriple::new(lang).with_ref(ref_).with_rest(rest), &state).await
}

async fn serve(params: ParamTriple, state: &AppState) -> Result<Response, ServerError> {
    if let Some(target) = state.docs.canonical_path(&params).await? {
        let location = format!("/docs/{target}");
        debug!(location = %location, "Redirecting docs path");
        let value = HeaderValue::try_from(location.as_str())
            .map_err(|_| ServerError::PathNotFound(location.clone()))?;
        return Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, value)]).into_response());
    }

    // No redirect for a non-language path only happens without any release.
    if !is_language_code(&params.lang) {
        return Err(ServerError::PathNotFound(params.lang));
    }

    let ref_ = params.ref_.as_deref().unwrap_or_default();
    let slug = params.rest.as_deref().unwrap_or_default();
    let (doc, menu) = futures::try_join!(
        state.docs.get_doc(ref_, slug, &params.lang),
        state.docs.get_menu(ref_, &params.lang)
    )?;

    Ok(Json(DocResponse { doc, menu }).into_response())
}
