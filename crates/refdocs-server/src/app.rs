//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let docs_routes = Router::new()
        .route("/docs/{lang}", get(handlers::docs::get_lang))
        .route("/docs/{lang}/{ref}", get(handlers::docs::get_ref))
        .route("/docs/{lang}/{ref}/{*rest}", get(handlers::docs::get_rest));

    let api_routes = Router::new()
        .route("/api/menu/{lang}/{ref}", get(handlers::menu::get_menu))
        .route("/api/versions", get(handlers::versions::get_versions))
        .route("/api/refresh", post(handlers::refresh::post_refresh));

    Router::new()
        .merge(docs_routes)
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use pretty_assertions::assert_eq;
    use refdocs_docs::{Doc, Docs, MemoryDocStore};
    use refdocs_versions::{CachePolicy, MockHost, RepoId, VersionHost, VersionRegistry};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn host() -> MockHost {
        MockHost::new()
            .with_release(None, "remix@2.1.0")
            .with_release(None, "remix-dev@2.1.0")
            .with_release(None, "remix@2.0.0")
            .with_release(Some("v1.19.3"), "v1.19.3")
            .with_branch("main")
            .with_branch("dev")
    }

    fn store() -> MemoryDocStore {
        MemoryDocStore::new()
            .with_doc(Doc::new("2.1.0", "en", "index.md", "Home").with_content("# Home"))
            .with_doc(Doc::new("2.1.0", "en", "guides/index.md", "Guides").with_content("x"))
            .with_doc(
                Doc::new("2.1.0", "en", "guides/routing.md", "Routing").with_content("# Routing"),
            )
            .with_doc(
                Doc::new("2.1.0", "fr", "guides/routing.md", "Routage").with_content("# Routage"),
            )
            .with_doc(Doc::new("main", "en", "index.md", "Main").with_content("# Main"))
    }

    fn app_with(host: MockHost, refresh_token: Option<&str>) -> Router {
        let host: Arc<dyn VersionHost> = Arc::new(host);
        let registry = Arc::new(VersionRegistry::new(host, "remix", CachePolicy::default()));
        let docs = Docs::new(
            registry,
            RepoId::new("remix-run", "remix"),
            Arc::new(store()),
            "main",
            "en",
        );
        create_router(Arc::new(AppState {
            docs,
            refresh_token: refresh_token.map(str::to_owned),
        }))
    }

    fn app() -> Router {
        app_with(host(), None)
    }

    async fn get(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &axum::response::Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_lang_only_redirects_to_latest_release() {
        let response = get(app(), "/docs/en").await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/docs/en/2.1.0");
    }

    #[tokio::test]
    async fn test_range_redirects_to_highest_match() {
        let response = get(app(), "/docs/fr/2.0/guides/routing").await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/docs/fr/2.0.0/guides/routing");
    }

    #[tokio::test]
    async fn test_content_path_redirects_under_default_lang() {
        let response = get(app(), "/docs/guides/routing").await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/docs/en/2.1.0/guides/routing");
    }

    #[tokio::test]
    async fn test_canonical_path_returns_doc_and_menu() {
        let response = get(app(), "/docs/en/2.1.0/guides/routing").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["doc"]["title"], "Routing");
        assert_eq!(body["doc"]["filePath"], "guides/routing.md");
        assert_eq!(body["menu"][0]["slug"], "guides");
        assert_eq!(body["menu"][0]["children"][0]["slug"], "guides/routing");
        assert_eq!(body["menu"][1]["slug"], "index");
    }

    #[tokio::test]
    async fn test_localized_doc_and_menu() {
        let response = get(app(), "/docs/fr/2.1.0/guides/routing").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["doc"]["title"], "Routage");
        assert_eq!(body["doc"]["lang"], "fr");
        assert_eq!(body["menu"][0]["children"][0]["title"], "Routage");
    }

    #[tokio::test]
    async fn test_branch_ref_without_rest_serves_index() {
        let response = get(app(), "/docs/en/main").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["doc"]["title"], "Main");
    }

    #[tokio::test]
    async fn test_missing_doc_is_not_found() {
        let response = get(app(), "/docs/en/2.1.0/missing").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Doc not found");
        assert_eq!(body["slug"], "missing");
    }

    #[tokio::test]
    async fn test_menu_endpoint() {
        let response = get(app(), "/api/menu/en/latest").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!([{
                "title": "Main",
                "slug": "index",
                "hasContent": true,
                "disabled": false,
                "children": [],
            }])
        );
    }

    #[tokio::test]
    async fn test_menu_unknown_ref_is_not_found() {
        let response = get(app(), "/api/menu/en/9.9.9").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["ref"], "9.9.9");
    }

    #[tokio::test]
    async fn test_versions_endpoint() {
        let response = get(app(), "/api/versions").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "tags": ["2.1.0", "2.0.0", "v1.19.3"],
                "branches": ["main", "dev"],
            })
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let host = host();
        host.set_failing(true);

        let response = get(app_with(host, None), "/api/versions").await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_non_language_path_without_releases_is_not_found() {
        let host = MockHost::new().with_branch("main");

        let response = get(app_with(host, None), "/docs/guides").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_security_headers() {
        let response = get(app(), "/api/versions").await;

        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert!(response.headers().contains_key("content-security-policy"));
    }

    fn refresh_request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::POST).uri("/api/refresh");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_refresh_disabled_without_token() {
        let response = app().oneshot(refresh_request(Some("anything"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_refresh_rejects_bad_token() {
        let app = app_with(host(), Some("s3cret"));

        let missing = app.clone().oneshot(refresh_request(None)).await.unwrap();
        let wrong = app.oneshot(refresh_request(Some("nope"))).await.unwrap();

        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_new_release() {
        let host = Arc::new(host());
        let registry = Arc::new(VersionRegistry::new(
            Arc::clone(&host) as Arc<dyn VersionHost>,
            "remix",
            CachePolicy::default(),
        ));
        let docs = Docs::new(
            registry,
            RepoId::new("remix-run", "remix"),
            Arc::new(store()),
            "main",
            "en",
        );
        let app = create_router(Arc::new(AppState {
            docs,
            refresh_token: Some("s3cret".to_owned()),
        }));

        let before = get(app.clone(), "/docs/en").await;
        assert_eq!(location(&before), "/docs/en/2.1.0");

        host.add_release(None, "remix@2.2.0");
        let refreshed = app.clone().oneshot(refresh_request(Some("s3cret"))).await.unwrap();
        assert_eq!(refreshed.status(), StatusCode::NO_CONTENT);

        let after = get(app, "/docs/en").await;
        assert_eq!(location(&after), "/docs/en/2.2.0");
    }
}
