//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::page::get_page))
        .route("/update", get(handlers::update::ws_handler))
        .route("/assets/livemd.js", get(handlers::assets::get_script))
        .route("/assets/livemd.css", get(handlers::assets::get_stylesheet));

    for layer in security::header_layers() {
        router = router.layer(layer);
    }

    router
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use livemd_preview::{
        BroadcastPipeline, DocumentSnapshot, DocumentSource, MockSource, PreviewHub,
    };
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn router_with(snapshot: Option<DocumentSnapshot>) -> (Arc<PreviewHub>, Router) {
        let hub = Arc::new(PreviewHub::new("livemd"));
        if let Some(snapshot) = snapshot {
            hub.publish(snapshot);
        }
        let state = Arc::new(AppState {
            hub: Arc::clone(&hub),
        });
        (hub, create_router(state))
    }

    fn snapshot(title: &str, html: &str) -> DocumentSnapshot {
        DocumentSnapshot {
            title: title.to_owned(),
            html: html.to_owned(),
        }
    }

    async fn get(router: Router, uri: &str) -> Response {
        let request = Request::builder()
            .uri(uri)
            .header(header::HOST, "localhost:8081")
            .body(Body::empty())
            .unwrap();
        router.oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn header_value<'a>(response: &'a Response, name: &str) -> &'a str {
        response.headers().get(name).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn test_page_embeds_current_snapshot() {
        let (_hub, router) = router_with(Some(snapshot("Title", "<h1>Title</h1>\n<p>Body</p>\n")));

        let response = get(router, "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(header_value(&response, "content-type").starts_with("text/html"));
        let body = body_text(response).await;
        assert!(body.contains("<title>Title</title>"));
        assert!(body.contains("<h1>Title</h1>\n<p>Body</p>"));
        assert!(body.contains(r#"data-ws-url="ws://localhost:8081/update""#));
        assert!(body.contains(r#"<script src="/assets/livemd.js" defer></script>"#));
    }

    #[tokio::test]
    async fn test_page_before_first_publish_uses_fallback() {
        let (_hub, router) = router_with(None);

        let body = body_text(get(router, "/").await).await;

        assert!(body.contains("<title>livemd</title>"));
    }

    #[tokio::test]
    async fn test_page_reflects_latest_publish() {
        let (hub, router) = router_with(Some(snapshot("Old", "<p>old</p>")));
        hub.publish(snapshot("New", "<p>new</p>"));

        let body = body_text(get(router, "/").await).await;

        assert!(body.contains("<title>New</title>"));
        assert!(body.contains("<p>new</p>"));
        assert!(!body.contains("<p>old</p>"));
    }

    #[tokio::test]
    async fn test_page_follows_pipeline_refresh() {
        let (hub, router) = router_with(None);
        let source = Arc::new(MockSource::new("/docs/notes.md", "# Draft"));
        let mut pipeline = BroadcastPipeline::new(
            Arc::clone(&source) as Arc<dyn DocumentSource>,
            Arc::clone(&hub),
        );
        pipeline.initialize().unwrap();

        source.set_content("# Final\n\nDone");
        pipeline.refresh().unwrap();

        let body = body_text(get(router, "/").await).await;
        assert!(body.contains("<title>Final</title>"));
        assert!(body.contains("<p>Done</p>"));
    }

    #[tokio::test]
    async fn test_page_title_is_plain_text() {
        let (_hub, router) = router_with(Some(snapshot(
            "Hello <em>World</em>",
            "<h1>Hello <em>World</em></h1>",
        )));

        let body = body_text(get(router, "/").await).await;

        assert!(body.contains("<title>Hello World</title>"));
    }

    #[tokio::test]
    async fn test_page_escapes_host_header() {
        let (_hub, router) = router_with(None);
        let request = Request::builder()
            .uri("/")
            .header(header::HOST, r#"evil"host"#)
            .body(Body::empty())
            .unwrap();

        let body = body_text(router.oneshot(request).await.unwrap()).await;

        assert!(body.contains(r#"data-ws-url="ws://evil&quot;host/update""#));
    }

    #[tokio::test]
    async fn test_security_headers_on_every_response() {
        for uri in ["/", "/assets/livemd.js", "/missing"] {
            let (_hub, router) = router_with(None);

            let response = get(router, uri).await;

            assert!(
                header_value(&response, "content-security-policy").contains("script-src 'self'"),
                "{uri}"
            );
            assert_eq!(header_value(&response, "x-content-type-options"), "nosniff");
            assert_eq!(header_value(&response, "x-frame-options"), "DENY");
        }
    }

    #[tokio::test]
    async fn test_assets_served_with_content_type() {
        let (_hub, router) = router_with(None);
        let response = get(router, "/assets/livemd.js").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(header_value(&response, "content-type").starts_with("text/javascript"));
        assert!(body_text(response).await.contains("new WebSocket(url)"));

        let (_hub, router) = router_with(None);
        let response = get(router, "/assets/livemd.css").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(header_value(&response, "content-type").starts_with("text/css"));
    }

    #[tokio::test]
    async fn test_unknown_path_not_found() {
        let (_hub, router) = router_with(None);

        let response = get(router, "/notes.md").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_requires_websocket_upgrade() {
        let (hub, router) = router_with(None);

        let response = get(router, "/update").await;

        assert!(response.status().is_client_error());
        assert_eq!(hub.session_count(), 0);
    }
}
