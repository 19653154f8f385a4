pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::contexts::handlers as tabs;
use crate::credentials::handlers as settings;
use crate::pipeline::handlers as pipeline;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Page contexts
        .route(
            "/api/v1/tabs",
            get(tabs::handle_list_tabs).post(tabs::handle_attach_tab),
        )
        .route(
            "/api/v1/tabs/:id",
            put(tabs::handle_update_tab).delete(tabs::handle_close_tab),
        )
        .route("/api/v1/tabs/:id/activate", post(tabs::handle_activate_tab))
        // Analysis and tailoring
        .route("/api/v1/analyze", post(pipeline::handle_analyze))
        .route("/api/v1/analysis", get(pipeline::handle_get_analysis))
        .route(
            "/api/v1/tailor",
            get(pipeline::handle_get_tailoring).post(pipeline::handle_tailor),
        )
        .route("/api/v1/cover-letter", post(pipeline::handle_cover_letter))
        // Session
        .route(
            "/api/v1/session",
            get(session::handle_get_session)
                .post(session::handle_sign_in)
                .delete(session::handle_sign_out),
        )
        // Master resume
        .route(
            "/api/v1/resume",
            get(pipeline::handle_get_resume).delete(pipeline::handle_delete_resume),
        )
        .route("/api/v1/resume/reload", post(pipeline::handle_reload_resume))
        .route("/api/v1/resume/text", put(pipeline::handle_set_resume_text))
        .route("/api/v1/resume/save", post(pipeline::handle_save_resume))
        // Settings
        .route(
            "/api/v1/settings/api-key",
            get(settings::handle_get_api_key).put(settings::handle_put_api_key),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::contexts::TabRegistry;
    use crate::credentials::CredentialStore;
    use crate::pipeline::tailoring::TailorMode;
    use crate::pipeline::tests::{anonymous_session, FakeResumes};
    use crate::pipeline::PipelineController;
    use crate::router::MessageRouter;
    use crate::storage::MemoryStore;

    fn app() -> Router {
        let router = Arc::new(MessageRouter::new());
        let tabs = Arc::new(TabRegistry::new(router.clone()));
        let pipeline = Arc::new(PipelineController::new(
            router,
            tabs.clone(),
            anonymous_session(),
            Arc::new(FakeResumes::default()),
            TailorMode::Backend,
        ));
        build_router(AppState {
            config: Config::from_lookup(|_| None).unwrap(),
            tabs,
            credentials: Arc::new(CredentialStore::new(Arc::new(MemoryStore::new()))),
            pipeline,
        })
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "copilot");
        assert_eq!(body["api_key_set"], false);
    }

    #[tokio::test]
    async fn test_api_key_is_never_echoed() {
        let app = app();
        let (status, body) = call(
            &app,
            "PUT",
            "/api/v1/settings/api-key",
            Some(json!({"api_key": "AIza-secret"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"is_set": true}));
    }

    #[tokio::test]
    async fn test_tailor_before_analysis_is_precondition() {
        let (status, body) = call(&app(), "POST", "/api/v1/tailor", None).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "ANALYSIS_NOT_DONE");
    }

    #[tokio::test]
    async fn test_tab_lifecycle_and_unknown_tab() {
        let app = app();
        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/tabs",
            Some(json!({"url": "https://jobs.example/1", "html": "<main>x</main>"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["tab_id"].as_u64().unwrap();

        let (status, _) = call(&app, "DELETE", &format!("/api/v1/tabs/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = call(&app, "POST", &format!("/api/v1/tabs/{id}/activate"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_analyze_rejects_malformed_body() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/analyze")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_without_background_ends_in_error_state() {
        let app = app();
        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/analyze",
            Some(json!({"text": "Pasted posting", "source": "paste"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
        assert_eq!(body["job"]["source"], "paste");

        let (_, analysis) = call(&app, "GET", "/api/v1/analysis", None).await;
        assert_eq!(analysis, body);
    }

    #[tokio::test]
    async fn test_declined_resume_delete_is_noop() {
        let (status, body) = call(&app(), "DELETE", "/api/v1/resume", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_changes"], false);
    }

    #[tokio::test]
    async fn test_signed_out_session_view() {
        let (status, body) = call(&app(), "GET", "/api/v1/session", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"is_authenticated": false, "user": null}));
    }
}
