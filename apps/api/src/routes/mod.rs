pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::fill::handlers as fill;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Legacy parsing proxy shape used by the options page
        .route("/api/parse-resume", post(resume::handle_parse_resume))
        // Resume API
        .route(
            "/api/v1/resume",
            get(resume::handle_get_resume)
                .put(resume::handle_put_resume)
                .delete(resume::handle_clear_resume),
        )
        .route("/api/v1/resume/markdown", get(resume::handle_get_markdown))
        .route("/api/v1/resume/import/ai", post(resume::handle_import_ai))
        .route("/api/v1/resume/import/text", post(resume::handle_import_text))
        // Settings API
        .route(
            "/api/v1/settings",
            get(resume::handle_get_settings).put(resume::handle_put_settings),
        )
        // Fill API
        .route("/api/v1/fill", post(fill::handle_fill))
        .route("/api/v1/fill/stats", post(fill::handle_form_stats))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::errors::AppError;
    use crate::fill::{FieldMatcher, FormFiller};
    use crate::llm_client::LlmError;
    use crate::resume::{ResumeTextParser, StateFile, StateStore};
    use crate::taxonomy::FieldTaxonomy;

    /// Returns a fixed result, or fails like an unconfigured model when `None`.
    struct StubParser(Option<Value>);

    #[async_trait]
    impl ResumeTextParser for StubParser {
        async fn parse(&self, _txt: &str) -> Result<Value, AppError> {
            self.0.clone().ok_or(AppError::Llm(LlmError::MissingApiKey))
        }
    }

    async fn app_with(parser: StubParser) -> (Router, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = StateStore::open(StateFile::new(&path)).await.unwrap();
        let config = Config {
            port: 0,
            rust_log: "info".to_string(),
            resume_state_path: path.display().to_string(),
            dashscope_api_key: None,
            llm_base_url: "http://127.0.0.1:9".to_string(),
            llm_model: "stub".to_string(),
        };
        let state = AppState {
            config,
            store: Arc::new(store),
            filler: Arc::new(FormFiller::new(Arc::new(FieldMatcher::standard(
                Arc::new(FieldTaxonomy::standard()),
            )))),
            resume_parser: Arc::new(parser),
        };
        (build_router(state), dir)
    }

    async fn app() -> (Router, TempDir) {
        app_with(StubParser(None)).await
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(json) => Body::from(json.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    const RESUME_MD: &str = "## 基本信息\n### 姓名\n张三\n### 手机号码\n13800138000\n";

    fn name_form() -> Value {
        json!({
            "tag": "form",
            "children": [
                {"tag": "label", "attrs": {"for": "n"}, "children": ["姓名"]},
                {"tag": "input", "attrs": {"id": "n", "name": "name"}}
            ]
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _dir) = app().await;
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "autofill-api");
    }

    #[tokio::test]
    async fn test_put_then_get_resume() {
        let (app, _dir) = app().await;
        let (status, body) = send(
            &app,
            "PUT",
            "/api/v1/resume",
            Some(json!({"markdown": RESUME_MD})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["基本信息"]["姓名"], "张三");

        let (_, body) = send(&app, "GET", "/api/v1/resume", None).await;
        assert_eq!(body["基本信息"]["手机号码"], "13800138000");

        let (_, body) = send(&app, "GET", "/api/v1/resume/markdown", None).await;
        assert!(body["markdown"]
            .as_str()
            .unwrap()
            .contains("### 姓名\n张三"));
    }

    #[tokio::test]
    async fn test_put_resume_rejects_empty_parse() {
        let (app, _dir) = app().await;
        let (status, body) = send(
            &app,
            "PUT",
            "/api/v1/resume",
            Some(json!({"markdown": "随便写点什么"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["message"], "parse produced nothing");
    }

    #[tokio::test]
    async fn test_delete_resume_clears_store_and_settings() {
        let (app, _dir) = app().await;
        send(&app, "PUT", "/api/v1/resume", Some(json!({"markdown": RESUME_MD}))).await;
        send(&app, "PUT", "/api/v1/settings", Some(json!({"autoFill": false}))).await;

        let (status, _) = send(&app, "DELETE", "/api/v1/resume", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&app, "GET", "/api/v1/resume", None).await;
        assert_eq!(body, json!({}));
        let (_, body) = send(&app, "GET", "/api/v1/settings", None).await;
        assert_eq!(body, json!({"autoFill": true, "showNotification": true}));
    }

    #[tokio::test]
    async fn test_fill_pass_over_snapshot() {
        let (app, _dir) = app().await;
        send(&app, "PUT", "/api/v1/resume", Some(json!({"markdown": RESUME_MD}))).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/fill",
            Some(json!({"document": name_form(), "trigger": "manual"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let report = &body["report"];
        assert_eq!(report["filled"], 1);
        assert_eq!(report["fields"][0]["action"]["kind"], "set_value");
        assert_eq!(report["fields"][0]["action"]["value"], "张三");
        assert_eq!(report["notifications"][0], "已填写: 姓名 = 张三");
    }

    #[tokio::test]
    async fn test_fill_without_notifications() {
        let (app, _dir) = app().await;
        send(&app, "PUT", "/api/v1/resume", Some(json!({"markdown": RESUME_MD}))).await;
        send(&app, "PUT", "/api/v1/settings", Some(json!({"showNotification": false}))).await;

        let (_, body) = send(
            &app,
            "POST",
            "/api/v1/fill",
            Some(json!({"document": name_form()})),
        )
        .await;
        assert_eq!(body["report"]["filled"], 1);
        assert!(body["report"].get("notifications").is_none());
    }

    #[tokio::test]
    async fn test_page_load_respects_auto_fill_toggle() {
        let (app, _dir) = app().await;
        send(&app, "PUT", "/api/v1/resume", Some(json!({"markdown": RESUME_MD}))).await;
        let (_, settings) =
            send(&app, "PUT", "/api/v1/settings", Some(json!({"autoFill": false}))).await;
        assert_eq!(settings["autoFill"], false);

        let (_, body) = send(
            &app,
            "POST",
            "/api/v1/fill",
            Some(json!({"document": name_form(), "trigger": "page_load"})),
        )
        .await;
        assert_eq!(body["skipped"], "auto_fill_disabled");
        assert!(body.get("report").is_none());

        let (_, body) = send(
            &app,
            "POST",
            "/api/v1/fill",
            Some(json!({"document": name_form(), "trigger": "context_menu"})),
        )
        .await;
        assert_eq!(body["report"]["filled"], 1);
    }

    #[tokio::test]
    async fn test_fill_without_resume_is_skipped() {
        let (app, _dir) = app().await;
        let (_, body) = send(
            &app,
            "POST",
            "/api/v1/fill",
            Some(json!({"document": name_form()})),
        )
        .await;
        assert_eq!(body["skipped"], "no_resume");
    }

    #[tokio::test]
    async fn test_form_stats() {
        let (app, _dir) = app().await;
        let document = json!({
            "tag": "form",
            "children": [
                {"tag": "input", "attrs": {"name": "a"}, "value": "x"},
                {"tag": "input", "attrs": {"name": "b"}},
                {"tag": "textarea"}
            ]
        });
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/fill/stats",
            Some(json!({"document": document})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"total": 3, "filled": 1, "empty": 2}));
    }

    #[tokio::test]
    async fn test_import_text() {
        let (app, _dir) = app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/resume/import/text",
            Some(json!({"txt": "姓名：张三\n邮箱：zhang@example.com\n"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let markdown = body["markdown"].as_str().unwrap();
        assert!(markdown.contains("### 姓名\n张三"));
        assert!(markdown.contains("### 邮箱地址\nzhang@example.com"));

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/resume/import/text",
            Some(json!({"txt": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_import_ai_with_stub_parser() {
        let parsed = json!({"基本信息": ["张三", "男"]});
        let (app, _dir) = app_with(StubParser(Some(parsed.clone()))).await;

        let (_, body) = send(
            &app,
            "POST",
            "/api/parse-resume",
            Some(json!({"txt": "张三 男"})),
        )
        .await;
        assert_eq!(body, parsed);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/resume/import/ai",
            Some(json!({"txt": "张三 男"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["markdown"].as_str().unwrap().contains("### 性别\n男"));
    }

    #[tokio::test]
    async fn test_unconfigured_model_reports_service_unavailable() {
        let (app, _dir) = app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/parse-resume",
            Some(json!({"txt": "张三"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "LLM_NOT_CONFIGURED");
        assert_eq!(body["error"]["message"], "API key not set");
    }
}
