pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::scoring::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Scoring API
        .route("/api/v1/reports/score", post(handlers::handle_score))
        .route(
            "/api/v1/reports/score/upload",
            post(handlers::handle_score_upload),
        )
        // Guide API
        .route("/api/v1/guides", get(handlers::handle_list_guides))
        .route(
            "/api/v1/guides/validate",
            post(handlers::handle_validate_guide),
        )
        .route("/api/v1/guides/:domain", get(handlers::handle_get_guide))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::errors::AppError;
    use crate::scoring::catalog::GuideCatalog;
    use crate::scoring::engine::{HeuristicScorer, ReportScorer, ScoreRequest, ScoringEngine};
    use crate::scoring::report::ScoreReport;

    const BOUNDARY: &str = "remarq-test-boundary";

    fn test_state() -> AppState {
        AppState {
            config: Config::default(),
            scorer: Arc::new(HeuristicScorer::new(ScoringEngine::default())),
            guides: Arc::new(GuideCatalog::builtin().unwrap()),
        }
    }

    struct FailingScorer;

    #[async_trait]
    impl ReportScorer for FailingScorer {
        async fn score(&self, _request: ScoreRequest) -> Result<ScoreReport, AppError> {
            Err(AppError::Internal(anyhow::anyhow!("backend unavailable")))
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    async fn read_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    /// (part name, optional file name, content)
    fn multipart_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/api/v1/reports/score/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = build_router(test_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "remarq-api");
    }

    #[tokio::test]
    async fn test_score_with_explicit_guide() {
        let request = post_json(
            "/api/v1/reports/score",
            json!({
                "document_text": "This introduction sets up the problem. In conclusion we summarize.",
                "domain": "web",
                "guide": { "title": "Mini", "required_sections": ["introduction", "conclusion"] }
            }),
        );
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["guide_title"], "Mini");
        assert_eq!(body["domain"], "web");
        assert_eq!(body["scorer_backend"], "heuristic");
        assert_eq!(body["report"]["structure"]["score"], 100.0);
        assert_eq!(body["report"]["structure"]["sections_missing"], json!([]));
        assert!(body["report_id"].as_str().is_some());
        assert!(body["analyzed_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_score_resolves_catalog_guide_by_domain() {
        let request = post_json(
            "/api/v1/reports/score",
            json!({ "document_text": "Introduction du projet.", "domain": "Mobile" }),
        );
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        let body = read_json(response).await;
        assert_eq!(body["guide_title"], "Guide Structure Mobile Development");
        let missing = body["report"]["structure"]["sections_missing"]
            .as_array()
            .unwrap();
        assert_eq!(missing.len(), 4);
        assert_eq!(missing[0], "methodologie");
    }

    #[tokio::test]
    async fn test_score_unknown_domain_uses_default_guide() {
        let request = post_json(
            "/api/v1/reports/score",
            json!({ "document_text": "Un texte quelconque." }),
        );
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        let body = read_json(response).await;
        assert_eq!(body["domain"], "general");
        assert_eq!(body["guide_title"], "Guide par défaut");
    }

    #[tokio::test]
    async fn test_score_blank_text_gets_neutral_report() {
        let request = post_json("/api/v1/reports/score", json!({ "document_text": "   " }));
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["report"]["quality"]["readability"], 50.0);
        assert_eq!(body["report"]["structure"]["score"], 0.0);
    }

    #[tokio::test]
    async fn test_score_rejects_invalid_guide() {
        let request = post_json(
            "/api/v1/reports/score",
            json!({
                "document_text": "Introduction.",
                "guide": { "required_sections": "introduction" }
            }),
        );
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = read_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_GUIDE");
    }

    #[tokio::test]
    async fn test_scorer_failure_maps_to_500() {
        let state = AppState {
            scorer: Arc::new(FailingScorer),
            ..test_state()
        };
        let request = post_json(
            "/api/v1/reports/score",
            json!({ "document_text": "Introduction." }),
        );
        let response = build_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_upload_scores_text_document_with_guide_file() {
        let guide = br#"{ "required_sections": ["introduction", "conclusion"] }"#;
        let request = multipart_request(&[
            ("domain", None, &b"ai"[..]),
            (
                "document",
                Some("rapport.txt"),
                "Introduction du rapport.\nEn conclusion, tout fonctionne.".as_bytes(),
            ),
            ("guide", Some("mini.json"), &guide[..]),
        ]);
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["domain"], "ai");
        assert_eq!(body["guide_title"], "mini.json");
        assert_eq!(body["report"]["structure"]["compliance_pct"], 100.0);
    }

    #[tokio::test]
    async fn test_upload_of_unreadable_document_scores_placeholder() {
        let garbage = [0u8, 1, 2, 0xFF, 0xFE];
        let request = multipart_request(&[("document", Some("scan.bin"), &garbage[..])]);
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // the placeholder names no section and no technical term
        let body = read_json(response).await;
        assert_eq!(body["report"]["structure"]["score"], 0.0);
        assert_eq!(body["report"]["technical"]["score"], 30.0);
        assert_eq!(body["report"]["technical"]["terms_count"], 0);
    }

    #[tokio::test]
    async fn test_empty_uploaded_document_scores_placeholder() {
        let request = multipart_request(&[("document", Some("vide.pdf"), &b""[..])]);
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["report"]["structure"]["score"], 0.0);
        assert_eq!(body["report"]["technical"]["terms_count"], 0);
    }

    #[tokio::test]
    async fn test_upload_without_document_part_is_rejected() {
        let request = multipart_request(&[("domain", None, &b"web"[..])]);
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("document"));
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_rejected() {
        let state = AppState {
            config: Config {
                max_upload_bytes: 64,
                ..Config::default()
            },
            ..test_state()
        };
        let big = vec![b'a'; 4096];
        let response = build_router(state)
            .oneshot(multipart_request(&[("document", Some("big.txt"), &big[..])]))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_list_guides() {
        let response = build_router(test_state())
            .oneshot(Request::get("/api/v1/guides").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = read_json(response).await;
        let domains: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["domain"].as_str().unwrap())
            .collect();
        assert_eq!(domains, vec!["ai", "mobile", "web"]);
    }

    #[tokio::test]
    async fn test_get_guide_and_not_found() {
        let router = build_router(test_state());
        let response = router
            .clone()
            .oneshot(Request::get("/api/v1/guides/web").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["title"], "Guide Structure Web Development");

        let response = router
            .oneshot(Request::get("/api/v1/guides/robotique").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_validate_guide() {
        let request = post_json(
            "/api/v1/guides/validate",
            json!({
                "title": "Guide IoT",
                "required_sections": ["capteurs"],
                "optional_sections": ["annexes"],
                "weights": { "structure": 1.0, "technical": 1.0, "content": 2.0 }
            }),
        );
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["title"], "Guide IoT");
        assert_eq!(body["required_sections"], json!(["capteurs"]));
        assert_eq!(body["domain"], Value::Null);

        let huge = "a".repeat(2_000_000);
        let oversized = post_json("/api/v1/guides/validate", json!({ "required_sections": [huge] }));
        let response = build_router(test_state()).oneshot(oversized).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bad = post_json("/api/v1/guides/validate", json!(["not", "an", "object"]));
        let response = build_router(test_state()).oneshot(bad).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
