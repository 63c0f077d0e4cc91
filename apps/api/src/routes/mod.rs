pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

/// Multipart uploads carry several documents at once.
const UPLOAD_BODY_LIMIT: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job description
        .route(
            "/api/v1/job-description",
            get(handlers::handle_get_job).post(handlers::handle_submit_job),
        )
        .route(
            "/api/v1/job-description/analyze",
            post(handlers::handle_analyze_jd),
        )
        // Resumes
        .route(
            "/api/v1/resumes",
            get(handlers::handle_list_resumes)
                .post(handlers::handle_upload_resumes)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Rankings
        .route("/api/v1/rankings", get(handlers::handle_get_rankings))
        .route(
            "/api/v1/rankings/toggle-sort",
            post(handlers::handle_toggle_sort),
        )
        .route(
            "/api/v1/rankings/:resume_id",
            get(handlers::handle_select),
        )
        // Detail view selection
        .route("/api/v1/selection", delete(handlers::handle_back))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt; // for oneshot

    use super::*;
    use crate::analysis::jd_analyzer::HeuristicJdAnalyzer;
    use crate::config::Config;
    use crate::test_utils::ContentStrategy;

    const BOUNDARY: &str = "resume-rank-boundary";

    fn test_state() -> AppState {
        AppState::new(
            Config::default(),
            Arc::new(HeuristicJdAnalyzer),
            ContentStrategy::engine(&[]),
        )
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn multipart_request(files: &[(&str, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, content_type) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n\
                 %PDF-1.4 test\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri("/api/v1/resumes")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_backends() {
        let app = build_router(test_state());
        let (status, body) = send(&app, empty_request("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["analyzer"], "heuristic");
    }

    #[tokio::test]
    async fn test_analyze_preview_does_not_install_job() {
        let app = build_router(test_state());
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/job-description/analyze",
                json!({"text": "Looking for a Python developer with 3 years experience"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["sections"].as_array().unwrap().is_empty());

        let (status, body) = send(&app, empty_request("GET", "/api/v1/job-description")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_empty_job_description_is_bad_request() {
        let app = build_router(test_state());
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/job-description",
                json!({"title": "Dev", "description": "   "}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "EMPTY_INPUT");
    }

    #[tokio::test]
    async fn test_unsupported_upload_is_rejected() {
        let app = build_router(test_state());
        let (status, body) = send(&app, multipart_request(&[("photo.png", "image/png")])).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "INVALID_FILE_TYPE");
    }

    #[tokio::test]
    async fn test_unknown_selection_is_not_found() {
        let app = build_router(test_state());
        for id in ["nope", "selection"] {
            let (status, body) = send(
                &app,
                empty_request("GET", &format!("/api/v1/rankings/{id}")),
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"]["code"], "NOT_FOUND");
        }
    }

    #[tokio::test]
    async fn test_upload_score_rank_select_flow() {
        let app = build_router(test_state());

        // Uploading before a JD stores resumes without scoring them.
        let (status, body) = send(
            &app,
            multipart_request(&[
                ("alice.pdf", "application/pdf"),
                ("bob.docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accepted"].as_array().unwrap().len(), 2);
        assert!(body["outcome"].is_null());

        let (_, rankings) = send(&app, empty_request("GET", "/api/v1/rankings")).await;
        assert!(rankings["entries"].as_array().unwrap().is_empty());

        // Submitting the JD re-scores everything.
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/job-description",
                json!({
                    "title": "Python Developer",
                    "company": "Acme",
                    "description": "Looking for a Python developer with 3 years experience",
                    "skills": "Python, Django",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jobDescription"]["skills"], json!(["Python", "Django"]));
        assert_eq!(body["outcome"]["scored"], 2);

        let (_, rankings) = send(&app, empty_request("GET", "/api/v1/rankings")).await;
        let entries = rankings["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(rankings["direction"], "descending");
        assert_eq!(rankings["analyzing"], false);
        let first_id = entries[0]["score"]["resumeId"].as_str().unwrap().to_string();

        // A late upload merges into the existing ranking.
        let (status, body) = send(&app, multipart_request(&[("carol.pdf", "application/pdf")])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["scored"], 1);

        let (_, rankings) = send(&app, empty_request("POST", "/api/v1/rankings/toggle-sort")).await;
        assert_eq!(rankings["direction"], "ascending");
        assert_eq!(rankings["entries"].as_array().unwrap().len(), 3);

        // Detail view.
        let (status, detail) = send(
            &app,
            empty_request("GET", &format!("/api/v1/rankings/{first_id}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["score"]["resumeId"], first_id.as_str());
        assert_eq!(detail["matchLabel"], "Low Match");
        assert_eq!(
            detail["score"]["evaluationDetails"].as_array().unwrap().len(),
            4
        );

        let (_, rankings) = send(&app, empty_request("GET", "/api/v1/rankings")).await;
        assert_eq!(rankings["selectedResumeId"], first_id.as_str());

        let (status, _) = send(&app, empty_request("DELETE", "/api/v1/selection")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, rankings) = send(&app, empty_request("GET", "/api/v1/rankings")).await;
        assert!(rankings["selectedResumeId"].is_null());
    }
}
