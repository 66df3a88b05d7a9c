pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::critique::handlers as critique;
use crate::diagnostics::handlers as diagnostics;
use crate::state::AppState;

/// Largest resume upload accepted, in bytes.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/critique",
            post(critique::handle_critique).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/v1/diagnostics", get(diagnostics::handle_summary))
        .route(
            "/api/v1/diagnostics/connectivity",
            get(diagnostics::handle_connectivity),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::critique::extract::tests::pdf_with_pages;
    use crate::llm_client::mock::MockProvider;

    const BOUNDARY: &str = "critiquer-test-boundary";

    fn state_with(api_key: &str, llm: Arc<MockProvider>) -> AppState {
        let key = api_key.to_string();
        let config = Config::from_lookup(|name| match name {
            "OPENROUTER_API_KEY" => Some(key.clone()),
            _ => None,
        })
        .unwrap();
        AppState { config, llm }
    }

    /// One multipart part: (field name, optional (filename, content type), bytes).
    type Part<'a> = (&'a str, Option<(&'a str, &'a str)>, &'a [u8]);

    fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file {
                Some((filename, content_type)) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                             Content-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                }
                None => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                    );
                }
            }
            body.extend_from_slice(data);
            body.extend_from_slice("\r\n".as_bytes());
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/critique")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state_with("", Arc::new(MockProvider::succeeding("ok"))));
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_critique_text_upload() {
        let llm = Arc::new(MockProvider::succeeding("## Feedback\nGreat start."));
        let app = build_router(state_with("sk-or-v1-abc", llm.clone()));

        let request = multipart_request(&[
            (
                "file",
                Some(("resume.txt", "text/plain")),
                "Jane Doe\nSoftware Engineer\n5 years experience".as_bytes(),
            ),
            ("job_role", None, "Backend Engineer".as_bytes()),
        ]);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["critique"], "## Feedback\nGreat start.");
        assert_eq!(body["role"], "Backend Engineer");
        assert_eq!(body["document_kind"], "plain_text");
        assert_eq!(body["model"], "meta-llama/llama-3.1-8b-instruct");

        let calls = llm.calls();
        assert_eq!(calls.completions.len(), 1);
        assert!(calls.completions[0]
            .1
            .contains("Jane Doe\nSoftware Engineer\n5 years experience"));
    }

    #[tokio::test]
    async fn test_critique_pdf_upload() {
        let llm = Arc::new(MockProvider::succeeding("ok"));
        let app = build_router(state_with("sk-or-v1-abc", llm.clone()));

        let pdf = pdf_with_pages(&["Jane", "Experience"]);
        let request = multipart_request(&[("file", Some(("cv.pdf", "application/pdf")), pdf.as_slice())]);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["document_kind"], "pdf");
        assert_eq!(body["role"], "general job applications");
    }

    #[tokio::test]
    async fn test_critique_without_file_is_empty_input() {
        let llm = Arc::new(MockProvider::succeeding("ok"));
        let app = build_router(state_with("sk-or-v1-abc", llm.clone()));

        let request = multipart_request(&[("job_role", None, "Designer".as_bytes())]);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "EMPTY_INPUT");
        assert_eq!(llm.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_critique_with_empty_file_is_empty_input() {
        let llm = Arc::new(MockProvider::succeeding("ok"));
        let app = build_router(state_with("sk-or-v1-abc", llm.clone()));

        let request = multipart_request(&[("file", Some(("resume.txt", "text/plain")), "".as_bytes())]);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(llm.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_critique_oversized_upload_is_json_error() {
        let llm = Arc::new(MockProvider::succeeding("ok"));
        let app = build_router(state_with("sk-or-v1-abc", llm.clone()));

        let resume = vec![b'a'; 11 * 1024 * 1024];
        let request =
            multipart_request(&[("file", Some(("resume.txt", "text/plain")), resume.as_slice())]);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "INVALID_UPLOAD");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("The upload could not be read"));
        assert_eq!(llm.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_critique_truncated_form_is_json_error() {
        let llm = Arc::new(MockProvider::succeeding("ok"));
        let app = build_router(state_with("sk-or-v1-abc", llm.clone()));

        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"resume.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             Jane Doe"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/critique")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "INVALID_UPLOAD");
        assert_eq!(llm.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_critique_blank_file_is_blank_content() {
        let llm = Arc::new(MockProvider::succeeding("ok"));
        let app = build_router(state_with("sk-or-v1-abc", llm.clone()));

        let request =
            multipart_request(&[("file", Some(("resume.txt", "text/plain")), "   \n".as_bytes())]);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["error"]["code"], "BLANK_CONTENT");
        assert_eq!(llm.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_critique_with_malformed_key() {
        let llm = Arc::new(MockProvider::succeeding("ok"));
        let app = build_router(state_with("abc123", llm.clone()));

        let request =
            multipart_request(&[("file", Some(("resume.txt", "text/plain")), "Jane Doe".as_bytes())]);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "MALFORMED_KEY");
        assert_eq!(
            body["error"]["message"],
            "The OPENROUTER_API_KEY does not look correct. It should start with 'sk-or-'."
        );
        assert_eq!(llm.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_critique_rejected_key_includes_probe() {
        let llm = Arc::new(
            MockProvider::succeeding("unused").with_completion_error(401, "User not found."),
        );
        let app = build_router(state_with("sk-or-v1-revoked", llm.clone()));

        let request =
            multipart_request(&[("file", Some(("resume.txt", "text/plain")), "Jane Doe".as_bytes())]);
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "AUTHENTICATION_ERROR");
        assert_eq!(body["error"]["diagnostics"]["outcome"], "completed");
        assert_eq!(body["error"]["diagnostics"]["status_code"], 401);
        assert_eq!(llm.calls().probes, 1);
    }

    #[tokio::test]
    async fn test_diagnostics_summary() {
        let app = build_router(state_with(
            "sk-or-v1-abcd",
            Arc::new(MockProvider::succeeding("ok")),
        ));
        let response = app.oneshot(get("/api/v1/diagnostics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["key_loaded"], true);
        assert_eq!(body["key_length"], 13);
        assert_eq!(body["key_has_expected_prefix"], true);
        assert_eq!(body["site_url"], "http://localhost:8501");
        assert_eq!(body["model"], "meta-llama/llama-3.1-8b-instruct");
    }

    #[tokio::test]
    async fn test_connectivity_without_key() {
        let llm = Arc::new(MockProvider::succeeding("ok"));
        let app = build_router(state_with("", llm.clone()));
        let response = app
            .oneshot(get("/api/v1/diagnostics/connectivity"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["error"]["code"], "MISSING_KEY");
        assert_eq!(llm.calls().probes, 0);
    }

    #[tokio::test]
    async fn test_connectivity_reports_provider_answer() {
        let llm = Arc::new(MockProvider::succeeding("ok"));
        let app = build_router(state_with("sk-or-v1-abc", llm.clone()));
        let response = app
            .oneshot(get("/api/v1/diagnostics/connectivity"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["outcome"], "completed");
        assert_eq!(body["status_code"], 200);
        assert_eq!(body["body"]["data"], serde_json::json!([]));
        assert_eq!(llm.calls().probes, 1);
    }

    #[tokio::test]
    async fn test_connectivity_unreachable_provider() {
        let llm = Arc::new(MockProvider::succeeding("ok").with_unreachable_probe());
        let app = build_router(state_with("sk-or-v1-abc", llm));
        let response = app
            .oneshot(get("/api/v1/diagnostics/connectivity"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["outcome"], "failed");
        assert!(body["message"].as_str().unwrap().contains("connection refused"));
    }
}
