//! HTTP request handlers for the extraction API.
//!
//! Implements document submission, result retrieval, paginated listing, and
//! a health check using axum.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use clausier_domain::{
    Clause, ClauseStore, DocumentId, ExtractionMetadata, ExtractionSummary, ModelClient,
};
use clausier_extractor::ingest::PlainTextExtractor;
use clausier_extractor::{ExtractError, ExtractionPipeline, ExtractionRequest};
use clausier_store::SqliteStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Shared application state.
///
/// Generic over the model client so tests can drive the full HTTP surface
/// with a scripted mock.
pub struct AppState<M: ModelClient> {
    /// The extraction pipeline
    pub pipeline: Arc<ExtractionPipeline<M, SqliteStore, PlainTextExtractor>>,
    /// Store handle shared with the pipeline, read directly by the fetch
    /// and list endpoints
    pub store: Arc<Mutex<SqliteStore>>,
    /// Upper bound for the list endpoint's page_size
    pub max_page_size: usize,
}

impl<M: ModelClient> Clone for AppState<M> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            store: Arc::clone(&self.store),
            max_page_size: self.max_page_size,
        }
    }
}

/// Query parameters for document submission
#[derive(Debug, Deserialize)]
pub struct SubmitParams {
    /// Original filename of the uploaded document
    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_filename() -> String {
    "document.txt".to_string()
}

/// Query parameters for the list endpoint
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: usize,
    /// Items per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    10
}

/// Response body for submission and fetch-by-id
#[derive(Debug, Serialize)]
pub struct ExtractionResponse {
    /// The document identifier
    pub document_id: DocumentId,
    /// Run metadata
    pub metadata: ExtractionMetadata,
    /// Extracted clauses in document order
    pub clauses: Vec<Clause>,
}

/// Response body for the list endpoint
#[derive(Debug, Serialize)]
pub struct ListResponse {
    /// Summaries for this page, newest upload first
    pub items: Vec<ExtractionSummary>,
    /// Total number of stored extractions
    pub total: usize,
    /// The page that was served
    pub page: usize,
    /// The page size that was applied (after clamping)
    pub page_size: usize,
    /// Total number of pages at this page size
    pub total_pages: usize,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// The upload could not be read as a supported document
    BadDocument(String),
    /// The upload exceeds the configured size limit
    TooLarge { size: usize, max: usize },
    /// A malformed identifier in the request path
    BadIdentifier(String),
    /// No extraction stored under the requested id
    NotFound(DocumentId),
    /// Internal server error
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadDocument(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::TooLarge { size, max } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("Document is {} bytes, limit is {} bytes", size, max),
            ),
            AppError::BadIdentifier(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("No extraction found for document {}", id),
            ),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::DocumentFormat(inner) => AppError::BadDocument(inner.to_string()),
            ExtractError::DocumentTooLarge { size, max } => AppError::TooLarge { size, max },
            ExtractError::Persistence(msg) | ExtractError::Config(msg) => AppError::Internal(msg),
        }
    }
}

/// POST /api/v1/extract?filename=... - Run extraction on an uploaded document
///
/// The request body is the raw document bytes; the Content-Type header names
/// the format. Blocks until the run reaches a terminal state.
async fn submit_document<M>(
    State(state): State<AppState<M>>,
    Query(params): Query<SubmitParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ExtractionResponse>), AppError>
where
    M: ModelClient,
    M::Error: fmt::Display,
{
    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("text/plain")
        .to_string();

    let request = ExtractionRequest {
        filename: params.filename,
        bytes: body.to_vec(),
        mime_type,
    };

    let extraction = state.pipeline.extract(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ExtractionResponse {
            document_id: extraction.result.document_id,
            metadata: extraction.result.metadata,
            clauses: extraction.result.clauses,
        }),
    ))
}

/// GET /api/v1/extractions/{id} - Fetch a stored extraction result
async fn get_extraction<M>(
    State(state): State<AppState<M>>,
    Path(id): Path<String>,
) -> Result<Json<ExtractionResponse>, AppError>
where
    M: ModelClient,
{
    let document_id = DocumentId::parse(&id).map_err(AppError::BadIdentifier)?;

    let stored = {
        let store = state
            .store
            .lock()
            .map_err(|e| AppError::Internal(format!("store lock poisoned: {}", e)))?;
        store
            .get(&document_id)
            .map_err(|e| AppError::Internal(e.to_string()))?
    };

    let stored = stored.ok_or(AppError::NotFound(document_id))?;

    Ok(Json(ExtractionResponse {
        document_id: stored.result.document_id,
        metadata: stored.result.metadata,
        clauses: stored.result.clauses,
    }))
}

/// GET /api/v1/extractions?page=&page_size= - List stored extractions
///
/// Newest upload first. page_size is clamped to the configured maximum;
/// pages beyond the end return an empty item list.
async fn list_extractions<M>(
    State(state): State<AppState<M>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, AppError>
where
    M: ModelClient,
{
    let page = params.page.max(1);
    let page_size = params.page_size.clamp(1, state.max_page_size);

    let (items, total) = {
        let store = state
            .store
            .lock()
            .map_err(|e| AppError::Internal(format!("store lock poisoned: {}", e)))?;
        store
            .list(page, page_size)
            .map_err(|e| AppError::Internal(e.to_string()))?
    };

    let total_pages = total.div_ceil(page_size);

    Ok(Json(ListResponse {
        items,
        total,
        page,
        page_size,
        total_pages,
    }))
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router<M>(state: AppState<M>) -> AxumRouter
where
    M: ModelClient + 'static,
    M::Error: fmt::Display,
{
    AxumRouter::new()
        .route("/api/v1/extract", post(submit_document::<M>))
        .route("/api/v1/extractions", get(list_extractions::<M>))
        .route("/api/v1/extractions/:id", get(get_extraction::<M>))
        .route("/health", get(health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use clausier_extractor::ExtractorConfig;
    use clausier_model::MockClient;
    use tower::ServiceExt; // for oneshot

    const CONTRACT: &str = "Either party may terminate this agreement with thirty days notice. \
         Payment is due within thirty days of invoice receipt.";

    const MODEL_RESPONSE: &str = r#"[
            {"clause_type": "termination", "title": "Termination",
             "content": "Either party may terminate this agreement with thirty days notice."},
            {"clause_type": "payment", "title": "Payment Terms",
             "content": "Payment is due within thirty days of invoice receipt."}
        ]"#;

    fn create_test_state(model: MockClient) -> AppState<MockClient> {
        let store = Arc::new(Mutex::new(SqliteStore::open_in_memory().unwrap()));
        let pipeline = ExtractionPipeline::new(
            model,
            Arc::clone(&store),
            PlainTextExtractor,
            ExtractorConfig::default(),
        )
        .unwrap();

        AppState {
            pipeline: Arc::new(pipeline),
            store,
            max_page_size: 100,
        }
    }

    fn submit_request(filename: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/v1/extract?filename={}", filename))
            .header("content-type", "text/plain")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state(MockClient::new("[]")));

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_submit_returns_created_with_clauses() {
        let app = create_router(create_test_state(MockClient::new(MODEL_RESPONSE)));

        let response = app
            .oneshot(submit_request("contract.txt", CONTRACT))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = body_json(response).await;
        assert_eq!(json["metadata"]["status"], "completed");
        assert_eq!(json["metadata"]["total_clauses"], 2);
        assert_eq!(json["clauses"][0]["clause_id"], "clause_001");
        assert_eq!(json["clauses"][1]["clause_type"], "payment");
        assert!(json["document_id"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_submit_unsupported_content_type_is_bad_request() {
        let app = create_router(create_test_state(MockClient::new(MODEL_RESPONSE)));

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/extract?filename=contract.pdf")
            .header("content-type", "application/pdf")
            .body(Body::from("binary"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("application/pdf"));
    }

    #[tokio::test]
    async fn test_submit_oversized_upload_is_payload_too_large() {
        let mut state = create_test_state(MockClient::new(MODEL_RESPONSE));
        let mut config = ExtractorConfig::default();
        config.max_file_size_bytes = 8;
        state.pipeline = Arc::new(
            ExtractionPipeline::new(
                MockClient::new(MODEL_RESPONSE),
                Arc::clone(&state.store),
                PlainTextExtractor,
                config,
            )
            .unwrap(),
        );
        let app = create_router(state);

        let response = app
            .oneshot(submit_request("contract.txt", CONTRACT))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_fetch_round_trip() {
        let app = create_router(create_test_state(MockClient::new(MODEL_RESPONSE)));

        let response = app
            .clone()
            .oneshot(submit_request("contract.txt", CONTRACT))
            .await
            .unwrap();
        let submitted = body_json(response).await;
        let id = submitted["document_id"].as_str().unwrap().to_string();

        let request = Request::builder()
            .uri(format!("/api/v1/extractions/{}", id))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let fetched = body_json(response).await;
        assert_eq!(fetched["document_id"], submitted["document_id"]);
        assert_eq!(fetched["clauses"], submitted["clauses"]);
    }

    #[tokio::test]
    async fn test_fetch_unknown_id_is_not_found() {
        let app = create_router(create_test_state(MockClient::new("[]")));

        let request = Request::builder()
            .uri(format!("/api/v1/extractions/{}", DocumentId::new()))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_fetch_malformed_id_is_bad_request() {
        let app = create_router(create_test_state(MockClient::new("[]")));

        let request = Request::builder()
            .uri("/api/v1/extractions/not-a-uuid")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_pagination_and_clamping() {
        let app = create_router(create_test_state(MockClient::new("[]")));

        for i in 0..3 {
            let response = app
                .clone()
                .oneshot(submit_request(&format!("doc{}.txt", i), CONTRACT))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let request = Request::builder()
            .uri("/api/v1/extractions?page=1&page_size=2")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["total"], 3);
        assert_eq!(json["page"], 1);
        assert_eq!(json["page_size"], 2);
        assert_eq!(json["total_pages"], 2);
        assert_eq!(json["items"].as_array().unwrap().len(), 2);

        // page_size beyond the maximum is clamped, not rejected
        let request = Request::builder()
            .uri("/api/v1/extractions?page=1&page_size=9999")
            .body(Body::empty())
            .unwrap();
        let json = body_json(app.clone().oneshot(request).await.unwrap()).await;
        assert_eq!(json["page_size"], 100);

        // pages past the end are empty, not errors
        let request = Request::builder()
            .uri("/api/v1/extractions?page=50&page_size=10")
            .body(Body::empty())
            .unwrap();
        let json = body_json(app.oneshot(request).await.unwrap()).await;
        assert!(json["items"].as_array().unwrap().is_empty());
        assert_eq!(json["total"], 3);
    }

    #[tokio::test]
    async fn test_list_defaults() {
        let app = create_router(create_test_state(MockClient::new("[]")));

        let request = Request::builder()
            .uri("/api/v1/extractions")
            .body(Body::empty())
            .unwrap();
        let json = body_json(app.oneshot(request).await.unwrap()).await;
        assert_eq!(json["page"], 1);
        assert_eq!(json["page_size"], 10);
        assert_eq!(json["total"], 0);
        assert_eq!(json["total_pages"], 0);
    }
}
