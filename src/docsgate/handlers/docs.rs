//! Proxy handlers for the docs service. All of these sit behind the session
//! guard middleware; none of them touch auth state themselves.

use crate::docsgate::{handlers::error_response, service_api::DocsApi, session::INTERNAL_ERROR};
use axum::{
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, instrument};

/// Accept a multipart upload and forward the `file` part to the docs
/// service.
#[instrument(skip_all)]
pub async fn upload(Extension(api): Extension<Arc<DocsApi>>, mut multipart: Multipart) -> Response {
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => return error_response(StatusCode::BAD_REQUEST, "Missing file field"),
            Err(e) => {
                error!("Malformed multipart body: {:?}", e);

                return error_response(StatusCode::BAD_REQUEST, "Malformed upload");
            }
        }
    };

    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let bytes = match field.bytes().await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            error!("Error reading upload body: {:?}", e);

            return error_response(StatusCode::BAD_REQUEST, "Malformed upload");
        }
    };

    forward(api.upload(&file_name, &content_type, bytes).await).await
}

/// Kick off OCR analysis of a stored document.
#[instrument(skip(api))]
pub async fn analyze(Extension(api): Extension<Arc<DocsApi>>, Path(id): Path<u64>) -> Response {
    forward(api.analyze(id).await).await
}

/// Fetch the extracted text of a document.
#[instrument(skip(api))]
pub async fn text(Extension(api): Extension<Arc<DocsApi>>, Path(id): Path<u64>) -> Response {
    forward(api.get_text(id).await).await
}

/// Delete a stored document.
#[instrument(skip(api))]
pub async fn remove(Extension(api): Extension<Arc<DocsApi>>, Path(id): Path<u64>) -> Response {
    forward(api.delete(id).await).await
}

/// Map a docs-service reply onto our response: error statuses surface the
/// upstream `detail` in the error shape, everything else passes through.
async fn forward(result: Result<reqwest::Response, reqwest::Error>) -> Response {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            error!("Docs service unreachable: {:?}", e);

            return error_response(StatusCode::BAD_GATEWAY, INTERNAL_ERROR);
        }
    };

    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);

    if status.is_client_error() || status.is_server_error() {
        let message = body
            .get("detail")
            .and_then(Value::as_str)
            .unwrap_or(INTERNAL_ERROR);

        return error_response(status, message);
    }

    (status, Json(body)).into_response()
}
