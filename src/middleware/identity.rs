use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

/// Identity of the caller, established by the upstream auth layer and passed
/// down as an `X-User-Id` header.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

pub async fn identity_middleware(mut request: Request, next: Next) -> Response {
    let user_id = request
        .headers()
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok());

    match user_id {
        Some(id) => {
            request.extensions_mut().insert(CurrentUser(id));
            next.run(request).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Missing or invalid X-User-Id header" })),
        )
            .into_response(),
    }
}
