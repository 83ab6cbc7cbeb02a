use axum::{
    extract::{Query, Request},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::domain::role::RoleToken;
use crate::usecase::error::UsecaseError;

#[derive(Deserialize)]
struct RoleQuery {
    role: Option<String>,
}

/// Parses `?role=` into a [`RoleToken`] extension. Resolution against the
/// database happens in the handlers, which know whether to provision members.
pub async fn role_middleware(mut request: Request, next: Next) -> Result<Response, UsecaseError> {
    let raw = Query::<RoleQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(q)| q.role)
        .filter(|r| !r.trim().is_empty());

    let Some(raw) = raw else {
        tracing::warn!(path = %request.uri().path(), "missing role parameter");
        return Err(UsecaseError::Unauthorized);
    };

    let token: RoleToken = raw.parse().map_err(|e| {
        tracing::warn!(role = %raw, error = %e, "malformed role parameter");
        UsecaseError::MalformedRole(e)
    })?;

    tracing::debug!(role = %token, "role parsed");
    request.extensions_mut().insert(token);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::StatusCode,
        middleware,
        routing::get,
        Extension, Router,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/echo/", get(|Extension(token): Extension<RoleToken>| async move { token.to_string() }))
            .layer(middleware::from_fn(role_middleware))
    }

    async fn call(uri: &str) -> (StatusCode, String) {
        let response = app()
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_valid_role_reaches_handler() {
        let (status, body) = call("/echo/?role=hku:member:u1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "HKU:member:u1");
    }

    #[tokio::test]
    async fn test_missing_role_is_unauthorized() {
        for uri in ["/echo/", "/echo/?role=", "/echo/?other=1"] {
            let (status, body) = call(uri).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert!(body.contains("\"error\":\"unauthorized\""));
        }
    }

    #[tokio::test]
    async fn test_malformed_role_is_rejected() {
        for uri in ["/echo/?role=hku", "/echo/?role=hku:admin:1", "/echo/?role=hku:member", "/echo/?role=hku:specialist:abc"] {
            let (status, body) = call(uri).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert!(body.contains("malformed_role"), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_specialist_without_identity_is_accepted() {
        let (status, body) = call("/echo/?role=CU:specialist").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "CU:specialist");
    }
}
