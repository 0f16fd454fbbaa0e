use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

// Middleware that ensures each request has an X-Request-Id and mirrors it on the response
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let header_name = HeaderName::from_static("x-request-id");

    // If the incoming request already has a request-id, preserve it; otherwise generate one
    let req_id_value = req
        .headers()
        .get(&header_name)
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });

    // Add to request extensions for downstream usage (e.g., logging)
    req.extensions_mut().insert(req_id_value.clone());

    let mut res = next.run(req).await;

    // Add/propagate the request id header to response
    res.headers_mut().insert(header_name, req_id_value);

    res
}

// Observes bearer tokens without enforcing them. The API is open; this
// only records whether a caller presented credentials so operators can
// see who is sending tokens before enforcement is turned on.
pub async fn auth_observer(req: Request<Body>, next: Next) -> Response {
    let has_bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.starts_with("Bearer "))
        .unwrap_or(false);

    if has_bearer {
        tracing::debug!(path = %req.uri().path(), "request carried a bearer token");
    }

    next.run(req).await
}
