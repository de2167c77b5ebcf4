use crate::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::Response;

const ALLOW_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Accept";
const ALLOW_METHODS: &str = "POST, GET, PUT, OPTIONS";

/// Decorate responses to allow-listed origins. Never rejects a request.
pub(crate) async fn cors_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .filter(|o| state.options.is_allowed_origin(o))
        .and_then(|o| HeaderValue::from_str(o).ok());

    let mut resp = next.run(req).await;
    if let Some(origin) = origin {
        allow(resp.headers_mut(), origin);
    }
    resp
}

fn allow(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
}
