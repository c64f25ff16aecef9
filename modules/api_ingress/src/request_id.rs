use axum::http::{HeaderName, Request};
use axum::{
    body::Body,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::field::Empty;

use crate::error::ErrorResponse;

/// Request id as seen by handlers, taken from the `x-request-id` header.
#[derive(Clone, Debug)]
pub struct XRequestId(pub String);

pub fn header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

#[derive(Clone, Default)]
pub struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = nanoid::nanoid!();
        Some(RequestId::new(id.parse().ok()?))
    }
}

fn request_id_of<B>(req: &Request<B>) -> Option<&str> {
    req.headers().get(header()).and_then(|v| v.to_str().ok())
}

/// Stores the request id in request extensions and records it on the current span.
///
/// Error responses built from [`crate::AppError`] get the id added to their JSON body.
pub async fn push_req_id_to_extensions(mut req: Request<Body>, next: Next) -> Response {
    let rid = request_id_of(&req).map(str::to_owned);
    let shown = rid.as_deref().unwrap_or("n/a");

    req.extensions_mut().insert(XRequestId(shown.to_owned()));
    tracing::Span::current().record("request_id", tracing::field::display(shown));

    let mut response = next.run(req).await;
    match (response.extensions_mut().remove::<ErrorResponse>(), rid) {
        (Some(body), Some(rid)) => {
            let (parts, _) = response.into_parts();
            let body = ErrorResponse {
                request_id: Some(rid),
                ..body
            };
            (parts, Json(body)).into_response()
        }
        _ => response,
    }
}

#[allow(clippy::type_complexity)]
pub fn create_trace_layer() -> tower_http::trace::TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
    impl Fn(&Request<Body>) -> tracing::Span + Clone,
> {
    use tower_http::trace::TraceLayer;

    TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        let rid = request_id_of(req).unwrap_or("n/a");
        tracing::info_span!(
            "http_request",
            method = %req.method(),
            uri = %req.uri().path(),
            version = ?req.version(),
            request_id = %rid,
            status = Empty,
            latency_ms = Empty
        )
    })
}
