//! `x-request-id` handling: generate when absent, expose to handlers, and
//! stamp it on the per-request tracing span.

use std::time::Duration;

use axum::http::{HeaderName, Request, Response as HttpResponse};
use axum::{body::Body, middleware::Next, response::Response};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::request_id::{MakeRequestId, RequestId as TowerRequestId};
use tower_http::trace::{MakeSpan, OnResponse, TraceLayer};
use tracing::{field::Empty, Span};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id as seen by handlers (`Extension<RequestId>`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

pub fn header() -> HeaderName {
    HeaderName::from_static(REQUEST_ID_HEADER)
}

/// Short url-safe ids; clients may send their own instead.
#[derive(Clone, Copy, Default)]
pub struct NanoIdGen;

impl MakeRequestId for NanoIdGen {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<TowerRequestId> {
        nanoid::nanoid!(16).parse().ok().map(TowerRequestId::new)
    }
}

fn id_from<B>(req: &Request<B>) -> &str {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

pub async fn expose_to_handlers(mut req: Request<Body>, next: Next) -> Response {
    let id = RequestId(id_from(&req).to_owned());
    req.extensions_mut().insert(id);
    next.run(req).await
}

#[derive(Clone, Copy)]
pub struct HttpSpan;

impl MakeSpan<Body> for HttpSpan {
    fn make_span(&mut self, req: &Request<Body>) -> Span {
        tracing::info_span!(
            "http",
            method = %req.method(),
            path = %req.uri().path(),
            request_id = %id_from(req),
            status = Empty,
            latency_ms = Empty,
        )
    }
}

#[derive(Clone, Copy)]
pub struct RecordOutcome;

impl<B> OnResponse<B> for RecordOutcome {
    fn on_response(self, resp: &HttpResponse<B>, latency: Duration, span: &Span) {
        span.record("status", resp.status().as_u16());
        span.record("latency_ms", latency.as_millis() as u64);
        tracing::debug!(parent: span, "request finished");
    }
}

pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, HttpSpan, (), RecordOutcome> {
    TraceLayer::new_for_http()
        .make_span_with(HttpSpan)
        .on_request(())
        .on_response(RecordOutcome)
}
