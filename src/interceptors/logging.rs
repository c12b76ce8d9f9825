//! Call logging.
//!
//! A gRPC-aware trace layer at the HTTP level, outermost in the middleware
//! stack so it observes the outcome of the whole chain, authentication
//! rejections included. Every call gets a span carrying the qualified
//! method path, a start event, and exactly one completion event (at
//! end-of-stream for successful calls, at failure classification
//! otherwise) no matter how many messages were streamed in between.

use std::time::Duration;

use http::HeaderMap;
use tower_http::classify::{GrpcErrorsAsFailures, GrpcFailureClass, SharedClassifier};
use tower_http::trace::{DefaultOnBodyChunk, MakeSpan, OnEos, OnFailure, OnRequest, TraceLayer};
use tracing::{info, info_span, warn, Span};

pub type GrpcLoggingLayer = TraceLayer<
    SharedClassifier<GrpcErrorsAsFailures>,
    MakeCallSpan,
    LogCallStart,
    (),
    DefaultOnBodyChunk,
    LogCallEnd,
    LogCallFailure,
>;

/// Build the logging layer.
pub fn grpc_logging_layer() -> GrpcLoggingLayer {
    TraceLayer::new_for_grpc()
        .make_span_with(MakeCallSpan)
        .on_request(LogCallStart)
        .on_response(())
        .on_eos(LogCallEnd)
        .on_failure(LogCallFailure)
}

/// Per-call span named after the qualified method path.
#[derive(Debug, Clone, Copy)]
pub struct MakeCallSpan;

impl<B> MakeSpan<B> for MakeCallSpan {
    fn make_span(&mut self, request: &http::Request<B>) -> Span {
        info_span!("grpc_call", method = %request.uri().path())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LogCallStart;

impl<B> OnRequest<B> for LogCallStart {
    fn on_request(&mut self, _request: &http::Request<B>, _span: &Span) {
        info!("call started");
    }
}

/// Completion event for calls whose stream ended cleanly.
#[derive(Debug, Clone, Copy)]
pub struct LogCallEnd;

impl OnEos for LogCallEnd {
    fn on_eos(self, trailers: Option<&HeaderMap>, stream_duration: Duration, _span: &Span) {
        let code = tonic::Code::from(grpc_status(trailers));
        info!(status = ?code, elapsed = ?stream_duration, "call completed");
    }
}

/// Completion event for calls classified as failed.
#[derive(Debug, Clone, Copy)]
pub struct LogCallFailure;

impl OnFailure<GrpcFailureClass> for LogCallFailure {
    fn on_failure(&mut self, class: GrpcFailureClass, latency: Duration, _span: &Span) {
        let status = match class {
            GrpcFailureClass::Code(code) => format!("{:?}", tonic::Code::from(code.get())),
            GrpcFailureClass::Error(err) => err,
        };
        warn!(status = %status, elapsed = ?latency, "call failed");
    }
}

fn grpc_status(trailers: Option<&HeaderMap>) -> i32 {
    trailers
        .and_then(|t| t.get("grpc-status"))
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}
