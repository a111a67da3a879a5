/*!
 * Bridge Tracing
 * Structured tracing for host calls using the tracing crate
 *
 * Features:
 * - Trace ID per host call for correlating acquisition steps
 * - JSON-formatted logs for structured parsing
 * - Slow-call warnings
 */

use crate::core::limits::SLOW_CALL_THRESHOLD;
use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - BRIDGE_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("BRIDGE_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .init();
        info!("Structured tracing initialized");
    }
}

/// Generate a unique trace ID for request correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one host call into the bridge
pub struct BridgeSpan {
    span: tracing::Span,
    start: Instant,
    call: &'static str,
    trace_id: String,
}

impl BridgeSpan {
    pub fn new(call: &'static str, endpoint: Option<&str>) -> Self {
        let trace_id = generate_trace_id();
        let span = span!(
            Level::DEBUG,
            "bridge_call",
            trace_id = %trace_id,
            call = call,
            endpoint = endpoint.unwrap_or("<absent>"),
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
            status = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            call,
            trace_id,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Enter the span so nested events inherit its fields
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    /// Record the status code handed back to the guest
    pub fn record_status(&self, status: i32) {
        self.span.record("status", status);
        self.span
            .record("result", if status >= 0 { "success" } else { "error" });
    }

    pub fn record_error(&self, error: &str) {
        self.span.record("error", error);
        self.span.record("result", "error");
    }
}

impl Drop for BridgeSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if duration > SLOW_CALL_THRESHOLD {
            warn!(
                trace_id = %self.trace_id,
                call = self.call,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow bridge call"
            );
        } else {
            debug!(
                trace_id = %self.trace_id,
                call = self.call,
                duration_us = duration.as_micros() as u64,
                "bridge call completed"
            );
        }
    }
}

/// Open a span for a bridge call
#[inline]
pub fn span_bridge_call(call: &'static str, endpoint: Option<&str>) -> BridgeSpan {
    BridgeSpan::new(call, endpoint)
}
