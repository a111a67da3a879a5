/*!
 * Monitoring
 * Structured tracing for bridge entry points
 */

mod tracer;

pub use tracer::{generate_trace_id, init_tracing, span_bridge_call, BridgeSpan};
