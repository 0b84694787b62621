/*!
 * Monitoring
 * Structured logging bootstrap for binaries and benchmarks
 */

mod tracer;

pub use tracer::{init_tracing, micros_field, millis_field, TRACE_JSON_ENV};
