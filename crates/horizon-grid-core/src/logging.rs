//! Logging and tracing facilities for Horizon Grid.
//!
//! This module provides target names for filtering grid instrumentation and
//! performance spans for profiling pipeline runs.
//!
//! # Tracing Integration
//!
//! Horizon Grid uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_grid::pipeline=debug")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_grid_core::signal";
    /// Grid engine commands and pipeline runs.
    pub const PIPELINE: &str = "horizon_grid::pipeline";
    /// Selection bookkeeping.
    pub const SELECTION: &str = "horizon_grid::selection";
    /// Viewport geometry and visible range computation.
    pub const VIEWPORT: &str = "horizon_grid::viewport";
    /// Column registry mutations.
    pub const COLUMN: &str = "horizon_grid::column";
    /// Grid registry lifecycle.
    pub const REGISTRY: &str = "horizon_grid::registry";
    /// Configuration loading and validation.
    pub const CONFIG: &str = "horizon_grid::config";
    /// Performance spans.
    pub const PERF: &str = "horizon_grid::perf";
}

/// Guard for performance tracing.
///
/// When created, starts a tracing span. When dropped, the span ends.
/// Use this to measure the duration of operations.
///
/// # Example
///
/// ```ignore
/// use horizon_grid_core::logging::PerfSpan;
///
/// fn run_pipeline() {
///     let _span = PerfSpan::new("run_pipeline");
///     // ... work ...
/// } // Span automatically ends here
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }

    /// Create a performance span that also records the number of input rows.
    pub fn with_rows(name: &'static str, rows: usize) -> Self {
        let span =
            tracing::info_span!(target: targets::PERF, "perf", operation = name, rows);
        Self {
            span: span.entered(),
        }
    }
}
