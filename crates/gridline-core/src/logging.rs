//! Logging facilities for Gridline.
//!
//! Gridline uses the `tracing` crate for instrumentation. Nothing is printed
//! unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("gridline=debug,gridline_core::timer=trace")
//!     .init();
//! ```

/// Span names used throughout Gridline for tracing.
///
/// Timer and signal processing are instrumented under their [`targets`].
pub mod span_names {
    /// Polled table refresh cycle span.
    pub const REFRESH: &str = "table_refresh";
    /// Table draw span.
    pub const DRAW: &str = "table_draw";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "gridline_core";
    /// Timer system target.
    pub const TIMER: &str = "gridline_core::timer";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "gridline_core::signal";
    /// Table widget target.
    pub const TABLE: &str = "gridline::table";
}

/// A guard that records how long an operation took.
///
/// The span is entered on creation and closed when the guard drops, so a
/// subscriber with span timing enabled reports the elapsed time.
///
/// ```ignore
/// let _perf = PerfSpan::new(span_names::DRAW);
/// // ... work ...
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "gridline::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

impl std::fmt::Debug for PerfSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerfSpan").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_are_namespaced() {
        assert!(targets::TIMER.starts_with(targets::CORE));
        assert!(targets::SIGNAL.starts_with(targets::CORE));
    }

    #[test]
    fn test_perf_span_without_subscriber() {
        let _draw = PerfSpan::new(span_names::DRAW);
        let _refresh = PerfSpan::new(span_names::REFRESH);
    }
}
