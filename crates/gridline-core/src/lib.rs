//! Core systems for Gridline.
//!
//! This crate provides the pieces of the Gridline widget layer that do not
//! depend on drawing:
//!
//! - **Signal/Slot System**: Type-safe notifications from widgets
//! - **Timers**: One-shot and repeating timers driven by an explicit clock
//! - **Clocks**: Real and manual time sources, so input timing is testable
//! - **Logging**: `tracing` targets and span helpers
//!
//! # Timer Example
//!
//! ```
//! use std::time::Duration;
//! use gridline_core::{Clock, ManualClock, TimerManager};
//!
//! let clock = ManualClock::new();
//! let mut timers = TimerManager::new();
//! let id = timers.start_one_shot(clock.now(), Duration::from_millis(250));
//!
//! clock.advance_ms(250);
//! assert_eq!(timers.process_expired(clock.now()), vec![id]);
//! ```

mod clock;
mod error;
pub mod logging;
pub mod signal;
mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, Result, TimerError};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
pub use timer::{TimerId, TimerKind, TimerManager};
