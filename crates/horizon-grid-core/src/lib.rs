//! Core systems for Horizon Grid.
//!
//! This crate provides the framework-level building blocks the grid engine
//! is assembled from, independent of any grid semantics:
//!
//! - **Signal/Slot System**: Type-safe, synchronous change notification
//! - **Logging**: Tracing targets, span names and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! // Create a signal that notifies when a page changes
//! let page_changed = Signal::<usize>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = page_changed.connect(|page| {
//!     println!("Now on page {}", page);
//! });
//!
//! // Emit the signal
//! page_changed.emit(2);
//!
//! // Disconnect when done
//! page_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
