//! Core reactive primitives for Reflux.
//!
//! This crate provides the notification plumbing the `reflux` collections and
//! projections are built on:
//!
//! - **Signal/Slot System**: Type-safe, thread-safe change notification
//! - **Property System**: Values with change detection and named change events
//! - **Dispatch Contexts**: Caller-owned places to run posted callbacks
//! - **Logging**: Tracing targets, a tree renderer and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use reflux_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Dispatch Example
//!
//! ```
//! use std::sync::Arc;
//! use reflux_core::{Signal, TaskQueue};
//!
//! let queue = Arc::new(TaskQueue::new());
//! let signal = Signal::<i32>::new();
//! signal.connect_queued(|v| println!("delivered later: {v}"), queue.clone());
//!
//! signal.emit(1);
//! assert_eq!(queue.process_all(), 1);
//! ```

pub mod context;
mod error;
pub mod logging;
pub mod property;
pub mod signal;

pub use context::{DispatchContext, Task, TaskQueue};
pub use error::{Result, SignalError};
pub use logging::{PerfSpan, TreeFormatOptions, TreeFormatter, TreeNode, TreeStyle};
pub use property::{NotifyPropertyChanged, Property, PropertyChange};
pub use signal::{ConnectionId, PanicMode, Signal};
