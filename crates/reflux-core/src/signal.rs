//! Signal/slot system for Reflux.
//!
//! Signals are the notification backbone of every observable type in the
//! workspace: collections announce structural changes through them, items
//! announce property changes through them, and projections re-publish both.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`PanicMode`] - How [`Signal::emit_isolated`] treats panicking slots
//!
//! # Delivery
//!
//! Slots connected with [`Signal::connect`] run synchronously on the emitting
//! thread. Slots connected with [`Signal::connect_queued`] are posted to a
//! caller-supplied [`DispatchContext`] and run whenever that context drains
//! its work.
//!
//! Slots are invoked after the connection table lock is released, so a slot
//! may connect, disconnect or emit on the signal that is calling it.
//!
//! # Example
//!
//! ```
//! use reflux_core::Signal;
//!
//! let text_changed = Signal::<String>::new();
//!
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! text_changed.emit("Hello, World!".to_string());
//! text_changed.disconnect(conn_id);
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::context::DispatchContext;
use crate::error::SignalError;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// The ID remains valid until the connection is explicitly disconnected or
    /// the signal is dropped. IDs are only meaningful for the signal that
    /// issued them.
    pub struct ConnectionId;
}

/// How [`Signal::emit_isolated`] reacts to slots that panic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PanicMode {
    /// Log each panic and keep going. The emission always succeeds.
    #[default]
    Swallow,
    /// Keep going, then report every panic as a single
    /// [`SignalError::SlotsPanicked`] once all slots have run.
    Collect,
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Internal storage for a single connection.
struct Connection<Args> {
    slot: Slot<Args>,
    /// Where to post the invocation; `None` invokes directly.
    context: Option<Arc<dyn DispatchContext>>,
}

impl<Args> Clone for Connection<Args> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            context: self.context.clone(),
        }
    }
}

/// A type-safe signal that can have multiple connected slots.
///
/// When a signal is emitted, all connected slots are invoked with the
/// provided arguments, in connection order.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple like `(String, i32)` for multiple arguments.
///
/// # Thread Safety
///
/// `Signal<Args>` is `Send + Sync` and can be shared between threads.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
}

impl<Args: Clone + Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Clone + Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// The slot is invoked directly on whichever thread emits.
    ///
    /// # Example
    ///
    /// ```
    /// use reflux_core::Signal;
    ///
    /// let signal = Signal::<String>::new();
    /// let id = signal.connect(|s| println!("Got: {}", s));
    /// signal.emit("Hello".to_string());
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.insert(Connection {
            slot: Arc::new(slot),
            context: None,
        })
    }

    /// Connect a slot whose invocations are always posted to `context`.
    ///
    /// Arguments are cloned into each posted invocation.
    pub fn connect_queued<F>(&self, slot: F, context: Arc<dyn DispatchContext>) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.insert(Connection {
            slot: Arc::new(slot),
            context: Some(context),
        })
    }

    fn insert(&self, connection: Connection<Args>) -> ConnectionId {
        self.connections.lock().insert(connection)
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Copy the current connections out so slots run without the table lock.
    fn active_connections(&self) -> Vec<Connection<Args>> {
        self.connections.lock().values().cloned().collect()
    }

    /// Emit the signal, invoking all connected slots.
    ///
    /// A panicking slot unwinds through `emit`; use
    /// [`emit_isolated`](Self::emit_isolated) when every slot must run
    /// regardless.
    #[tracing::instrument(skip_all, target = "reflux_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        let connections = self.active_connections();
        tracing::trace!(
            target: targets::SIGNAL,
            connection_count = connections.len(),
            "emitting signal"
        );

        for conn in connections {
            Self::invoke(conn, &args);
        }
    }

    /// Emit the signal, making sure every slot runs even if some panic.
    ///
    /// Queued connections are posted as usual; a panic inside a posted slot
    /// happens later on the context and cannot be observed here.
    pub fn emit_isolated(&self, args: Args, mode: PanicMode) -> Result<(), SignalError> {
        let mut messages = Vec::new();
        for conn in self.active_connections() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| Self::invoke(conn, &args)));
            if let Err(payload) = outcome {
                let message = panic_message(payload.as_ref());
                tracing::warn!(target: targets::SIGNAL, %message, "slot panicked during emit");
                messages.push(message);
            }
        }

        match mode {
            PanicMode::Collect if !messages.is_empty() => Err(SignalError::SlotsPanicked {
                count: messages.len(),
                messages,
            }),
            _ => Ok(()),
        }
    }

    fn invoke(conn: Connection<Args>, args: &Args) {
        match conn.context {
            None => (conn.slot)(args),
            Some(context) => {
                let slot = conn.slot;
                let args = args.clone();
                context.post(Box::new(move || slot(&args)));
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

static_assertions::assert_impl_all!(Signal<i32>: Send, Sync);
static_assertions::assert_impl_all!(Signal<String>: Send, Sync);
