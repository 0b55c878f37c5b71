use crate::MsgKind;
use std::sync::{Arc, Mutex, MutexGuard};

/// Consumer-side callback interface.
///
/// All methods default to no-ops, so a listener only implements the
/// deliveries it cares about. Whatever consumer context used to travel
/// as an opaque token is simply state captured by the listener value;
/// the controller never looks inside it.
pub trait CameraListener: Send + Sync {
    /// Event notification (shutter, focus result, ...).
    fn on_notify(&self, kind: MsgKind, ext1: i32, ext2: i32) {
        let _ = (kind, ext1, ext2);
    }

    /// Frame or image data delivery.
    fn on_data(&self, kind: MsgKind, data: &[u8]) {
        let _ = (kind, data);
    }

    /// Timestamped data delivery (nanoseconds, monotonic).
    fn on_data_timestamp(&self, timestamp_ns: i64, kind: MsgKind, data: &[u8]) {
        let _ = (timestamp_ns, kind, data);
    }
}

struct DispatchState {
    listener: Option<Arc<dyn CameraListener>>,
    enabled: MsgKind,
}

/// Holds the registered listener and the enabled-message mask, and
/// performs masked dispatch.
///
/// The mask is consulted on every dispatch, so enable/disable takes
/// immediate effect on subsequent deliveries. Callbacks run outside the
/// internal lock; a listener may re-enter `enable`/`disable` freely.
pub struct CallbackDispatcher {
    state: Mutex<DispatchState>,
}

impl CallbackDispatcher {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DispatchState {
                listener: None,
                enabled: MsgKind::empty(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DispatchState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the listener slot atomically.
    pub fn set_callbacks(&self, listener: Option<Arc<dyn CameraListener>>) {
        self.lock().listener = listener;
    }

    /// Enable delivery of the given message kinds.
    pub fn enable(&self, kinds: MsgKind) {
        self.lock().enabled.insert(kinds);
    }

    /// Disable delivery of the given message kinds.
    pub fn disable(&self, kinds: MsgKind) {
        self.lock().enabled.remove(kinds);
    }

    pub fn is_enabled(&self, kind: MsgKind) -> bool {
        self.lock().enabled.contains(kind)
    }

    fn target(&self, kind: MsgKind) -> Option<Arc<dyn CameraListener>> {
        let state = self.lock();
        if state.enabled.contains(kind) {
            state.listener.clone()
        } else {
            None
        }
    }

    /// Deliver an event notification if `kind` is enabled.
    ///
    /// No registered listener or a disabled kind is a silent no-op.
    pub fn dispatch_notify(&self, kind: MsgKind, ext1: i32, ext2: i32) {
        if let Some(listener) = self.target(kind) {
            listener.on_notify(kind, ext1, ext2);
        }
    }

    /// Deliver frame/image data if `kind` is enabled.
    pub fn dispatch_data(&self, kind: MsgKind, data: &[u8]) {
        if let Some(listener) = self.target(kind) {
            listener.on_data(kind, data);
        }
    }

    /// Deliver timestamped data if `kind` is enabled.
    pub fn dispatch_data_timestamp(&self, timestamp_ns: i64, kind: MsgKind, data: &[u8]) {
        if let Some(listener) = self.target(kind) {
            listener.on_data_timestamp(timestamp_ns, kind, data);
        }
    }
}

impl Default for CallbackDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
