//! Host data sources.
//!
//! The widget never reaches for a global host object. Instead a
//! [`DataSource`] is injected: it answers a synchronous query for the
//! initial payload and delivers [`HostEvent`]s to registered callbacks.
//! Registrations are scoped by a [`Subscription`] guard that unregisters
//! on drop.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{BriefingError, Result};
use crate::payload::BriefingPayload;

/// Name of the host event that carries replacement payloads.
pub const SET_GLOBALS_EVENT: &str = "openai:set_globals";

/// Callback invoked for every host event.
pub type UpdateCallback = Box<dyn FnMut(&HostEvent)>;

/// Raw host event, as dispatched by the host runtime.
///
/// The replacement payload lives at `detail.globals.toolResponseMetadata.ui`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostEvent(pub Value);

/// What a well-formed event asks the renderer to do.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadUpdate {
    /// Replace the current payload.
    Replace(BriefingPayload),
    /// The metadata carried an absent or blank `ui`; go back to loading.
    Clear,
}

impl HostEvent {
    /// Build an event carrying `ui` as its payload.
    pub fn with_payload(ui: Value) -> Self {
        Self(serde_json::json!({
            "type": SET_GLOBALS_EVENT,
            "detail": { "globals": { "toolResponseMetadata": { "ui": ui } } }
        }))
    }

    /// Parse a host event from a JSON line.
    ///
    /// # Errors
    /// Returns a JSON error if `raw` is not valid JSON.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(Self(serde_json::from_str(raw)?))
    }

    /// Extract the payload update.
    ///
    /// # Errors
    /// Returns [`BriefingError::MalformedEvent`] when the nested metadata
    /// object is missing.
    pub fn payload_update(&self) -> Result<PayloadUpdate> {
        let metadata = self
            .0
            .get("detail")
            .and_then(|detail| detail.get("globals"))
            .and_then(|globals| globals.get("toolResponseMetadata"))
            .filter(|metadata| !metadata.is_null())
            .ok_or_else(|| BriefingError::malformed("missing detail.globals.toolResponseMetadata"))?;

        let update = match metadata.get("ui") {
            Some(ui) if !is_blank(ui) => {
                PayloadUpdate::Replace(BriefingPayload::from_value(ui).unwrap_or_default())
            }
            _ => PayloadUpdate::Clear,
        };
        Ok(update)
    }
}

/// Values a host sends to mean "nothing to show": `null`, `false`, zero
/// and the empty string.
fn is_blank(ui: &Value) -> bool {
    match ui {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Injected bridge to the host.
pub trait DataSource {
    /// Payload available synchronously at mount time, if any.
    fn initial_payload(&self) -> Option<BriefingPayload>;

    /// Register `callback` for host events. Dropping the returned guard
    /// unregisters it.
    fn on_update(&self, callback: UpdateCallback) -> Subscription;
}

/// Scoped registration with a [`DataSource`].
#[must_use = "dropping a Subscription unregisters the callback"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Unregister now instead of at drop.
    pub fn cancel(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

type SharedCallback = Rc<RefCell<UpdateCallback>>;

#[derive(Default)]
struct Registry {
    next_id: Cell<u64>,
    listeners: RefCell<IndexMap<u64, SharedCallback>>,
}

/// In-process bridge for single-threaded hosts and tests.
///
/// Listeners are called in registration order. A listener may drop any
/// subscription, including its own, while an event is being dispatched.
#[derive(Default)]
pub struct MemoryBridge {
    initial: RefCell<Option<BriefingPayload>>,
    registry: Rc<Registry>,
}

impl MemoryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(payload: BriefingPayload) -> Self {
        let bridge = Self::new();
        bridge.set_initial(Some(payload));
        bridge
    }

    pub fn set_initial(&self, payload: Option<BriefingPayload>) {
        *self.initial.borrow_mut() = payload;
    }

    /// Deliver `event` to every listener registered when dispatch starts.
    /// Returns how many listeners were called.
    pub fn dispatch(&self, event: &HostEvent) -> usize {
        let snapshot: Vec<(u64, SharedCallback)> = self
            .registry
            .listeners
            .borrow()
            .iter()
            .map(|(id, cb)| (*id, Rc::clone(cb)))
            .collect();

        let mut delivered = 0;
        for (id, callback) in snapshot {
            // Skip listeners unregistered by an earlier callback.
            if !self.registry.listeners.borrow().contains_key(&id) {
                continue;
            }
            if let Ok(mut callback) = callback.try_borrow_mut() {
                (*callback)(event);
                delivered += 1;
            } else {
                tracing::warn!(listener = id, "skipping re-entrant dispatch to busy listener");
            }
        }
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.registry.listeners.borrow().len()
    }
}

impl DataSource for MemoryBridge {
    fn initial_payload(&self) -> Option<BriefingPayload> {
        self.initial.borrow().clone()
    }

    fn on_update(&self, callback: UpdateCallback) -> Subscription {
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id + 1);
        self.registry
            .listeners
            .borrow_mut()
            .insert(id, Rc::new(RefCell::new(callback)));

        let registry: Weak<Registry> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.listeners.borrow_mut().shift_remove(&id);
            }
        })
    }
}

impl<S: DataSource + ?Sized> DataSource for Rc<S> {
    fn initial_payload(&self) -> Option<BriefingPayload> {
        (**self).initial_payload()
    }

    fn on_update(&self, callback: UpdateCallback) -> Subscription {
        (**self).on_update(callback)
    }
}
