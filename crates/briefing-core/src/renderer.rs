//! Briefing renderer: the single state slot and its wiring to a data source.
//!
//! The renderer owns the current payload. It is read once at mount and then
//! replaced wholesale by each well-formed host event. Views are recomputed
//! from the slot on demand.

use chrono::{DateTime, TimeZone};
use std::cell::{Cell, RefCell};
use std::fmt::Display;
use std::rc::Rc;

use crate::config::WidgetConfig;
use crate::error::{BriefingError, Result};
use crate::payload::BriefingPayload;
use crate::source::{DataSource, HostEvent, PayloadUpdate, Subscription};
use crate::view::{render, BriefingView};

type Slot = Rc<RefCell<Option<BriefingPayload>>>;

pub struct BriefingRenderer {
    state: Slot,
    revision: Rc<Cell<u64>>,
    config: WidgetConfig,
    subscription: Option<Subscription>,
    missing_bridge_reported: bool,
}

impl BriefingRenderer {
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(None)),
            revision: Rc::new(Cell::new(0)),
            config,
            subscription: None,
            missing_bridge_reported: false,
        }
    }

    /// Read the initial payload and subscribe to updates.
    ///
    /// Without a source the renderer stays in the loading state for good;
    /// the returned [`BriefingError::MissingBridge`] is informational and
    /// has already been logged.
    ///
    /// # Errors
    /// Returns [`BriefingError::MissingBridge`] when `source` is `None`.
    pub fn mount(&mut self, source: Option<&dyn DataSource>) -> Result<()> {
        let Some(source) = source else {
            if !self.missing_bridge_reported {
                tracing::error!("host bridge is not available; briefing stays in loading state");
                self.missing_bridge_reported = true;
            }
            return Err(BriefingError::MissingBridge);
        };

        self.load_initial_payload(source);
        self.subscribe_to_updates(source);
        Ok(())
    }

    /// Adopt the source's synchronously available payload, if any.
    pub fn load_initial_payload(&self, source: &dyn DataSource) {
        if let Some(payload) = source.initial_payload() {
            tracing::debug!(
                count = payload.count,
                items = payload.assignments.len(),
                "initial briefing payload"
            );
            replace(&self.state, &self.revision, Some(payload));
        } else {
            tracing::debug!("no initial briefing payload; waiting for host update");
        }
    }

    /// Register for host events, replacing any earlier registration.
    pub fn subscribe_to_updates(&mut self, source: &dyn DataSource) {
        // Release the old registration before taking a new one.
        self.subscription = None;

        let state = Rc::clone(&self.state);
        let revision = Rc::clone(&self.revision);
        let subscription = source.on_update(Box::new(move |event: &HostEvent| {
            apply(&state, &revision, event);
        }));
        self.subscription = Some(subscription);
    }

    /// Release the host registration. The current payload is kept.
    pub fn unmount(&mut self) {
        if self.subscription.take().is_some() {
            tracing::debug!("briefing renderer unsubscribed");
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Apply a host event directly, as a subscribed callback would.
    ///
    /// # Errors
    /// Returns [`BriefingError::MalformedEvent`] if the event was ignored.
    pub fn apply_event(&self, event: &HostEvent) -> Result<()> {
        apply_update(&self.state, &self.revision, event)
    }

    /// Current payload, if one has arrived.
    pub fn payload(&self) -> Option<BriefingPayload> {
        self.state.borrow().clone()
    }

    /// Bumped on every state replacement; hosts compare it to decide
    /// whether to re-render.
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    /// Render the current state.
    pub fn view<Tz>(&self, now: &DateTime<Tz>) -> BriefingView
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let state = self.state.borrow();
        tracing::trace!(revision = self.revision.get(), "rendering briefing");
        render(state.as_ref(), now, &self.config)
    }
}

impl Default for BriefingRenderer {
    fn default() -> Self {
        Self::new(WidgetConfig::default())
    }
}

fn replace(state: &Slot, revision: &Cell<u64>, payload: Option<BriefingPayload>) {
    *state.borrow_mut() = payload;
    revision.set(revision.get() + 1);
}

fn apply_update(state: &Slot, revision: &Cell<u64>, event: &HostEvent) -> Result<()> {
    match event.payload_update()? {
        PayloadUpdate::Replace(payload) => replace(state, revision, Some(payload)),
        PayloadUpdate::Clear => replace(state, revision, None),
    }
    Ok(())
}

fn apply(state: &Slot, revision: &Cell<u64>, event: &HostEvent) {
    if let Err(e) = apply_update(state, revision, event) {
        tracing::debug!(error = %e, "ignoring host event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryBridge;
    use chrono::{FixedOffset, Utc};
    use serde_json::json;

    fn clock() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2025-10-16T09:00:00-04:00").unwrap()
    }

    fn payload(count: u64) -> BriefingPayload {
        BriefingPayload {
            count,
            ..BriefingPayload::default()
        }
    }

    #[test]
    fn missing_bridge_stays_loading() {
        let mut renderer = BriefingRenderer::default();
        assert!(matches!(renderer.mount(None), Err(BriefingError::MissingBridge)));
        assert!(matches!(renderer.mount(None), Err(BriefingError::MissingBridge)));
        assert!(renderer.view(&clock()).is_loading());
        assert!(!renderer.is_subscribed());
    }

    #[test]
    fn mount_adopts_initial_payload() {
        let bridge = MemoryBridge::with_initial(payload(4));
        let mut renderer = BriefingRenderer::default();
        renderer.mount(Some(&bridge)).unwrap();

        assert_eq!(renderer.payload().map(|p| p.count), Some(4));
        assert!(!renderer.view(&clock()).is_loading());
        assert_eq!(bridge.listener_count(), 1);
    }

    #[test]
    fn mount_without_initial_payload_waits_for_update() {
        let bridge = MemoryBridge::new();
        let mut renderer = BriefingRenderer::default();
        renderer.mount(Some(&bridge)).unwrap();
        assert!(renderer.view(&clock()).is_loading());

        bridge.dispatch(&HostEvent::with_payload(json!({"count": 1})));
        assert_eq!(renderer.payload().map(|p| p.count), Some(1));
        assert_eq!(renderer.revision(), 1);
    }

    #[test]
    fn updates_replace_wholesale() {
        let bridge = MemoryBridge::new();
        let mut renderer = BriefingRenderer::default();
        renderer.mount(Some(&bridge)).unwrap();

        bridge.dispatch(&HostEvent::with_payload(json!({
            "count": 2,
            "rangeLabel": "this week",
            "assignments": [{"id": 1, "title": "Essay"}]
        })));
        bridge.dispatch(&HostEvent::with_payload(json!({"count": 5})));

        let current = renderer.payload().unwrap();
        assert_eq!(current.count, 5);
        assert_eq!(current.range_label, "soon");
        assert!(current.assignments.is_empty());
    }

    #[test]
    fn malformed_events_leave_state_unchanged() {
        let bridge = MemoryBridge::with_initial(payload(3));
        let mut renderer = BriefingRenderer::default();
        renderer.mount(Some(&bridge)).unwrap();
        let before = renderer.revision();

        bridge.dispatch(&HostEvent(json!({"detail": {"globals": {"theme": "dark"}}})));
        bridge.dispatch(&HostEvent(json!("garbage")));

        assert_eq!(renderer.payload().map(|p| p.count), Some(3));
        assert_eq!(renderer.revision(), before);
        assert!(renderer
            .apply_event(&HostEvent(json!({"detail": null})))
            .is_err());
    }

    #[test]
    fn metadata_without_ui_returns_to_loading() {
        let bridge = MemoryBridge::with_initial(payload(3));
        let mut renderer = BriefingRenderer::default();
        renderer.mount(Some(&bridge)).unwrap();

        bridge.dispatch(&HostEvent(json!({
            "detail": {"globals": {"toolResponseMetadata": {"other": true}}}
        })));
        assert!(renderer.view(&clock()).is_loading());
    }

    #[test]
    fn payload_with_both_item_lists_is_kept() {
        let bridge = MemoryBridge::with_initial(payload(3));
        let mut renderer = BriefingRenderer::default();
        renderer.mount(Some(&bridge)).unwrap();

        bridge.dispatch(&HostEvent::with_payload(json!({
            "count": 2,
            "assignments": [],
            "highPriority": [{"id": 7}]
        })));
        let current = renderer.payload().unwrap();
        assert_eq!(current.count, 2);
        assert!(current.assignments.is_empty());
    }

    #[test]
    fn non_object_ui_renders_with_defaults() {
        let bridge = MemoryBridge::with_initial(payload(3));
        let mut renderer = BriefingRenderer::default();
        renderer.mount(Some(&bridge)).unwrap();

        bridge.dispatch(&HostEvent::with_payload(json!("x")));
        assert_eq!(renderer.payload(), Some(BriefingPayload::default()));
        assert!(!renderer.view(&clock()).is_loading());

        bridge.dispatch(&HostEvent::with_payload(json!(null)));
        assert!(renderer.view(&clock()).is_loading());
    }

    #[test]
    fn unmount_releases_subscription() {
        let bridge = MemoryBridge::new();
        let mut renderer = BriefingRenderer::default();
        renderer.mount(Some(&bridge)).unwrap();
        assert_eq!(bridge.listener_count(), 1);

        renderer.unmount();
        assert_eq!(bridge.listener_count(), 0);

        bridge.dispatch(&HostEvent::with_payload(json!({"count": 9})));
        assert!(renderer.payload().is_none());
    }

    #[test]
    fn dropping_renderer_releases_subscription() {
        let bridge = MemoryBridge::new();
        {
            let mut renderer = BriefingRenderer::default();
            renderer.mount(Some(&bridge)).unwrap();
            assert_eq!(bridge.listener_count(), 1);
        }
        assert_eq!(bridge.listener_count(), 0);
    }

    #[test]
    fn remounting_keeps_a_single_registration() {
        let bridge = MemoryBridge::new();
        let mut renderer = BriefingRenderer::default();
        renderer.mount(Some(&bridge)).unwrap();
        renderer.mount(Some(&bridge)).unwrap();
        assert_eq!(bridge.listener_count(), 1);
    }

    #[test]
    fn view_tracks_latest_payload() {
        let bridge = MemoryBridge::new();
        let mut renderer = BriefingRenderer::default();
        renderer.mount(Some(&bridge)).unwrap();

        let due = clock().with_timezone(&Utc).to_rfc3339();
        bridge.dispatch(&HostEvent::with_payload(json!({
            "count": 1,
            "assignments": [{"id": "q1", "title": "Quiz 2", "type": "Quiz", "dueAt": due}]
        })));

        let view = renderer.view(&clock());
        assert_eq!(view.groups()[0].label, "Today");
        assert_eq!(view.groups()[0].items[0].badge.as_deref(), Some("Quiz"));
    }
}
