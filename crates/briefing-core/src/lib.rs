//! # Briefing Core Library
//!
//! Display layer for the daily briefing widget. A host supplies a payload of
//! assignments; this library groups them by calendar-relative day, formats
//! due times and timestamps, and renders a view model that backends turn into
//! HTML or text.
//!
//! ## Architecture
//!
//! - **Payload**: lenient decoding of host JSON, every field defaulted
//! - **Grouping**: day buckets (`Today`, `Tomorrow`, weekday, full date) in
//!   first-occurrence order
//! - **Source**: injected [`DataSource`] bridge with scoped [`Subscription`]s
//! - **Renderer**: the single payload slot, replaced on each host event
//! - **View**: pure [`render`] function producing a [`BriefingView`]
//!
//! ## Key Components
//!
//! - [`BriefingRenderer`]: mount/unmount lifecycle and state slot
//! - [`MemoryBridge`]: in-process data source
//! - [`WidgetConfig`]: display strings and implicit categories

pub mod config;
pub mod error;
pub mod grouping;
pub mod html;
pub mod payload;
pub mod renderer;
pub mod source;
pub mod time;
pub mod view;

pub use config::WidgetConfig;
pub use error::{BriefingError, ConfigError, Result};
pub use grouping::{day_key, group_by_day, DayBucket, GroupedView};
pub use html::render_markup;
pub use payload::{AssignmentItem, BriefingPayload};
pub use renderer::BriefingRenderer;
pub use source::{DataSource, HostEvent, MemoryBridge, PayloadUpdate, Subscription, UpdateCallback};
pub use view::{render, Body, BriefingView, DayGroupView, ItemView, ReadyView, SummaryLine, UpdatedLine};
