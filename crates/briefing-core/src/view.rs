//! View model for the briefing widget.
//!
//! [`render`] is a pure function of the current payload, the clock and the
//! configuration. Backends (HTML, plain text, JSON) only walk the result.

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fmt::Display;

use crate::config::WidgetConfig;
use crate::grouping::group_by_day;
use crate::payload::{AssignmentItem, BriefingPayload};
use crate::time::{absolute, due_time, from_now};

const SUMMARY_NOUN: &str = "assignment";
const ALLOWED_LINK_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Complete widget output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BriefingView {
    /// No payload has arrived yet.
    Loading { message: String },
    Ready(ReadyView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadyView {
    pub heading: String,
    pub updated: Option<UpdatedLine>,
    pub summary: SummaryLine,
    pub body: Body,
}

/// "Updated 3 hours ago", with the absolute time as detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatedLine {
    pub relative: String,
    pub absolute: String,
}

impl UpdatedLine {
    pub fn text(&self) -> String {
        format!("Updated {}", self.relative)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryLine {
    pub count: u64,
    pub noun: String,
    pub range_label: String,
}

impl SummaryLine {
    pub fn new(count: u64, range_label: impl Into<String>) -> Self {
        Self {
            count,
            noun: pluralize(SUMMARY_NOUN, count),
            range_label: range_label.into(),
        }
    }

    /// Label shown next to the count, e.g. `assignments due this week`.
    pub fn label(&self) -> String {
        format!("{} due {}", self.noun, self.range_label)
    }

    pub fn text(&self) -> String {
        format!("{} {}", self.count, self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Body {
    Empty { message: String },
    Groups { groups: Vec<DayGroupView> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroupView {
    pub label: String,
    pub items: Vec<ItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    /// Stable list key.
    pub key: String,
    pub badge: Option<String>,
    pub title: String,
    pub course: String,
    pub due: String,
    /// Link target, present only for allowed schemes.
    pub href: Option<String>,
}

/// `noun` with a trailing "s" unless `count` is exactly one.
pub fn pluralize(noun: &str, count: u64) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{noun}s")
    }
}

/// Validate an outbound link. Relative and script URLs are dropped.
pub fn safe_href(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw.trim()).ok()?;
    ALLOWED_LINK_SCHEMES
        .contains(&parsed.scheme())
        .then(|| parsed.as_str().to_string())
}

/// Render the widget for the current state.
pub fn render<Tz>(
    payload: Option<&BriefingPayload>,
    now: &DateTime<Tz>,
    config: &WidgetConfig,
) -> BriefingView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(payload) = payload else {
        return BriefingView::Loading {
            message: config.display.loading_message.clone(),
        };
    };

    let updated = payload.generated_at.map(|at| UpdatedLine {
        relative: from_now(&at, now),
        absolute: absolute(&at, now),
    });

    let body = if payload.assignments.is_empty() {
        Body::Empty {
            message: config.display.empty_message.clone(),
        }
    } else {
        let groups = group_by_day(&payload.assignments, now)
            .into_iter()
            .map(|(label, items)| DayGroupView {
                label,
                items: items
                    .into_iter()
                    .map(|item| item_view(item, now, config))
                    .collect(),
            })
            .collect();
        Body::Groups { groups }
    };

    BriefingView::Ready(ReadyView {
        heading: config.display.heading.clone(),
        updated,
        summary: SummaryLine::new(payload.count, payload.range_label.clone()),
        body,
    })
}

fn item_view<Tz>(item: &AssignmentItem, now: &DateTime<Tz>, config: &WidgetConfig) -> ItemView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let due = item
        .due_at_display
        .clone()
        .or_else(|| item.due_at.map(|at| due_time(&at, now)))
        .unwrap_or_default();

    ItemView {
        key: item.id.clone(),
        badge: item
            .category
            .as_deref()
            .filter(|category| !config.is_implicit_category(category))
            .map(str::to_string),
        title: item.title.clone(),
        course: item.course.clone(),
        due,
        href: item.url.as_deref().and_then(safe_href),
    }
}

impl BriefingView {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn groups(&self) -> &[DayGroupView] {
        match self {
            Self::Ready(ReadyView {
                body: Body::Groups { groups },
                ..
            }) => groups,
            _ => &[],
        }
    }
}
