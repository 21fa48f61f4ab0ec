//! HTML backend for [`BriefingView`].

use maud::{html, Markup};

use crate::view::{Body, BriefingView, DayGroupView, ItemView, ReadyView};

/// Render the widget markup. Text is escaped by maud.
pub fn render_markup(view: &BriefingView) -> Markup {
    html! {
        div.briefing-container {
            @match view {
                BriefingView::Loading { message } => {
                    div.loading-state {
                        div.spinner {}
                        p { (message) }
                    }
                }
                BriefingView::Ready(ready) => {
                    (render_ready(ready))
                }
            }
        }
    }
}

fn render_ready(ready: &ReadyView) -> Markup {
    html! {
        header {
            h3 { (ready.heading) }
            @if let Some(updated) = &ready.updated {
                p.timestamp title=(updated.absolute) { (updated.text()) }
            }
        }
        div.summary-card {
            div.count { (ready.summary.count) }
            div.label { (ready.summary.label()) }
        }
        @match &ready.body {
            Body::Empty { message } => {
                div.empty-state { (message) }
            }
            Body::Groups { groups } => {
                @for group in groups {
                    (render_group(group))
                }
            }
        }
    }
}

fn render_group(group: &DayGroupView) -> Markup {
    html! {
        section.day-group {
            h4.day-label { (group.label) }
            ul.assignment-list {
                @for item in &group.items {
                    li data-key=(item.key) { (render_item(item)) }
                }
            }
        }
    }
}

fn render_item(item: &ItemView) -> Markup {
    let content = html! {
        div.assignment-info {
            @if let Some(badge) = &item.badge {
                span.badge { (badge) }
            }
            span.title { (item.title) }
            @if !item.course.is_empty() {
                span.course { (item.course) }
            }
        }
        div.due-date { (item.due) }
    };

    html! {
        @if let Some(href) = &item.href {
            a.assignment-row href=(href) target="_blank" rel="noopener noreferrer" { (content) }
        } @else {
            div.assignment-row { (content) }
        }
    }
}
