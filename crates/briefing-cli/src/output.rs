//! Output backends for rendered views.

use briefing_core::{render_markup, Body, BriefingView, DayGroupView, ReadyView};
use clap::ValueEnum;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Html,
    Json,
}

pub fn format_view(view: &BriefingView, format: Format) -> Result<String, serde_json::Error> {
    Ok(match format {
        Format::Text => render_text(view),
        Format::Html => render_markup(view).into_string(),
        Format::Json => serde_json::to_string(view)?,
    })
}

pub fn print_view(view: &BriefingView, format: Format) -> Result<(), serde_json::Error> {
    let out = format_view(view, format)?;
    println!("{}", out.trim_end());
    Ok(())
}

/// Plain-text rendering for terminals.
pub fn render_text(view: &BriefingView) -> String {
    match view {
        BriefingView::Loading { message } => format!("{message}\n"),
        BriefingView::Ready(ready) => ready_text(ready),
    }
}

fn ready_text(ready: &ReadyView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", ready.heading);
    if let Some(updated) = &ready.updated {
        let _ = writeln!(out, "{} ({})", updated.text(), updated.absolute);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", ready.summary.text());

    match &ready.body {
        Body::Empty { message } => {
            let _ = writeln!(out);
            let _ = writeln!(out, "{message}");
        }
        Body::Groups { groups } => {
            for group in groups {
                group_text(&mut out, group);
            }
        }
    }
    out
}

fn group_text(out: &mut String, group: &DayGroupView) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", group.label);
    for item in &group.items {
        let mut line = String::from("  - ");
        if let Some(badge) = &item.badge {
            let _ = write!(line, "[{badge}] ");
        }
        line.push_str(&item.title);
        if !item.course.is_empty() {
            let _ = write!(line, " ({})", item.course);
        }
        if !item.due.is_empty() {
            let _ = write!(line, "  {}", item.due);
        }
        let _ = writeln!(out, "{line}");
        if let Some(href) = &item.href {
            let _ = writeln!(out, "      {href}");
        }
    }
}
