pub mod completions;
pub mod config;
pub mod group;
pub mod render;
pub mod watch;

use briefing_core::{time, BriefingPayload, Result, WidgetConfig};
use chrono::{DateTime, FixedOffset, Local};
use std::io::Read;
use std::path::Path;

/// Viewer clock: `--now` if given, else the local time.
pub fn clock(now: Option<&str>) -> Result<DateTime<FixedOffset>> {
    match now {
        Some(raw) => time::parse_clock(raw),
        None => Ok(Local::now().fixed_offset()),
    }
}

/// Read a file, or stdin for `None` / `-`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Decode a payload file. Anything that is not a JSON object counts as
/// "no payload yet".
pub fn read_payload(path: Option<&Path>) -> Result<Option<BriefingPayload>> {
    let raw = read_input(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let payload = BriefingPayload::from_value(&value);
    if payload.is_none() {
        tracing::warn!("payload is not a JSON object; treating it as absent");
    }
    Ok(payload)
}

pub fn load_config() -> WidgetConfig {
    WidgetConfig::load_or_default()
}
