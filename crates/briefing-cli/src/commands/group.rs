use briefing_core::group_by_day;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct GroupArgs {
    /// Payload JSON file ("-" or omitted for stdin)
    payload: Option<PathBuf>,
    /// Current time as RFC 3339; its offset is the display time zone
    #[arg(long)]
    now: Option<String>,
}

#[derive(Serialize)]
struct GroupEntry<'a> {
    label: &'a str,
    ids: Vec<&'a str>,
}

pub fn run(args: GroupArgs) -> Result<(), Box<dyn std::error::Error>> {
    let now = super::clock(args.now.as_deref())?;
    let payload = super::read_payload(args.payload.as_deref())?.unwrap_or_default();

    let groups = group_by_day(&payload.assignments, &now);
    let entries: Vec<GroupEntry<'_>> = groups
        .iter()
        .map(|(label, items)| GroupEntry {
            label,
            ids: items.iter().map(|item| item.id.as_str()).collect(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
