use briefing_core::{BriefingRenderer, DataSource, HostEvent, MemoryBridge};
use clap::Args;
use std::io::BufRead;
use std::path::PathBuf;

use crate::output::{print_view, Format};

#[derive(Args)]
pub struct WatchArgs {
    /// Payload available at mount time
    #[arg(long)]
    initial: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// Current time as RFC 3339; its offset is the display time zone
    #[arg(long)]
    now: Option<String>,
}

/// Reads one host event per stdin line. Every event that changes the state
/// prints a fresh view; malformed lines and events are skipped.
pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let now = super::clock(args.now.as_deref())?;
    let bridge = MemoryBridge::new();
    if let Some(path) = &args.initial {
        bridge.set_initial(super::read_payload(Some(path.as_path()))?);
    }

    let mut renderer = BriefingRenderer::new(super::load_config());
    renderer.mount(Some(&bridge as &dyn DataSource))?;
    print_view(&renderer.view(&now), args.format)?;

    let stdin = std::io::stdin();
    for (lineno, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = match HostEvent::from_json(&line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(line = lineno + 1, error = %e, "skipping unreadable event");
                continue;
            }
        };

        let before = renderer.revision();
        bridge.dispatch(&event);
        if renderer.revision() != before {
            print_view(&renderer.view(&now), args.format)?;
        } else {
            tracing::debug!(line = lineno + 1, "event did not change the briefing");
        }
    }

    renderer.unmount();
    Ok(())
}
