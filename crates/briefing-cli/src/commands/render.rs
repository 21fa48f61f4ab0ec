use briefing_core::{BriefingError, BriefingRenderer, DataSource, MemoryBridge};
use clap::Args;
use std::path::PathBuf;

use crate::output::{print_view, Format};

#[derive(Args)]
pub struct RenderArgs {
    /// Payload JSON file ("-" or omitted for stdin)
    payload: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Current time as RFC 3339; its offset is the display time zone
    #[arg(long)]
    now: Option<String>,
    /// Mount without a host bridge (always renders the loading view)
    #[arg(long)]
    no_bridge: bool,
}

pub fn run(args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let now = super::clock(args.now.as_deref())?;
    let mut renderer = BriefingRenderer::new(super::load_config());

    if args.no_bridge {
        match renderer.mount(None) {
            Err(BriefingError::MissingBridge) => {}
            other => other?,
        }
    } else {
        let bridge = MemoryBridge::new();
        bridge.set_initial(super::read_payload(args.payload.as_deref())?);
        renderer.mount(Some(&bridge as &dyn DataSource))?;
        renderer.unmount();
    }

    print_view(&renderer.view(&now), args.format)?;
    Ok(())
}
