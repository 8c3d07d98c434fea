use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

use crate::{Error, Result};

/// Target of the per-line `>>> line` events.
pub const RAW_TARGET: &str = "chanlog_core::raw";

/// Initialize logging/tracing for a chanlog binary.
///
/// `raw_lines` turns on the raw inbound line trace regardless of the base filter.
pub fn init(service_name: &str, raw_lines: bool) -> Result<()> {
    // Default: info for our crates, warn for everything else.
    // Can be overridden with `RUST_LOG`.
    let base = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(service_name)));
    let filter = with_raw_lines(base, raw_lines)?;

    // A second init (tests, embedded use) is not an error.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .try_init();

    Ok(())
}

fn default_directives(service_name: &str) -> String {
    let service = service_name.replace('-', "_");
    format!("warn,chanlog=info,chanlog_core=info,chanlog_irc=info,{service}=info")
}

fn with_raw_lines(filter: EnvFilter, raw_lines: bool) -> Result<EnvFilter> {
    if !raw_lines {
        return Ok(filter);
    }
    let directive: Directive = format!("{RAW_TARGET}=trace")
        .parse()
        .map_err(|e| Error::Config(format!("bad raw line directive: {e}")))?;
    Ok(filter.add_directive(directive))
}
