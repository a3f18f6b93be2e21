// wcf/src/logging.rs

use tracing_subscriber::EnvFilter;

/// Installs the process-wide `tracing_subscriber::fmt` subscriber. Only the CLI
/// binary does this — `wcf-core` never dictates a global subscriber to its
/// embedders.
///
/// Precedence: `--log-level` / `WCF_LOG` (via clap's `env` attribute) wins over
/// `-v` verbosity counting, which wins over the `info` default.
pub fn init(verbosity: u8, log_level: Option<&str>) {
    let directive = log_level.map(str::to_string).unwrap_or_else(|| default_directive(verbosity));

    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn default_directive(verbosity: u8) -> String {
    match verbosity {
        0 => "info".to_string(),
        1 => "wcf=debug,wcf_core=debug,info".to_string(),
        _ => "wcf=trace,wcf_core=trace,debug".to_string(),
    }
}
