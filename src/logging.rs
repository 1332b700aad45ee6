//! tracing subscriber setup. Diagnostics go to stderr; stdout stays for command output.

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

/// Default directive when `LARABOX_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "larabox=info"
    } else {
        "larabox=warn"
    }
}

/// Install the global subscriber once; later calls are no-ops.
pub fn init(verbose: bool) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env("LARABOX_LOG")
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .try_init();
    });
}
