use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive string, e.g.
/// `STACKGUARD_LOG=stackguard_domain=debug,stackguard_stack=info`.
pub const LOG_ENV: &str = "STACKGUARD_LOG";

/// Install the global subscriber. Logs go to stderr; stdout carries reports only.
///
/// `STACKGUARD_LOG` wins when set and valid; otherwise `-v` raises the default
/// from `warn` to `info` (`-v`) or `debug` (`-vv`).
pub fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "stackguard=warn",
        1 => "stackguard=info",
        _ => "stackguard=debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (tests) is not an error worth surfacing.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
