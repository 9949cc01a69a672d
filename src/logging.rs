//! Log output for the provider process.
//!
//! The host reads the provider's stderr, so everything goes there. Library
//! crates log through the `log` facade; those records are bridged into the
//! `tracing` subscriber installed here.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "TF_LOG_PROVIDER_PASSBOLT";

pub const DEFAULT_FILTER: &str = "info";

/// Filter from [`LOG_ENV`], falling back to [`DEFAULT_FILTER`] when unset or
/// unparsable.
pub fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Returns `false` when one is already set.
pub fn init() -> bool {
    init_with(filter_from_env())
}

pub fn init_with(filter: EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
