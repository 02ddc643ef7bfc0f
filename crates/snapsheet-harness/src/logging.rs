#![forbid(unsafe_code)]

//! Test-time tracing setup.
//!
//! `RUST_LOG` selects the filter (default `snapsheet_core=debug`). With the
//! `tracing-json` feature the output is newline-delimited JSON, which pairs
//! with the replay traces when a CI job collects both.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "snapsheet_core=debug,snapsheet_harness=debug";

static INIT: Once = Once::new();

/// Install a global subscriber writing through the test writer.
///
/// Safe to call from every test; only the first call installs anything,
/// and a subscriber installed elsewhere is left alone.
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true);

        #[cfg(feature = "tracing-json")]
        let _ = builder.json().try_init();
        #[cfg(not(feature = "tracing-json"))]
        let _ = builder.compact().try_init();
    });
}
