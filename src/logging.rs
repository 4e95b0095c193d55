//! Tracing subscriber setup for the binary.
//!
//! `RUST_LOG` takes precedence; otherwise the configured `log_filter` is
//! used. Output goes to stderr so that reports on stdout stay clean.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the filter from `RUST_LOG`, falling back to `default_filter`.
///
/// An unparsable fallback degrades to [`crate::config::DEFAULT_LOG_FILTER`].
#[must_use]
pub fn filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER))
}

/// Install the global subscriber.
///
/// Calling this more than once leaves the first subscriber in place.
pub fn init(default_filter: &str) {
    let installed = tracing_subscriber::registry()
        .with(filter(default_filter))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn invalid_fallback_filter_degrades_to_default() {
        // Only meaningful when RUST_LOG is unset, which is the default under
        // `cargo test`.
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let built = filter("boardcheck=notalevel");
        assert_eq!(built.to_string(), crate::config::DEFAULT_LOG_FILTER);
    }

    #[rstest]
    fn init_twice_does_not_panic() {
        init("boardcheck=debug");
        init("boardcheck=info");
    }
}
