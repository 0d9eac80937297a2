//! Tracing subscriber setup for hosts without their own

use tracing_subscriber::{fmt, EnvFilter};

/// Install a global fmt subscriber
///
/// `RUST_LOG` overrides `default_filter`; an unparsable `default_filter`
/// falls back to `info`. Returns `false` if a global subscriber was already
/// installed, in which case nothing changes.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        init_tracing("scn_engine=debug");
        assert!(!init_tracing("scn_engine=debug"));
    }
}
