//! Logging initialization
//!
//! All profiles write to stderr; stdout belongs to the program's own output.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output at debug level
    Development,
    /// JSON structured output at info level
    Production,
    /// Human-readable output, warnings and errors only
    Quiet,
    /// No formatting subscriber; tests install `init_test_capture` instead
    Test,
}

impl Profile {
    fn default_filter(&self) -> &'static str {
        match self {
            Profile::Development => "roster=debug",
            Profile::Production => "roster=info",
            Profile::Quiet | Profile::Test => "roster=warn",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Only the first call has any effect. `RUST_LOG` overrides the profile's
/// default filter.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(profile.default_filter()));

        match profile {
            Profile::Development | Profile::Quiet => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
            Profile::Production => {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
            Profile::Test => {
                tracing_subscriber::registry().init();
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_scope_to_crate_family() {
        assert_eq!(Profile::Development.default_filter(), "roster=debug");
        assert_eq!(Profile::Production.default_filter(), "roster=info");
        assert_eq!(Profile::Quiet.default_filter(), "roster=warn");
    }

    #[test]
    fn test_profile_equality() {
        assert_eq!(Profile::Quiet, Profile::Quiet);
        assert_ne!(Profile::Development, Profile::Production);
    }
}
