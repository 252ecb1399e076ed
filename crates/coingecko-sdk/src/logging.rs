//! Log output setup

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber filtering at `level`
///
/// `RUST_LOG` takes precedence when set. Returns `false` if a global
/// subscriber was already installed, in which case nothing changes.
pub fn init_logging(level: Level) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        init_logging(Level::DEBUG);
        assert!(!init_logging(Level::INFO));
    }
}
