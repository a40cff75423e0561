//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init() {
    let _ = env_logger::Builder::from_default_env().try_init();
}

/// Initialize the logging system with an explicit filter
///
/// `level` accepts anything env_logger understands, from a bare level such as
/// `"debug"` to per-module filters like `"scene_core::memory=trace,info"`.
pub fn init_with_level(level: &str) {
    let _ = env_logger::Builder::from_default_env()
        .parse_filters(level)
        .try_init();
}

/// Initialize logging for unit tests
pub fn init_for_tests() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_initialization_is_harmless() {
        init_for_tests();
        init();
        init_with_level("scene_core=trace,warn");
        info!("logging initialized");
    }
}
