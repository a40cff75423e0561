//! # Core Module
//!
//! Shared configuration for the object model and its allocator, plus the
//! one-call initialisation used by applications.
//!
//! ## Organization
//!
//! - **Config**: Serializable configuration documents for logging and memory
//! - **Init**: Installs logging and the process-wide allocator from a config

pub mod config;

pub use config::{AllocatorConfig, AllocatorType, CoreConfig, SlabSizes};

use crate::config::ConfigError;
use crate::memory::{self, AllocatorError, PoolAllocator};
use thiserror::Error;

/// Errors raised while bringing up the core
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration could not be loaded or failed validation
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The allocator could not be installed
    #[error("Allocator error: {0}")]
    Allocator(#[from] AllocatorError),
}

/// Initialize logging and install the configured allocator.
///
/// Must run before the first object is created; once any allocation has gone
/// through the default instance the allocator can no longer be replaced.
pub fn init(config: &CoreConfig) -> Result<(), CoreError> {
    config.validate()?;
    crate::foundation::logging::init_with_level(&config.log_level);

    let allocator = PoolAllocator::new(config.allocator.clone())?;
    memory::set_instance(Box::new(allocator))?;

    log::info!(
        "Scene core v{} initialized ({:?} allocator)",
        crate::VERSION,
        config.allocator.allocator_type
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_rejects_invalid_config() {
        let config = CoreConfig::default().with_allocator(AllocatorConfig::default().with_max_pooled_size(1000));
        assert!(matches!(init(&config), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_init_installs_allocator_at_most_once() {
        // Other tests may already have created the default instance.
        match init(&CoreConfig::default()) {
            Ok(()) => assert!(matches!(
                init(&CoreConfig::default()),
                Err(CoreError::Allocator(AllocatorError::InstanceAlreadyInitialized))
            )),
            Err(error) => assert!(matches!(
                error,
                CoreError::Allocator(AllocatorError::InstanceAlreadyInitialized)
            )),
        }
    }
}
