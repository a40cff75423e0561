//! # Core Configuration
//!
//! Configuration documents for the object model runtime.
//!
//! ## Configuration Categories
//!
//! - **Core Config**: Logging level and the allocator settings below
//! - **Allocator Config**: Pooling strategy, size classes and per-affinity slab sizes

use serde::{Serialize, Deserialize};

use crate::config::{Config, ConfigError};
use crate::memory::{AllocatorAffinity, ALLOCATOR_ALIGNMENT};

/// Allocation strategy used by [`crate::memory::PoolAllocator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocatorType {
    /// Small blocks come from per-affinity slabs, large ones from the system
    Pooled,
    /// Every block comes straight from the system allocator
    System,
}

/// Slab size reserved at a time for each allocation affinity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabSizes {
    /// General objects (values, commands, state)
    pub objects: usize,
    /// Bulk array payloads
    pub data: usize,
    /// Scene graph nodes
    pub nodes: usize,
    /// Physics objects
    pub physics: usize,
}

impl SlabSizes {
    /// Slab size for one affinity
    pub fn get(&self, affinity: AllocatorAffinity) -> usize {
        match affinity {
            AllocatorAffinity::Objects => self.objects,
            AllocatorAffinity::Data => self.data,
            AllocatorAffinity::Nodes => self.nodes,
            AllocatorAffinity::Physics => self.physics,
        }
    }

    /// Override the slab size of one affinity
    pub fn set(&mut self, affinity: AllocatorAffinity, size: usize) {
        match affinity {
            AllocatorAffinity::Objects => self.objects = size,
            AllocatorAffinity::Data => self.data = size,
            AllocatorAffinity::Nodes => self.nodes = size,
            AllocatorAffinity::Physics => self.physics = size,
        }
    }
}

impl Default for SlabSizes {
    fn default() -> Self {
        Self {
            objects: 1024 * 1024,
            data: 16 * 1024 * 1024,
            nodes: 1024 * 1024,
            physics: 1024 * 1024,
        }
    }
}

/// # Allocator Configuration
///
/// Controls how the pooled allocator partitions memory. Requests up to
/// `max_pooled_size` are rounded up to a power-of-two size class (never below
/// `min_block_size`) and carved out of slabs; anything larger is forwarded to
/// the system allocator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Pooling strategy
    pub allocator_type: AllocatorType,
    /// Smallest size class in bytes
    pub min_block_size: usize,
    /// Largest size class in bytes
    pub max_pooled_size: usize,
    /// Per-affinity slab sizes
    pub slab_sizes: SlabSizes,
}

impl AllocatorConfig {
    /// Create the default pooled configuration
    pub fn new() -> Self {
        Self {
            allocator_type: AllocatorType::Pooled,
            min_block_size: ALLOCATOR_ALIGNMENT,
            max_pooled_size: 64 * 1024,
            slab_sizes: SlabSizes::default(),
        }
    }

    /// Configuration that bypasses pooling
    pub fn system() -> Self {
        Self {
            allocator_type: AllocatorType::System,
            ..Self::new()
        }
    }

    /// Set the largest pooled size class
    pub fn with_max_pooled_size(mut self, size: usize) -> Self {
        self.max_pooled_size = size;
        self
    }

    /// Set the slab size of one affinity
    pub fn with_slab_size(mut self, affinity: AllocatorAffinity, size: usize) -> Self {
        self.slab_sizes.set(affinity, size);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_block_size.is_power_of_two() || self.min_block_size < ALLOCATOR_ALIGNMENT {
            return Err(ConfigError::Invalid(format!(
                "min_block_size must be a power of two of at least {ALLOCATOR_ALIGNMENT}, got {}",
                self.min_block_size
            )));
        }

        if !self.max_pooled_size.is_power_of_two() || self.max_pooled_size < self.min_block_size {
            return Err(ConfigError::Invalid(format!(
                "max_pooled_size must be a power of two no smaller than min_block_size, got {}",
                self.max_pooled_size
            )));
        }

        for affinity in AllocatorAffinity::ALL {
            let slab_size = self.slab_sizes.get(affinity);
            if slab_size < self.max_pooled_size {
                return Err(ConfigError::Invalid(format!(
                    "{affinity:?} slab size {slab_size} cannot hold the largest size class ({})",
                    self.max_pooled_size
                )));
            }
        }

        Ok(())
    }
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Core Configuration
///
/// Top-level configuration document for the object model runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level filter (`error`, `warn`, `info`, `debug`, `trace` or an env_logger filter string)
    pub log_level: String,
    /// Allocator settings
    pub allocator: AllocatorConfig,
}

impl CoreConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            allocator: AllocatorConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Replace the allocator settings
    pub fn with_allocator(mut self, allocator: AllocatorConfig) -> Self {
        self.allocator = allocator;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("log_level cannot be empty".to_string()));
        }
        self.allocator.validate()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for CoreConfig {}
