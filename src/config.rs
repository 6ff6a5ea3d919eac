//! Configuration for boltwire
//!
//! Centralized configuration with sensible defaults.

use crate::chunk::{MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
use crate::error::{BoltError, Result};

/// Main configuration for a connection and the result streams it produces
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Framing Configuration
    // -------------------------------------------------------------------------
    /// Max payload bytes per outbound chunk (8..=65535)
    pub max_chunk_size: usize,

    /// Initial capacity of the inbound reassembly buffer (bytes)
    pub default_read_buffer_size: usize,

    /// Initial capacity of the outbound chunk buffer (bytes)
    pub default_write_buffer_size: usize,

    /// Outbound buffer is shrunk back to the default after a flush
    /// once its capacity exceeds this (bytes)
    pub max_write_buffer_size: usize,

    // -------------------------------------------------------------------------
    // Streaming Configuration
    // -------------------------------------------------------------------------
    /// Records requested per PULL
    pub fetch_size: FetchSize,

    /// Target database sent with every RUN (None = server default)
    pub database: Option<String>,
}

/// Batch size requested per PULL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSize {
    /// Request at most this many records per batch
    Limited(u32),

    /// Request the whole result in one batch
    All,
}

impl FetchSize {
    /// Value of the `n` field sent on the wire (`-1` = all)
    pub fn as_wire(&self) -> i64 {
        match self {
            FetchSize::Limited(n) => i64::from(*n),
            FetchSize::All => -1,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_chunk_size: MAX_CHUNK_SIZE,
            default_read_buffer_size: 32 * 1024,   // 32 KB
            default_write_buffer_size: 16 * 1024,  // 16 KB
            max_write_buffer_size: 128 * 1024,     // 128 KB
            fetch_size: FetchSize::Limited(1000),
            database: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that every setting is usable
    pub fn validate(&self) -> Result<()> {
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&self.max_chunk_size) {
            return Err(BoltError::Config(format!(
                "max_chunk_size must be between {} and {}, got {}",
                MIN_CHUNK_SIZE, MAX_CHUNK_SIZE, self.max_chunk_size
            )));
        }

        if self.max_write_buffer_size < self.default_write_buffer_size {
            return Err(BoltError::Config(format!(
                "max_write_buffer_size ({}) is smaller than default_write_buffer_size ({})",
                self.max_write_buffer_size, self.default_write_buffer_size
            )));
        }

        if self.fetch_size == FetchSize::Limited(0) {
            return Err(BoltError::Config("fetch_size must be positive".to_string()));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the max payload size of one outbound chunk
    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.config.max_chunk_size = size;
        self
    }

    /// Set the initial inbound buffer capacity (in bytes)
    pub fn default_read_buffer_size(mut self, size: usize) -> Self {
        self.config.default_read_buffer_size = size;
        self
    }

    /// Set the initial outbound buffer capacity (in bytes)
    pub fn default_write_buffer_size(mut self, size: usize) -> Self {
        self.config.default_write_buffer_size = size;
        self
    }

    /// Set the outbound buffer capacity above which it is shrunk after a flush
    pub fn max_write_buffer_size(mut self, size: usize) -> Self {
        self.config.max_write_buffer_size = size;
        self
    }

    /// Set the number of records requested per PULL
    pub fn fetch_size(mut self, fetch_size: FetchSize) -> Self {
        self.config.fetch_size = fetch_size;
        self
    }

    /// Set the database every query runs against
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = Some(database.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
