use crate::config::TileConfig;
use crate::error::Result;

/// Builder for TileConfig, starting from the shipped constants
pub struct TileConfigBuilder {
    tile_size: usize,
    work_per_thread: usize,
    vector_width: usize,
    tile_size_k: usize,
    env_overrides: bool,
}

impl TileConfigBuilder {
    /// Create a new builder holding the default constants
    pub fn new() -> Self {
        Self::from_config(TileConfig::DEFAULT)
    }

    /// Start from an existing configuration
    pub fn from_config(config: TileConfig) -> Self {
        TileConfigBuilder {
            tile_size: config.tile_size(),
            work_per_thread: config.work_per_thread(),
            vector_width: config.vector_width(),
            tile_size_k: config.tile_size_k(),
            env_overrides: false,
        }
    }

    /// Set TS
    pub fn tile_size(mut self, size: usize) -> Self {
        self.tile_size = size;
        self
    }

    /// Set WPT
    pub fn work_per_thread(mut self, wpt: usize) -> Self {
        self.work_per_thread = wpt;
        self
    }

    /// Set WIDTH
    pub fn vector_width(mut self, width: usize) -> Self {
        self.vector_width = width;
        self
    }

    /// Set TSDK
    pub fn tile_size_k(mut self, size: usize) -> Self {
        self.tile_size_k = size;
        self
    }

    /// Apply `GEMM_*` environment overrides on build
    pub fn env_overrides(mut self, enabled: bool) -> Self {
        self.env_overrides = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<TileConfig> {
        self.build_with(|var| std::env::var(var).ok())
    }

    /// Build, resolving environment overrides through `lookup`
    pub fn build_with<F>(self, lookup: F) -> Result<TileConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = TileConfig::new(
            self.tile_size,
            self.work_per_thread,
            self.vector_width,
            self.tile_size_k,
        )?;

        if self.env_overrides {
            config.apply_overrides_with(lookup)
        } else {
            Ok(config)
        }
    }
}

impl Default for TileConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
