//! Runtime form of the tuning constants
//!
//! A [`TileConfig`] is always valid: every constructor, including deserialization, runs
//! [`TileConfig::validate`], so the derived quantities never divide by zero or truncate.

use crate::constants::{
    self, ENV_TILE_SIZE, ENV_TILE_SIZE_K, ENV_VECTOR_WIDTH, ENV_WORK_PER_THREAD,
};
use crate::error::{Result, TilingError};
use crate::kernels::Constant;
use bincode::{deserialize, serialize};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{Read, Write};

/// Field layout used on the wire, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTileConfig {
    pub tile_size: usize,
    pub work_per_thread: usize,
    pub vector_width: usize,
    pub tile_size_k: usize,
}

/// The four literal tuning knobs; `RTS` and `LPT` are derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTileConfig", into = "RawTileConfig")]
pub struct TileConfig {
    tile_size: usize,
    work_per_thread: usize,
    vector_width: usize,
    tile_size_k: usize,
}

impl Default for TileConfig {
    fn default() -> Self {
        TileConfig::DEFAULT
    }
}

impl TileConfig {
    /// The values shipped in [`crate::constants`]
    pub const DEFAULT: TileConfig = TileConfig::new_const(
        constants::TS,
        constants::WPT,
        constants::WIDTH,
        constants::TSDK,
    );

    /// Create a validated configuration
    pub fn new(tile_size: usize, work_per_thread: usize, vector_width: usize, tile_size_k: usize) -> Result<Self> {
        let config = TileConfig {
            tile_size,
            work_per_thread,
            vector_width,
            tile_size_k,
        };
        config.validate()?;
        Ok(config)
    }

    /// Constant constructor backing [`crate::tile_config!`].
    ///
    /// # Panics
    ///
    /// Panics when the divisibility constraints do not hold. In a `const` item this is a
    /// compile error.
    pub const fn new_const(tile_size: usize, work_per_thread: usize, vector_width: usize, tile_size_k: usize) -> Self {
        assert!(tile_size > 0 && work_per_thread > 0 && vector_width > 0 && tile_size_k > 0);
        assert!(tile_size % work_per_thread == 0, "TS must be divisible by WPT");
        assert!((tile_size_k * work_per_thread) % tile_size == 0, "TSDK*WPT must be divisible by TS");
        assert!(constants::is_supported_vector_width(vector_width), "WIDTH must be 1, 2, 4, 8 or 16");
        assert!(tile_size.checked_mul(tile_size).is_some(), "TS*TS must fit in usize");
        TileConfig {
            tile_size,
            work_per_thread,
            vector_width,
            tile_size_k,
        }
    }

    /// Check positivity, vector width, both divisibility constraints and that `TS*TS` fits
    pub fn validate(&self) -> Result<()> {
        let knobs = [
            (Constant::Ts, self.tile_size),
            (Constant::Wpt, self.work_per_thread),
            (Constant::Width, self.vector_width),
            (Constant::Tsdk, self.tile_size_k),
        ];
        for (constant, value) in knobs {
            if value == 0 {
                return Err(TilingError::invalid_parameter(constant.name(), "must be a positive integer"));
            }
        }

        if !constants::is_supported_vector_width(self.vector_width) {
            return Err(TilingError::InvalidParameter {
                name: Constant::Width.name().to_string(),
                reason: format!(
                    "{} is not a supported vector width (expected one of {:?})",
                    self.vector_width,
                    constants::SUPPORTED_VECTOR_WIDTHS
                ),
            });
        }

        if self.tile_size % self.work_per_thread != 0 {
            return Err(TilingError::Divisibility {
                derived: Constant::Rts.name().to_string(),
                dividend: self.tile_size,
                divisor: self.work_per_thread,
            });
        }

        if self.tile_size.checked_mul(self.tile_size).is_none() {
            return Err(TilingError::invalid_parameter("TS*TS", "work-group size overflows usize"));
        }

        let loads = self
            .tile_size_k
            .checked_mul(self.work_per_thread)
            .ok_or_else(|| TilingError::invalid_parameter("TSDK*WPT", "overflows usize"))?;
        if loads % self.tile_size != 0 {
            return Err(TilingError::Divisibility {
                derived: Constant::Lpt.name().to_string(),
                dividend: loads,
                divisor: self.tile_size,
            });
        }

        Ok(())
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    pub fn work_per_thread(&self) -> usize {
        self.work_per_thread
    }

    pub fn vector_width(&self) -> usize {
        self.vector_width
    }

    pub fn tile_size_k(&self) -> usize {
        self.tile_size_k
    }

    /// `RTS = TS / WPT`
    pub fn reduced_tile_size(&self) -> usize {
        self.tile_size / self.work_per_thread
    }

    /// `LPT = (TSDK * WPT) / TS`
    pub fn loads_per_thread(&self) -> usize {
        (self.tile_size_k * self.work_per_thread) / self.tile_size
    }

    /// Work-group dimensions of the tiled kernels: a `TS x TS` square
    pub fn work_group_dims(&self) -> [usize; 2] {
        [self.tile_size, self.tile_size]
    }

    pub fn work_group_size(&self) -> usize {
        self.tile_size * self.tile_size
    }

    /// Look up a named constant
    pub fn value(&self, constant: Constant) -> usize {
        match constant {
            Constant::Ts => self.tile_size,
            Constant::Wpt => self.work_per_thread,
            Constant::Rts => self.reduced_tile_size(),
            Constant::Width => self.vector_width,
            Constant::Tsdk => self.tile_size_k,
            Constant::Lpt => self.loads_per_thread(),
        }
    }

    /// Reject a config whose work-group would not fit on a device
    pub fn check_work_group_limit(&self, max_work_group_size: usize) -> Result<()> {
        let size = self.work_group_size();
        if size > max_work_group_size {
            return Err(TilingError::WorkGroupLimit {
                size,
                max: max_work_group_size,
            });
        }
        Ok(())
    }

    /// Override knobs from the `GEMM_*` environment variables
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides_with(|var| std::env::var(var).ok())
    }

    /// Override knobs using `lookup` in place of the process environment
    pub fn apply_overrides_with<F>(self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw = RawTileConfig::from(self);
        let slots: [(&str, &mut usize); 4] = [
            (ENV_TILE_SIZE, &mut raw.tile_size),
            (ENV_WORK_PER_THREAD, &mut raw.work_per_thread),
            (ENV_VECTOR_WIDTH, &mut raw.vector_width),
            (ENV_TILE_SIZE_K, &mut raw.tile_size_k),
        ];

        for (var, slot) in slots {
            let Some(text) = lookup(var) else {
                continue;
            };
            let value: usize = text.trim().parse().map_err(|e| TilingError::Environment {
                var: var.to_string(),
                reason: format!("'{}' is not an unsigned integer: {}", text, e),
            })?;
            if value != *slot {
                log::warn!("{} overrides {} with {}", var, *slot, value);
                *slot = value;
            }
        }

        TileConfig::try_from(raw)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save_json(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Saved tile config to {}", path);
        Ok(())
    }

    /// Load and validate a JSON configuration
    pub fn load_json(path: &str) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        log::info!("Loaded tile config {} from {}", config, path);
        Ok(config)
    }

    /// Save the configuration in bincode form
    pub fn save(&self, path: &str) -> Result<()> {
        let serialized = serialize(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(&serialized)?;
        log::info!("Saved tile config to {}", path);
        Ok(())
    }

    /// Load and validate a bincode configuration
    pub fn load(path: &str) -> Result<Self> {
        let mut file = fs::File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        let deserialized: Self = deserialize(&buffer)?;
        log::info!("Loaded tile config {} from {}", deserialized, path);
        Ok(deserialized)
    }
}

impl TryFrom<RawTileConfig> for TileConfig {
    type Error = TilingError;

    fn try_from(raw: RawTileConfig) -> Result<Self> {
        TileConfig::new(raw.tile_size, raw.work_per_thread, raw.vector_width, raw.tile_size_k)
    }
}

impl From<TileConfig> for RawTileConfig {
    fn from(config: TileConfig) -> Self {
        RawTileConfig {
            tile_size: config.tile_size,
            work_per_thread: config.work_per_thread,
            vector_width: config.vector_width,
            tile_size_k: config.tile_size_k,
        }
    }
}

impl fmt::Display for TileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TS={} WPT={} RTS={} WIDTH={} TSDK={} LPT={}",
            self.tile_size,
            self.work_per_thread,
            self.reduced_tile_size(),
            self.vector_width,
            self.tile_size_k,
            self.loads_per_thread()
        )
    }
}
