//! Which tuning constant each GEMM kernel reads
//!
//! The kernels themselves live in OpenCL source outside this crate. This module only records the
//! substitutions each one expects, so callers can emit a minimal set of `-D` options.

use crate::error::{Result, TilingError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six named tuning constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Constant {
    Ts,
    Wpt,
    Rts,
    Width,
    Tsdk,
    Lpt,
}

impl Constant {
    /// All constants, in header order
    pub const ALL: [Constant; 6] = [
        Constant::Ts,
        Constant::Wpt,
        Constant::Rts,
        Constant::Width,
        Constant::Tsdk,
        Constant::Lpt,
    ];

    /// Preprocessor name
    pub fn name(self) -> &'static str {
        match self {
            Constant::Ts => "TS",
            Constant::Wpt => "WPT",
            Constant::Rts => "RTS",
            Constant::Width => "WIDTH",
            Constant::Tsdk => "TSDK",
            Constant::Lpt => "LPT",
        }
    }

    pub fn from_name(name: &str) -> Option<Constant> {
        Constant::ALL.into_iter().find(|c| c.name() == name)
    }

    /// `RTS` and `LPT` are computed from the others
    pub fn is_derived(self) -> bool {
        matches!(self, Constant::Rts | Constant::Lpt)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The ten kernels of the tiled GEMM series
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GemmKernel {
    Naive = 1,
    Tiled = 2,
    MoreWorkPerThread = 3,
    WiderLoads = 4,
    TransposedInput = 5,
    RegisterBlocking = 6,
    WiderRegisterBlocking = 7,
    PaddedRegisterBlocking = 8,
    PrefetchedRegisterBlocking = 9,
    IncompleteTiles = 10,
}

impl GemmKernel {
    pub const ALL: [GemmKernel; 10] = [
        GemmKernel::Naive,
        GemmKernel::Tiled,
        GemmKernel::MoreWorkPerThread,
        GemmKernel::WiderLoads,
        GemmKernel::TransposedInput,
        GemmKernel::RegisterBlocking,
        GemmKernel::WiderRegisterBlocking,
        GemmKernel::PaddedRegisterBlocking,
        GemmKernel::PrefetchedRegisterBlocking,
        GemmKernel::IncompleteTiles,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(number: u8) -> Result<GemmKernel> {
        GemmKernel::ALL
            .into_iter()
            .find(|k| k.number() == number)
            .ok_or(TilingError::UnknownKernel(number))
    }

    /// Constants this kernel expects to find defined, in header order
    pub fn required_constants(self) -> Vec<Constant> {
        Constant::ALL
            .into_iter()
            .filter(|&c| self.uses(c))
            .collect()
    }

    /// Whether the kernel source reads `constant`
    pub fn uses(self, constant: Constant) -> bool {
        let n = self.number();
        match constant {
            Constant::Ts => (1..=5).contains(&n),
            Constant::Wpt | Constant::Rts => n == 3 || n == 5,
            Constant::Width => n == 4 || (7..=10).contains(&n),
            Constant::Tsdk | Constant::Lpt => n == 5,
        }
    }
}

impl fmt::Display for GemmKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kernel {} ({:?})", self.number(), self)
    }
}

/// Union of the constants a set of kernels reads, sorted and deduplicated
pub fn constants_for(kernels: &[GemmKernel]) -> Vec<Constant> {
    let mut constants: Vec<Constant> = kernels
        .iter()
        .flat_map(|k| k.required_constants())
        .collect();
    constants.sort();
    constants.dedup();
    constants
}
