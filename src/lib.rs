//! # gemm-tiling - Tuning constants for tiled GEMM kernels
//!
//! The tiled matrix-multiplication kernels are parameterised by six preprocessor constants:
//! `TS`, `WPT`, `RTS`, `WIDTH`, `TSDK` and `LPT`. This crate keeps them in one place, checks the
//! divisibility constraints between them, and hands them to kernel source either as a header or
//! as `-D` compiler options.
//!
//! ## Quick Start
//!
//! ```rust
//! use gemm_tiling::builders::TileConfigBuilder;
//! use gemm_tiling::defines::{compiler_options, render_header, parse_header};
//!
//! let config = TileConfigBuilder::new().tile_size(16).build().unwrap();
//! assert_eq!(config.reduced_tile_size(), 4);
//!
//! let header = render_header(&config);
//! assert_eq!(parse_header(&header).unwrap(), config);
//! assert!(compiler_options(&config).starts_with("-D TS=16"));
//! ```
//!
//! ## Module Organization
//!
//! - [`constants`] - The shipped values as `const` items
//! - [`config`] - Validated runtime configuration, persistence and environment overrides
//! - [`builders`] - Builder for [`config::TileConfig`]
//! - [`kernels`] - Which constant each kernel reads
//! - [`defines`] - Header and compiler-option rendering, header parsing
//! - [`error`] - Error types and result handling
//! - [`gpu`] - OpenCL program compilation (feature `gpu`)

#[macro_use]
pub mod macros;

pub mod builders;
pub mod config;
pub mod constants;
pub mod defines;
pub mod error;
pub mod gpu;
pub mod kernels;

pub use config::TileConfig;
pub use error::{Result, TilingError};
pub use kernels::{Constant, GemmKernel};

#[cfg(test)]
mod tests;
