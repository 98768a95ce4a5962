//! OpenCL program compilation with the tuning constants substituted
//!
//! Only the compile step lives here. Enqueueing kernels is left to the caller.

#[cfg(feature = "gpu")]
pub mod program;

#[cfg(feature = "gpu")]
pub use program::{build_program, find_device};
