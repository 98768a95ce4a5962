//! Tuning constants for the tiled GEMM kernels
//!
//! These are the values baked into kernel source at build time. Kernels read them as
//! preprocessor substitutions; see [`crate::defines`] for the rendered form.

// Constants for kernels 1 -- 5

/// The square-root of the 2D tile-size (== work-group dims)
pub const TS: usize = 8;

// Constants for kernels 3, 5

/// The amount of work-per-thread, i.e. the thread-coarsening factor
pub const WPT: usize = 4;

/// The reduced tile-size in one dimension
pub const RTS: usize = TS / WPT;

// Constants for kernels 4, 7 -- 10

/// The vector-width (in number of floats)
pub const WIDTH: usize = 4;

// Constants for kernel 5

/// The tile-size in dimension K
pub const TSDK: usize = 16;

/// The amount of loads-per-thread (assumes TSN == TSM)
pub const LPT: usize = (TSDK * WPT) / TS;

/// Vector widths the kernels' `floatX` typedef supports
pub const SUPPORTED_VECTOR_WIDTHS: [usize; 5] = [1, 2, 4, 8, 16];

/// Environment variables read by [`crate::config::TileConfig::apply_env_overrides`]
pub const ENV_TILE_SIZE: &str = "GEMM_TS";
pub const ENV_WORK_PER_THREAD: &str = "GEMM_WPT";
pub const ENV_VECTOR_WIDTH: &str = "GEMM_WIDTH";
pub const ENV_TILE_SIZE_K: &str = "GEMM_TSDK";

/// Whether `width` names an OpenCL vector type
pub const fn is_supported_vector_width(width: usize) -> bool {
    let mut i = 0;
    while i < SUPPORTED_VECTOR_WIDTHS.len() {
        if SUPPORTED_VECTOR_WIDTHS[i] == width {
            return true;
        }
        i += 1;
    }
    false
}

const _: () = assert!(TS > 0 && WPT > 0 && WIDTH > 0 && TSDK > 0);
const _: () = assert!(TS % WPT == 0, "RTS must be an exact tile size");
const _: () = assert!((TSDK * WPT) % TS == 0, "LPT must be an exact load count");
const _: () = assert!(RTS > 0 && LPT > 0);
const _: () = assert!(is_supported_vector_width(WIDTH));
