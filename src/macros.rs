/// A macro to create a `TileConfig` whose constraints are checked at compile time.
///
/// # Examples
///
/// ```
/// use gemm_tiling::tile_config;
/// let config = tile_config!(16, 8, 4, 32);
/// assert_eq!(config.reduced_tile_size(), 2);
/// assert_eq!(config.loads_per_thread(), 16);
/// ```
///
/// An invalid combination does not compile:
///
/// ```compile_fail
/// use gemm_tiling::tile_config;
/// let config = tile_config!(8, 3, 4, 16);
/// ```
#[macro_export]
macro_rules! tile_config {
    ($ts:expr, $wpt:expr, $width:expr, $tsdk:expr) => {{
        const CONFIG: $crate::config::TileConfig =
            $crate::config::TileConfig::new_const($ts, $wpt, $width, $tsdk);
        CONFIG
    }};
}
