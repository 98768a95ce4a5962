pub mod tile_config;

pub use tile_config::TileConfigBuilder;
