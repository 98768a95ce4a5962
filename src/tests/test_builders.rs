use crate::builders::TileConfigBuilder;
use crate::config::TileConfig;
use crate::error::TilingError;

#[test]
fn test_builder_defaults() {
    let config = TileConfigBuilder::new().build().unwrap();
    assert_eq!(config, TileConfig::default());
}

#[test]
fn test_builder_setters() {
    let config = TileConfigBuilder::new()
        .tile_size(32)
        .work_per_thread(8)
        .vector_width(8)
        .tile_size_k(64)
        .build()
        .unwrap();

    assert_eq!(config.tile_size(), 32);
    assert_eq!(config.reduced_tile_size(), 4);
    assert_eq!(config.vector_width(), 8);
    assert_eq!(config.loads_per_thread(), 16);
}

#[test]
fn test_builder_rejects_invalid() {
    let result = TileConfigBuilder::new().work_per_thread(3).build();
    assert!(matches!(result, Err(TilingError::Divisibility { .. })));
}

#[test]
fn test_builder_from_config() {
    let base = TileConfig::new(16, 4, 2, 32).unwrap();
    let config = TileConfigBuilder::from_config(base).vector_width(16).build().unwrap();
    assert_eq!(config.tile_size(), 16);
    assert_eq!(config.tile_size_k(), 32);
    assert_eq!(config.vector_width(), 16);
}

#[test]
fn test_builder_env_overrides() {
    let lookup = |var: &str| match var {
        "GEMM_TS" => Some("16".to_string()),
        "GEMM_TSDK" => Some("32".to_string()),
        _ => None,
    };

    let config = TileConfigBuilder::new().env_overrides(true).build_with(lookup).unwrap();
    assert_eq!(config.tile_size(), 16);
    assert_eq!(config.tile_size_k(), 32);
    assert_eq!(config.loads_per_thread(), 8);

    let untouched = TileConfigBuilder::new().build_with(lookup).unwrap();
    assert_eq!(untouched, TileConfig::default());
}

#[test]
fn test_builder_env_override_errors() {
    let err = TileConfigBuilder::new()
        .env_overrides(true)
        .build_with(|var: &str| (var == "GEMM_WPT").then(|| "four".to_string()))
        .unwrap_err();
    assert!(matches!(err, TilingError::Environment { ref var, .. } if var == "GEMM_WPT"));
}
