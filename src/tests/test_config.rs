use crate::config::TileConfig;
use crate::constants;
use crate::error::TilingError;
use crate::kernels::Constant;
use std::collections::HashMap;
use tempfile::tempdir;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |var: &str| map.get(var).cloned()
}

#[test]
fn test_default_matches_constants() {
    let config = TileConfig::default();
    assert_eq!(config.tile_size(), constants::TS);
    assert_eq!(config.work_per_thread(), constants::WPT);
    assert_eq!(config.reduced_tile_size(), constants::RTS);
    assert_eq!(config.vector_width(), constants::WIDTH);
    assert_eq!(config.tile_size_k(), constants::TSDK);
    assert_eq!(config.loads_per_thread(), constants::LPT);
    assert_eq!(config.to_string(), "TS=8 WPT=4 RTS=2 WIDTH=4 TSDK=16 LPT=8");
}

#[test]
fn test_value_lookup() {
    let config = TileConfig::default();
    let values: Vec<usize> = Constant::ALL.iter().map(|&c| config.value(c)).collect();
    assert_eq!(values, vec![8, 4, 2, 4, 16, 8]);
}

#[test]
fn test_zero_rejected() {
    let err = TileConfig::new(0, 4, 4, 16).unwrap_err();
    assert_eq!(err, TilingError::invalid_parameter("TS", "must be a positive integer"));

    let err = TileConfig::new(8, 4, 4, 0).unwrap_err();
    assert!(matches!(err, TilingError::InvalidParameter { ref name, .. } if name == "TSDK"));
}

#[test]
fn test_unsupported_vector_width() {
    let err = TileConfig::new(8, 4, 3, 16).unwrap_err();
    assert!(matches!(err, TilingError::InvalidParameter { ref name, .. } if name == "WIDTH"));
}

#[test]
fn test_reduced_tile_must_be_exact() {
    let err = TileConfig::new(8, 3, 4, 16).unwrap_err();
    assert_eq!(
        err,
        TilingError::Divisibility {
            derived: "RTS".to_string(),
            dividend: 8,
            divisor: 3,
        }
    );
}

#[test]
fn test_loads_per_thread_must_be_exact() {
    let err = TileConfig::new(8, 4, 4, 5).unwrap_err();
    assert_eq!(
        err,
        TilingError::Divisibility {
            derived: "LPT".to_string(),
            dividend: 20,
            divisor: 8,
        }
    );
}

#[test]
fn test_overflowing_product_rejected() {
    let err = TileConfig::new(2, 2, 4, usize::MAX).unwrap_err();
    assert!(matches!(err, TilingError::InvalidParameter { ref name, .. } if name == "TSDK*WPT"));
}

#[test]
fn test_work_group_limits() {
    let config = TileConfig::default();
    assert_eq!(config.work_group_dims(), [8, 8]);
    assert_eq!(config.work_group_size(), 64);
    assert!(config.check_work_group_limit(64).is_ok());
    assert_eq!(
        config.check_work_group_limit(63),
        Err(TilingError::WorkGroupLimit { size: 64, max: 63 })
    );
}

#[test]
fn test_overrides_applied() {
    let config = TileConfig::default()
        .apply_overrides_with(lookup_from(&[("GEMM_TS", " 16 "), ("GEMM_WIDTH", "8")]))
        .unwrap();
    assert_eq!(config.tile_size(), 16);
    assert_eq!(config.vector_width(), 8);
    assert_eq!(config.reduced_tile_size(), 4);
    assert_eq!(config.loads_per_thread(), 4);
}

#[test]
fn test_no_overrides_is_identity() {
    let config = TileConfig::default().apply_overrides_with(|_| None).unwrap();
    assert_eq!(config, TileConfig::default());
}

#[test]
fn test_unparsable_override() {
    let err = TileConfig::default()
        .apply_overrides_with(lookup_from(&[("GEMM_TSDK", "sixteen")]))
        .unwrap_err();
    assert!(matches!(err, TilingError::Environment { ref var, .. } if var == "GEMM_TSDK"));
}

#[test]
fn test_override_revalidated() {
    let err = TileConfig::default()
        .apply_overrides_with(lookup_from(&[("GEMM_WPT", "3")]))
        .unwrap_err();
    assert!(matches!(err, TilingError::Divisibility { .. }));
}

#[test]
fn test_json_rejects_invalid_config() {
    let json = r#"{"tile_size":8,"work_per_thread":3,"vector_width":4,"tile_size_k":16}"#;
    let result: Result<TileConfig, _> = serde_json::from_str(json);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("not divisible"));
}

#[test]
fn test_json_field_names() {
    let json = serde_json::to_value(TileConfig::default()).unwrap();
    assert_eq!(json["tile_size"], 8);
    assert_eq!(json["work_per_thread"], 4);
    assert_eq!(json["vector_width"], 4);
    assert_eq!(json["tile_size_k"], 16);
}

#[test]
fn test_save_and_load_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tiles.json");
    let path = path.to_str().unwrap();

    let config = TileConfig::new(16, 8, 2, 32).unwrap();
    config.save_json(path).unwrap();
    assert_eq!(TileConfig::load_json(path).unwrap(), config);
}

#[test]
fn test_save_and_load_bincode() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tiles.bin");
    let path = path.to_str().unwrap();

    let config = TileConfig::new(32, 4, 16, 8).unwrap();
    config.save(path).unwrap();
    assert_eq!(TileConfig::load(path).unwrap(), config);
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = TileConfig::load_json(path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, TilingError::IoError(_)));
}

#[test]
fn test_tile_config_macro() {
    let config = tile_config!(16, 8, 4, 32);
    assert_eq!(config, TileConfig::new(16, 8, 4, 32).unwrap());
    assert_eq!(tile_config!(8, 4, 4, 16), TileConfig::DEFAULT);
}

#[test]
fn test_overflowing_work_group_rejected() {
    let ts = 1usize << (usize::BITS / 2);
    let err = TileConfig::new(ts, 1, 4, ts).unwrap_err();
    assert!(matches!(err, TilingError::InvalidParameter { ref name, .. } if name == "TS*TS"));
}

#[test]
fn test_largest_work_group_checked_against_limit() {
    let ts = (1usize << (usize::BITS / 2)) - 1;
    let config = TileConfig::new(ts, 1, 4, ts).unwrap();
    assert_eq!(config.work_group_size(), ts * ts);
    assert_eq!(
        config.check_work_group_limit(1024),
        Err(TilingError::WorkGroupLimit { size: ts * ts, max: 1024 })
    );
}
