// Test modules for all components
pub mod test_builders;
pub mod test_config;
