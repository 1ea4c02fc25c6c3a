pub mod app_config;
pub mod config;
pub mod products;

use thiserror::Error;

pub use app_config::{EngineConfig, Environment};
pub use config::{load_engine_config, load_engine_config_from_env};
pub use products::ProductSnapshot;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
