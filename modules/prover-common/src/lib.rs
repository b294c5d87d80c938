pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{Config, LogFormat};
pub use error::ProverError;
