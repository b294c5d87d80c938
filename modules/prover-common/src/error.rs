use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProverError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
