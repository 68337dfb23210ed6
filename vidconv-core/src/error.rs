use thiserror::Error;

/// Ways a conversion can fail to start or finish.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("No input file selected")]
    MissingInput,
    #[error("Conversion cancelled")]
    Cancelled,
    #[error("A conversion is already in progress")]
    AlreadyRunning,
    #[error("{0}")]
    Encode(String),
}

impl ConvertError {
    /// Wrap any error chain, keeping only its text.
    pub fn encode(err: &anyhow::Error) -> Self {
        ConvertError::Encode(format!("{err:#}"))
    }
}
