use thiserror::Error;

/// Top-level error type for the `atmo-core` crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Vendor API failure (authentication, preconditions, requests).
    #[error(transparent)]
    Api(#[from] atmo_api::Error),

    /// The publish sink rejected a record.
    #[error("publish failed: {message}")]
    Publish { message: String },
}

impl CoreError {
    /// Build a publish error from any displayable sink failure.
    pub fn publish(message: impl ToString) -> Self {
        Self::Publish {
            message: message.to_string(),
        }
    }
}
