use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to the remote services.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The base URL for a service is absent from configuration
    #[error("The {service} API URL is missing.")]
    MissingBaseUrl { service: &'static str },

    #[error("Network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// Non-2xx response
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Could not read attachment {}: {source}", path.display())]
    Attachment {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn missing_base_url(service: &'static str) -> Self {
        Self::MissingBaseUrl { service }
    }

    pub fn api_error(status: u16, message: String) -> Self {
        Self::Api { status, message }
    }
}
