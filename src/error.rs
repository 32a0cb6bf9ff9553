use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No API key configured for the explanation service. Set {env_var} to enable it.")]
    MissingCredential { env_var: &'static str },

    #[error("Failed to initialize HTTP client: {0}")]
    HttpClientInit(#[source] reqwest::Error),

    #[error("{message}")]
    Http {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{api}: {message}")]
    Api { api: String, message: String },

    #[error("Prompt template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AdvisorError {
    pub fn from_transport(err: reqwest::Error, timeout: std::time::Duration) -> Self {
        let message = if err.is_timeout() {
            format!("Request timed out after {timeout:?}")
        } else if err.is_connect() {
            format!("Connection failed: {err}")
        } else {
            format!("Request failed: {err}")
        };
        Self::Http {
            message,
            source: err,
        }
    }
}
