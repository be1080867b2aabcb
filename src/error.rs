use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No language model client is configured")]
    ModelUnavailable,

    #[error("Model request failed: {0}")]
    ModelRequest(String),

    #[error("Model returned no usable content: {0}")]
    EmptyResponse(String),

    #[error("Model response does not match the analysis schema: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Local statistic '{name}' is not finite ({value})")]
    NonFiniteStatistic { name: &'static str, value: f64 },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[cfg(feature = "gemini")]
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(feature = "gemini")]
impl From<reqwest::Error> for AnalysisError {
    // The request URL is stripped so it never ends up in logs or reports.
    fn from(e: reqwest::Error) -> Self {
        AnalysisError::Http(e.without_url())
    }
}
