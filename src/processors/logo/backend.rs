use thiserror::Error;

use crate::configuration::GenerationConfig;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("response is not valid JSON: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("model rejected the request: {0}")]
    Rejected(String),
    #[error("response contained no images")]
    EmptyResponse,
    #[error("image payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// A remote model that turns a prompt into encoded image bytes.
pub trait ImageBackend {
    /// Identifier shown in progress messages, usually the model id.
    fn id(&self) -> &str;

    fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<Vec<u8>, BackendError>;
}
