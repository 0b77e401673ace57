use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::{configuration::GenerationConfig, processors::logo::backend::BackendError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    TextImage,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextToImageParams<'a> {
    pub text: &'a str,
}

/// Body of a Bedrock `InvokeModel` call for the Nova Canvas / Titan image
/// family.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvokeModelRequest<'a> {
    pub task_type: TaskType,
    pub text_to_image_params: TextToImageParams<'a>,
    pub image_generation_config: &'a GenerationConfig,
}

impl<'a> InvokeModelRequest<'a> {
    pub fn text_to_image(prompt: &'a str, config: &'a GenerationConfig) -> Self {
        InvokeModelRequest {
            task_type: TaskType::TextImage,
            text_to_image_params: TextToImageParams { text: prompt },
            image_generation_config: config,
        }
    }

    pub fn to_body(&self) -> Result<Vec<u8>, BackendError> {
        serde_json::to_vec(self).map_err(BackendError::Encode)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct InvokeModelResponse {
    /// Base64 encoded images, one per requested image.
    #[serde(default)]
    pub images: Vec<String>,
    /// Set by the model when it refuses the request (e.g. content filters).
    #[serde(default)]
    pub error: Option<String>,
}

impl InvokeModelResponse {
    pub fn parse(body: &[u8]) -> Result<Self, BackendError> {
        serde_json::from_slice(body).map_err(BackendError::MalformedResponse)
    }

    /// Decodes the first image of the response; the rest are ignored.
    pub fn first_image(&self) -> Result<Vec<u8>, BackendError> {
        if let Some(message) = self.error.as_ref().filter(|m| !m.is_empty()) {
            return Err(BackendError::Rejected(message.clone()));
        }

        let encoded = self.images.first().ok_or(BackendError::EmptyResponse)?;

        Ok(STANDARD.decode(encoded)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_matches_bedrock_schema() {
        let config = GenerationConfig::default();
        let request = InvokeModelRequest::text_to_image("a ghost", &config);

        let value: serde_json::Value = serde_json::from_slice(&request.to_body().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "taskType": "TEXT_IMAGE",
                "textToImageParams": { "text": "a ghost" },
                "imageGenerationConfig": {
                    "numberOfImages": 1,
                    "quality": "standard",
                    "height": 1024,
                    "width": 1024,
                    "cfgScale": 8.0,
                    "seed": 42
                }
            })
        );
    }

    #[test]
    fn first_image_is_decoded() {
        let body = json!({ "images": [STANDARD.encode(b"png-bytes"), STANDARD.encode(b"other")] });
        let response = InvokeModelResponse::parse(body.to_string().as_bytes()).unwrap();

        assert_eq!(response.first_image().unwrap(), b"png-bytes".to_vec());
    }

    #[test]
    fn empty_image_list_is_reported() {
        let response = InvokeModelResponse::parse(br#"{"images": []}"#).unwrap();

        assert!(matches!(response.first_image(), Err(BackendError::EmptyResponse)));
    }

    #[test]
    fn model_error_field_is_reported() {
        let response =
            InvokeModelResponse::parse(br#"{"images": [], "error": "blocked by filter"}"#).unwrap();

        match response.first_image() {
            Err(BackendError::Rejected(message)) => assert_eq!(message, "blocked by filter"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn invalid_base64_is_a_decode_error() {
        let response = InvokeModelResponse::parse(br#"{"images": ["***not base64***"]}"#).unwrap();

        assert!(matches!(response.first_image(), Err(BackendError::Decode(_))));
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(matches!(
            InvokeModelResponse::parse(b"<html>oops</html>"),
            Err(BackendError::MalformedResponse(_))
        ));
    }
}
