use std::{sync::Arc, time::Duration};

use anyhow::Error;
use aws_config::{BehaviorVersion, Region, timeout::TimeoutConfig};
use aws_sdk_bedrockruntime::{Client, error::DisplayErrorContext, primitives::Blob};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, instrument};

use crate::{
    configuration::{GenerationConfig, LogoConfig},
    processors::logo::{
        backend::{BackendError, ImageBackend},
        structs::{InvokeModelRequest, InvokeModelResponse},
    },
};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Blocking handle on the Bedrock runtime API. Cloning shares the underlying
/// client and runtime.
#[derive(Clone)]
pub struct BedrockConnection {
    client: Client,
    runtime: Arc<Runtime>,
}

impl BedrockConnection {
    /// Resolves credentials through the default AWS provider chain.
    pub fn connect(region: &str, timeout: Duration) -> Result<Self, Error> {
        let runtime = Builder::new_current_thread().enable_all().build()?;

        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region.to_string()))
                .timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build())
                .load(),
        );
        debug!(region, timeout_secs = timeout.as_secs(), "loaded AWS configuration");

        Ok(BedrockConnection {
            client: Client::new(&sdk_config),
            runtime: Arc::new(runtime),
        })
    }

    pub fn backends(&self, config: &LogoConfig) -> Vec<Box<dyn ImageBackend>> {
        config
            .models
            .iter()
            .map(|model_id| {
                Box::new(BedrockBackend::new(model_id.clone(), self.clone()))
                    as Box<dyn ImageBackend>
            })
            .collect()
    }
}

impl InvokeModel for BedrockConnection {
    fn invoke(&self, call: InvokeCall) -> Result<Vec<u8>, BackendError> {
        let output = self
            .runtime
            .block_on(
                self.client
                    .invoke_model()
                    .model_id(call.model_id)
                    .content_type(call.content_type)
                    .accept(call.accept)
                    .body(Blob::new(call.body))
                    .send(),
            )
            .map_err(|e| BackendError::Request(DisplayErrorContext(&e).to_string()))?;

        Ok(output.body().as_ref().to_vec())
    }
}

/// One `InvokeModel` call as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeCall {
    pub model_id: String,
    pub content_type: &'static str,
    pub accept: &'static str,
    pub body: Vec<u8>,
}

pub trait InvokeModel {
    /// Returns the raw response body.
    fn invoke(&self, call: InvokeCall) -> Result<Vec<u8>, BackendError>;
}

pub struct BedrockBackend<C = BedrockConnection> {
    model_id: String,
    connection: C,
}

impl<C: InvokeModel> BedrockBackend<C> {
    pub fn new(model_id: String, connection: C) -> Self {
        BedrockBackend {
            model_id,
            connection,
        }
    }
}

impl<C: InvokeModel> ImageBackend for BedrockBackend<C> {
    fn id(&self) -> &str {
        &self.model_id
    }

    #[instrument(skip(self, prompt, config), fields(model = %self.model_id), level = "debug")]
    fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<Vec<u8>, BackendError> {
        let body = InvokeModelRequest::text_to_image(prompt, config).to_body()?;
        debug!(
            body_len = body.len(),
            quality = %config.quality,
            seed = config.seed,
            "invoking model"
        );

        let response_body = self.connection.invoke(InvokeCall {
            model_id: self.model_id.clone(),
            content_type: JSON_CONTENT_TYPE,
            accept: JSON_CONTENT_TYPE,
            body,
        })?;
        debug!(response_len = response_body.len(), "model responded");

        InvokeModelResponse::parse(&response_body)?.first_image()
    }
}
