use std::sync::Arc;

use convert_core::{
    ConversionOptions, ConversionRequest, ConversionResult, ConvertersResponse,
    HealthDetailedResponse, HealthResponse, ValidationRequest, ValidationResult, VersionResponse,
};
use serde::Serialize;

use crate::normalize::{normalize, parse_json};
use crate::transport::{ApiRequest, MultipartPayload, Transport, UploadFile};
use crate::{FailureKind, TransportError};

pub const CONVERT_PATH: &str = "/api/v1/convert/";
pub const VALIDATE_PATH: &str = "/api/v1/convert/validate";
pub const UPLOAD_PATH: &str = "/api/v1/upload/";
pub const CONVERTERS_PATH: &str = "/api/v1/info/converters";
pub const HEALTH_PATH: &str = "/health/";
pub const HEALTH_DETAILED_PATH: &str = "/health/detailed";
pub const VERSION_PATH: &str = "/version";

/// Typed view of the backend's HTTP contract.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn convert(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, TransportError> {
        let body = encode(request)?;
        normalize(self.transport.send(ApiRequest::post_json(CONVERT_PATH, body)).await)
    }

    pub async fn validate(
        &self,
        request: &ValidationRequest,
    ) -> Result<ValidationResult, TransportError> {
        let body = encode(request)?;
        normalize(self.transport.send(ApiRequest::post_json(VALIDATE_PATH, body)).await)
    }

    pub async fn upload_and_convert(
        &self,
        file: UploadFile,
        kind: &str,
        options: &ConversionOptions,
    ) -> Result<ConversionResult, TransportError> {
        let mut fields = Vec::with_capacity(options.len() + 1);
        fields.push(("type".to_string(), kind.to_string()));
        fields.extend(options.form_fields());
        let payload = MultipartPayload { file, fields };
        normalize(
            self.transport
                .send(ApiRequest::post_multipart(UPLOAD_PATH, payload))
                .await,
        )
    }

    pub async fn converters(&self) -> Result<ConvertersResponse, TransportError> {
        parse_json(self.transport.send(ApiRequest::get(CONVERTERS_PATH)).await?)
    }

    pub async fn health(&self) -> Result<HealthResponse, TransportError> {
        parse_json(self.transport.send(ApiRequest::get(HEALTH_PATH)).await?)
    }

    pub async fn health_detailed(&self) -> Result<HealthDetailedResponse, TransportError> {
        parse_json(self.transport.send(ApiRequest::get(HEALTH_DETAILED_PATH)).await?)
    }

    pub async fn version(&self) -> Result<VersionResponse, TransportError> {
        parse_json(self.transport.send(ApiRequest::get(VERSION_PATH)).await?)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<serde_json::Value, TransportError> {
    serde_json::to_value(value)
        .map_err(|err| TransportError::new(FailureKind::Encode, err.to_string()))
}
