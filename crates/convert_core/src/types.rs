use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ConversionOptions;

/// Kind sent by default for pasted or uploaded Compose documents.
pub const DOCKER_COMPOSE_KIND: &str = "docker-compose";

/// Body of `POST /api/v1/convert/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub options: ConversionOptions,
}

impl ConversionRequest {
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
            options: ConversionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether the request carries something worth submitting.
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<GeneratedFile>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub errors: Vec<ConversionError>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub warnings: Vec<ConversionWarning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ConversionMetadata>,
    #[serde(default)]
    pub request_id: String,
}

impl ConversionResult {
    /// Looks up a generated file by its relative path.
    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|file| file.path == path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub name: String,
    pub content: String,
    /// Manifest kind as reported by the backend (deployment, service, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub path: String,
}

impl GeneratedFile {
    /// Relative output path, falling back to the bare name when the backend sent none.
    pub fn path_or_name(&self) -> &str {
        if self.path.trim().is_empty() {
            &self.name
        } else {
            &self.path
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionError {
    #[serde(default)]
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ConversionError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            line: None,
            column: None,
            field: None,
            suggestion: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionWarning {
    #[serde(default)]
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Conversion statistics; unknown keys (e.g. `uploaded_file`) are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services_converted: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes_converted: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Body of `POST /api/v1/convert/validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

impl ValidationRequest {
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default)]
    pub message: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "supported_types", default)]
    pub supported_kinds: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ConverterInfo {
    pub fn supports(&self, kind: &str) -> bool {
        self.supported_kinds.iter().any(|k| k.eq_ignore_ascii_case(kind))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertersResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub converters: Vec<ConverterInfo>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthDetailedResponse {
    #[serde(flatten)]
    pub health: HealthResponse,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub uptime: String,
    #[serde(default)]
    pub system: SystemInfo,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(default)]
    pub go_version: String,
    #[serde(default)]
    pub num_goroutine: u64,
    #[serde(default)]
    pub num_cpu: u64,
    #[serde(default)]
    pub memory_usage: MemoryUsage,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryUsage {
    #[serde(default)]
    pub alloc: u64,
    #[serde(default)]
    pub total_alloc: u64,
    #[serde(default)]
    pub sys: u64,
    #[serde(default)]
    pub num_gc: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub go_version: String,
    #[serde(default)]
    pub build_time: String,
    #[serde(default)]
    pub git_commit: String,
    #[serde(default)]
    pub environment: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn conversion_result_reads_backend_shape() {
        let body = json!({
            "success": true,
            "files": [{
                "name": "web-deployment.yaml",
                "content": "kind: Deployment",
                "type": "deployment",
                "path": "deployments/web-deployment.yaml"
            }],
            "metadata": {
                "services_converted": 1,
                "volumes_converted": 0,
                "uploaded_file": {"filename": "docker-compose.yml"}
            },
            "request_id": "abc"
        });
        let result: ConversionResult = serde_json::from_value(body).unwrap();

        assert!(result.success);
        assert_eq!(result.request_id, "abc");
        assert_eq!(result.files[0].kind, "deployment");
        assert!(result.file("deployments/web-deployment.yaml").is_some());
        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.services_converted, Some(1));
        assert!(metadata.extra.contains_key("uploaded_file"));
    }

    #[test]
    fn missing_and_null_lists_become_empty() {
        let result: ConversionResult =
            serde_json::from_value(json!({"success": true, "files": null})).unwrap();
        assert!(result.files.is_empty());
        assert!(result.errors.is_empty());
        assert!(result.request_id.is_empty());
    }

    #[test]
    fn blank_path_falls_back_to_name() {
        let file: GeneratedFile = serde_json::from_value(json!({
            "name": "web-service.yaml",
            "content": "kind: Service"
        }))
        .unwrap();
        assert_eq!(file.path_or_name(), "web-service.yaml");
    }

    #[test]
    fn request_serializes_kind_as_type() {
        let request = ConversionRequest::new(DOCKER_COMPOSE_KIND, "services: {}");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"type": "docker-compose", "content": "services: {}", "options": {}})
        );
    }

    #[test]
    fn whitespace_only_content_is_not_submittable() {
        assert!(!ConversionRequest::new(DOCKER_COMPOSE_KIND, "  \n\t").has_content());
        assert!(ConversionRequest::new(DOCKER_COMPOSE_KIND, "services:").has_content());
    }

    #[test]
    fn detailed_health_tolerates_partial_payload() {
        let health: HealthDetailedResponse = serde_json::from_value(json!({
            "status": "ok",
            "message": "Service is healthy",
            "services": {
                "converters": {"status": "ok", "message": "All converters are available"}
            }
        }))
        .unwrap();
        assert!(health.health.is_ok());
        assert_eq!(health.services["converters"].status, "ok");
        assert_eq!(health.system, SystemInfo::default());
    }

    #[test]
    fn converter_support_check_ignores_case() {
        let info: ConverterInfo = serde_json::from_value(json!({
            "name": "docker-compose-to-kubernetes",
            "description": "Compose to k8s",
            "supported_types": ["docker-compose"]
        }))
        .unwrap();
        assert!(info.supports("Docker-Compose"));
        assert!(!info.supports("dockerfile"));
    }
}
