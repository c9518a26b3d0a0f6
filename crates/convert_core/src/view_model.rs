use crate::{ConverterInfo, GeneratedFile, Operation, ValidationResult};

/// Read-only snapshot handed to presentation code.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversionView {
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub has_result: bool,
    pub succeeded: bool,
    pub has_errors: bool,
    pub has_warnings: bool,
    pub generated_files: Vec<GeneratedFile>,
    pub validation: Option<ValidationResult>,
    pub validation_failed: bool,
    pub in_flight: Option<Operation>,
    pub converters: Vec<ConverterInfo>,
}
