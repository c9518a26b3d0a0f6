use std::collections::BTreeMap;

use crate::view_model::ConversionView;
use crate::{ConversionResult, ConverterInfo, GeneratedFile, ValidationResult};

/// Sequence number of a state-writing operation. Only the latest one per target may settle.
pub type Generation = u64;

/// Slot of the state an operation's settlement writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Target {
    Conversion,
    Validation,
    Catalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Convert,
    Validate,
    UploadAndConvert,
    LoadConverters,
}

impl Operation {
    /// Message recorded when a failure carries nothing better.
    pub fn failure_default(self) -> &'static str {
        match self {
            Operation::Convert => "Conversion failed",
            Operation::Validate => "Validation failed",
            Operation::UploadAndConvert => "Upload and conversion failed",
            Operation::LoadConverters => "Failed to load converters",
        }
    }

    pub fn target(self) -> Target {
        match self {
            Operation::Convert | Operation::UploadAndConvert => Target::Conversion,
            Operation::Validate => Target::Validation,
            Operation::LoadConverters => Target::Catalog,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Operation::Convert => "Conversion",
            Operation::Validate => "Validation",
            Operation::UploadAndConvert => "Upload",
            Operation::LoadConverters => "Converter catalog",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversionState {
    last_error: Option<String>,
    current_conversion: Option<ConversionResult>,
    validation_result: Option<ValidationResult>,
    converters: Option<Vec<ConverterInfo>>,
    latest_generation: Generation,
    latest_by_target: BTreeMap<Target, Generation>,
    in_flight: BTreeMap<Generation, Operation>,
    dirty: bool,
}

impl ConversionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> ConversionView {
        ConversionView {
            is_loading: self.is_loading(),
            last_error: self.last_error.clone(),
            has_result: self.has_result(),
            succeeded: self.succeeded(),
            has_errors: self.has_errors(),
            has_warnings: self.has_warnings(),
            generated_files: self.generated_files().to_vec(),
            validation: self.validation_result.clone(),
            validation_failed: self.validation_failed(),
            in_flight: self.in_flight(),
            converters: self.converters.clone().unwrap_or_default(),
        }
    }

    /// Generation the next started operation must carry.
    pub fn next_generation(&self) -> Generation {
        self.latest_generation + 1
    }

    pub fn latest_generation(&self) -> Generation {
        self.latest_generation
    }

    /// Whether `generation` is the newest start that writes the same target as `operation`.
    pub fn is_current(&self, generation: Generation, operation: Operation) -> bool {
        self.latest_by_target.get(&operation.target()) == Some(&generation)
    }

    /// True while any operation that may still write state has not settled.
    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Most recently started operation that is still in flight.
    pub fn in_flight(&self) -> Option<Operation> {
        self.in_flight.values().next_back().copied()
    }

    pub fn in_flight_operations(&self) -> Vec<Operation> {
        self.in_flight.values().copied().collect()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn current_conversion(&self) -> Option<&ConversionResult> {
        self.current_conversion.as_ref()
    }

    pub fn validation_result(&self) -> Option<&ValidationResult> {
        self.validation_result.as_ref()
    }

    pub fn converters(&self) -> Option<&[ConverterInfo]> {
        self.converters.as_deref()
    }

    pub fn has_result(&self) -> bool {
        self.current_conversion.is_some()
    }

    pub fn succeeded(&self) -> bool {
        self.current_conversion
            .as_ref()
            .is_some_and(|result| result.success)
    }

    pub fn has_errors(&self) -> bool {
        self.current_conversion
            .as_ref()
            .is_some_and(|result| !result.errors.is_empty())
    }

    pub fn has_warnings(&self) -> bool {
        self.current_conversion
            .as_ref()
            .is_some_and(|result| !result.warnings.is_empty())
    }

    pub fn generated_files(&self) -> &[GeneratedFile] {
        self.current_conversion
            .as_ref()
            .map(|result| result.files.as_slice())
            .unwrap_or_default()
    }

    pub fn validation_failed(&self) -> bool {
        self.validation_result
            .as_ref()
            .is_some_and(|result| !result.valid)
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Registers a start. An older operation on the same target becomes stale and stops
    /// counting towards `is_loading`.
    pub(crate) fn start(&mut self, generation: Generation, operation: Operation) {
        let target = operation.target();
        self.latest_generation = generation;
        self.latest_by_target.insert(target, generation);
        self.in_flight.retain(|_, running| running.target() != target);
        self.in_flight.insert(generation, operation);
        self.last_error = None;
        self.dirty = true;
    }

    /// Ends one in-flight operation. Unknown generations are ignored.
    pub(crate) fn settle(&mut self, generation: Generation) {
        if self.in_flight.remove(&generation).is_some() {
            self.dirty = true;
        }
    }

    pub(crate) fn set_conversion(&mut self, result: ConversionResult) {
        self.current_conversion = Some(result);
        self.dirty = true;
    }

    pub(crate) fn set_validation(&mut self, result: ValidationResult) {
        self.validation_result = Some(result);
        self.dirty = true;
    }

    pub(crate) fn set_converters(&mut self, converters: Vec<ConverterInfo>) {
        self.converters = Some(converters);
        self.dirty = true;
    }

    pub(crate) fn set_error(&mut self, message: String) {
        self.last_error = Some(message);
        self.dirty = true;
    }

    pub(crate) fn clear_error(&mut self) {
        if self.last_error.take().is_some() {
            self.dirty = true;
        }
    }

    pub(crate) fn clear_results(&mut self) {
        self.current_conversion = None;
        self.validation_result = None;
        self.last_error = None;
        self.dirty = true;
    }
}
