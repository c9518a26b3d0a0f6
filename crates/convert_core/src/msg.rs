use crate::{ConversionResult, ConverterInfo, Generation, Operation, ValidationResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// A convert/validate/upload request is about to be sent.
    OperationStarted {
        generation: Generation,
        operation: Operation,
    },
    /// A convert or upload call produced a typed result (successful or not).
    ConversionSettled {
        generation: Generation,
        operation: Operation,
        result: ConversionResult,
    },
    /// A validate call produced a typed result.
    ValidationSettled {
        generation: Generation,
        result: ValidationResult,
    },
    /// A call failed below the application level.
    OperationFailed {
        generation: Generation,
        operation: Operation,
        message: String,
    },
    /// The caller stopped waiting before the call settled.
    OperationAbandoned { generation: Generation },
    /// Catalog fetched; does not touch the loading flag.
    ConvertersLoaded(Vec<ConverterInfo>),
    /// Catalog fetch failed.
    ConvertersFailed { message: String },
    /// A submission was refused before any request was built.
    InputRejected { operation: Operation, message: String },
    /// User cleared the current conversion, validation and error.
    ClearRequested,
    /// User dismissed the current error only.
    ErrorDismissed,
}
