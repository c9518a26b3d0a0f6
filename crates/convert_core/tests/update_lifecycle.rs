use std::sync::Once;

use convert_core::{
    update, ConversionError, ConversionResult, ConversionState, ConversionWarning, Effect,
    GeneratedFile, Msg, NotificationRequest, Operation, Severity, ValidationResult,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn start(state: ConversionState, operation: Operation) -> (ConversionState, u64) {
    let generation = state.next_generation();
    let (state, effects) = update(
        state,
        Msg::OperationStarted {
            generation,
            operation,
        },
    );
    assert!(effects.is_empty());
    (state, generation)
}

fn nginx_result() -> ConversionResult {
    ConversionResult {
        success: true,
        files: vec![GeneratedFile {
            name: "web-deployment.yaml".to_string(),
            content: "kind: Deployment".to_string(),
            kind: "deployment".to_string(),
            path: "web-deployment.yaml".to_string(),
        }],
        errors: Vec::new(),
        warnings: Vec::new(),
        metadata: None,
        request_id: "abc".to_string(),
    }
}

#[test]
fn idle_state_has_no_results() {
    init_logging();
    let state = ConversionState::new();
    let view = state.view();

    assert!(!view.is_loading);
    assert!(!view.has_result);
    assert!(!view.succeeded);
    assert!(view.generated_files.is_empty());
    assert_eq!(view.last_error, None);
}

#[test]
fn successful_conversion_sets_derived_flags() {
    init_logging();
    let (state, generation) = start(ConversionState::new(), Operation::Convert);
    assert!(state.is_loading());
    assert_eq!(state.in_flight(), Some(Operation::Convert));

    let (mut state, effects) = update(
        state,
        Msg::ConversionSettled {
            generation,
            operation: Operation::Convert,
            result: nginx_result(),
        },
    );
    let view = state.view();

    assert!(!view.is_loading);
    assert!(view.has_result);
    assert!(view.succeeded);
    assert!(!view.has_errors);
    assert_eq!(view.generated_files.len(), 1);
    assert_eq!(view.in_flight, None);
    assert!(state.consume_dirty());
    assert_eq!(
        effects,
        vec![Effect::Notify(NotificationRequest::success(
            "Conversion succeeded",
            "1 file generated"
        ))]
    );
}

#[test]
fn domain_failure_is_stored_as_result_not_error() {
    init_logging();
    let (state, generation) = start(ConversionState::new(), Operation::Convert);
    let result = ConversionResult {
        success: false,
        files: Vec::new(),
        errors: vec![ConversionError::new("PARSE_ERROR", "invalid YAML")],
        warnings: vec![ConversionWarning {
            code: "W1".to_string(),
            message: "deprecated key".to_string(),
            line: None,
            field: None,
            suggestion: None,
        }],
        metadata: None,
        request_id: String::new(),
    };

    let (state, effects) = update(
        state,
        Msg::ConversionSettled {
            generation,
            operation: Operation::Convert,
            result,
        },
    );

    assert!(state.has_result());
    assert!(!state.succeeded());
    assert!(state.has_errors());
    assert!(state.has_warnings());
    assert_eq!(state.last_error(), None);
    assert_eq!(effects.len(), 2);
    assert_eq!(
        effects[0],
        Effect::Notify(NotificationRequest::error("Conversion failed", "invalid YAML"))
    );
    let Effect::Notify(warning) = &effects[1];
    assert_eq!(warning.severity, Severity::Warning);
}

#[test]
fn empty_successful_result_derives_empty_file_list() {
    init_logging();
    let (state, generation) = start(ConversionState::new(), Operation::UploadAndConvert);
    let result = ConversionResult {
        files: Vec::new(),
        ..nginx_result()
    };

    let (state, effects) = update(
        state,
        Msg::ConversionSettled {
            generation,
            operation: Operation::UploadAndConvert,
            result,
        },
    );

    assert!(state.succeeded());
    assert!(state.generated_files().is_empty());
    assert_eq!(
        effects,
        vec![Effect::Notify(NotificationRequest::success(
            "Upload succeeded",
            "No Kubernetes manifests were generated"
        ))]
    );
}

#[test]
fn failure_records_message_and_stops_loading() {
    init_logging();
    let (state, generation) = start(ConversionState::new(), Operation::Validate);
    let (state, effects) = update(
        state,
        Msg::OperationFailed {
            generation,
            operation: Operation::Validate,
            message: "Validation failed: network error".to_string(),
        },
    );

    assert!(!state.is_loading());
    assert_eq!(state.last_error(), Some("Validation failed: network error"));
    assert_eq!(
        effects,
        vec![Effect::Notify(NotificationRequest::error(
            "Validation error",
            "Validation failed: network error"
        ))]
    );

    // The next start clears the previous error.
    let (state, _) = start(state, Operation::Convert);
    assert_eq!(state.last_error(), None);
    assert!(state.is_loading());
}

#[test]
fn invalid_validation_result_is_data() {
    init_logging();
    let (state, generation) = start(ConversionState::new(), Operation::Validate);
    let (state, effects) = update(
        state,
        Msg::ValidationSettled {
            generation,
            result: ValidationResult {
                valid: false,
                message: "Validation failed".to_string(),
                errors: vec!["content is empty".to_string()],
            },
        },
    );

    assert!(state.validation_failed());
    assert!(!state.is_loading());
    assert_eq!(state.last_error(), None);
    assert_eq!(
        effects,
        vec![Effect::Notify(NotificationRequest::error(
            "Validation failed",
            "content is empty"
        ))]
    );
}

#[test]
fn converter_catalog_does_not_touch_loading() {
    init_logging();
    let state = ConversionState::new();
    let (state, effects) = update(state, Msg::ConvertersLoaded(Vec::new()));
    assert!(effects.is_empty());
    assert!(!state.is_loading());
    assert_eq!(state.converters(), Some(&[][..]));

    let (state, _) = start(state, Operation::Convert);
    let (state, effects) = update(
        state,
        Msg::ConvertersFailed {
            message: "Failed to load converters".to_string(),
        },
    );
    assert!(state.is_loading());
    assert_eq!(state.last_error(), Some("Failed to load converters"));
    assert_eq!(effects.len(), 1);
}

#[test]
fn clear_resets_results_and_error() {
    init_logging();
    let (state, generation) = start(ConversionState::new(), Operation::Convert);
    let (state, _) = update(
        state,
        Msg::ConversionSettled {
            generation,
            operation: Operation::Convert,
            result: nginx_result(),
        },
    );
    let (state, _) = update(
        state,
        Msg::InputRejected {
            operation: Operation::Convert,
            message: "content is empty".to_string(),
        },
    );
    assert_eq!(state.last_error(), Some("content is empty"));

    let (state, effects) = update(state, Msg::ClearRequested);
    assert!(effects.is_empty());
    assert!(!state.has_result());
    assert_eq!(state.validation_result(), None);
    assert_eq!(state.last_error(), None);
}

#[test]
fn rejection_during_conversion_only_notifies() {
    init_logging();
    let (state, generation) = start(ConversionState::new(), Operation::Convert);
    let (state, effects) = update(
        state,
        Msg::InputRejected {
            operation: Operation::Validate,
            message: "content is empty".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify(NotificationRequest::warning(
            "Validation not submitted",
            "content is empty"
        ))]
    );
    assert_eq!(state.last_error(), None);

    let (state, _) = update(
        state,
        Msg::ConversionSettled {
            generation,
            operation: Operation::Convert,
            result: nginx_result(),
        },
    );
    assert!(state.view().succeeded);
    assert_eq!(state.last_error(), None);
}

#[test]
fn dismissing_error_keeps_result() {
    init_logging();
    let (state, generation) = start(ConversionState::new(), Operation::Convert);
    let (state, _) = update(
        state,
        Msg::ConversionSettled {
            generation,
            operation: Operation::Convert,
            result: nginx_result(),
        },
    );
    let (state, _) = update(
        state,
        Msg::ConvertersFailed {
            message: "boom".to_string(),
        },
    );
    let (mut state, _) = update(state, Msg::ErrorDismissed);

    assert_eq!(state.last_error(), None);
    assert!(state.has_result());
    assert!(state.consume_dirty());
    let (mut state, _) = update(state, Msg::ErrorDismissed);
    assert!(!state.consume_dirty());
}
