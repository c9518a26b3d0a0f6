use convert_core::{update, ConversionResult, ConversionState, Msg, Operation, ValidationResult};

fn start(state: ConversionState, operation: Operation) -> (ConversionState, u64) {
    let generation = state.next_generation();
    let (state, _) = update(
        state,
        Msg::OperationStarted {
            generation,
            operation,
        },
    );
    (state, generation)
}

fn result(request_id: &str) -> ConversionResult {
    ConversionResult {
        success: true,
        files: Vec::new(),
        errors: Vec::new(),
        warnings: Vec::new(),
        metadata: None,
        request_id: request_id.to_string(),
    }
}

#[test]
fn stale_settlement_is_ignored() {
    let (state, first) = start(ConversionState::new(), Operation::Convert);
    let (state, second) = start(state, Operation::Convert);
    assert_eq!(second, first + 1);

    // Second finishes first.
    let (state, effects) = update(
        state,
        Msg::ConversionSettled {
            generation: second,
            operation: Operation::Convert,
            result: result("second"),
        },
    );
    assert_eq!(effects.len(), 1);
    assert!(!state.is_loading());

    // First finishes late and must not overwrite.
    let (state, effects) = update(
        state,
        Msg::ConversionSettled {
            generation: first,
            operation: Operation::Convert,
            result: result("first"),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.current_conversion().unwrap().request_id, "second");
}

#[test]
fn stale_failure_keeps_newer_operation_loading() {
    let (state, first) = start(ConversionState::new(), Operation::Convert);
    let (state, _second) = start(state, Operation::UploadAndConvert);

    let (state, effects) = update(
        state,
        Msg::OperationFailed {
            generation: first,
            operation: Operation::Convert,
            message: "timeout".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert!(state.is_loading());
    assert_eq!(state.in_flight(), Some(Operation::UploadAndConvert));
    assert_eq!(state.last_error(), None);
}

fn valid() -> ValidationResult {
    ValidationResult {
        valid: true,
        message: "File is valid".to_string(),
        errors: Vec::new(),
    }
}

#[test]
fn validation_settles_beside_running_conversion() {
    let (state, convert) = start(ConversionState::new(), Operation::Convert);
    let (state, validate) = start(state, Operation::Validate);
    assert_eq!(
        state.in_flight_operations(),
        vec![Operation::Convert, Operation::Validate]
    );

    let (state, effects) = update(
        state,
        Msg::ValidationSettled {
            generation: validate,
            result: valid(),
        },
    );
    assert_eq!(effects.len(), 1);
    assert!(state.validation_result().is_some());
    assert!(state.is_loading());
    assert_eq!(state.in_flight(), Some(Operation::Convert));

    let (state, effects) = update(
        state,
        Msg::ConversionSettled {
            generation: convert,
            operation: Operation::Convert,
            result: result("convert"),
        },
    );
    assert_eq!(effects.len(), 1);
    assert!(!state.is_loading());
    assert_eq!(state.current_conversion().unwrap().request_id, "convert");
    assert!(state.validation_result().is_some());
}

#[test]
fn conversion_failure_leaves_validation_running() {
    let (state, convert) = start(ConversionState::new(), Operation::Convert);
    let (state, validate) = start(state, Operation::Validate);

    let (state, _) = update(
        state,
        Msg::OperationFailed {
            generation: convert,
            operation: Operation::Convert,
            message: "Conversion failed: timeout".to_string(),
        },
    );
    assert!(state.is_loading());
    assert_eq!(state.in_flight(), Some(Operation::Validate));
    assert_eq!(state.last_error(), Some("Conversion failed: timeout"));

    let (state, _) = update(
        state,
        Msg::ValidationSettled {
            generation: validate,
            result: valid(),
        },
    );
    assert!(!state.is_loading());
}

#[test]
fn abandoned_operation_releases_loading_once() {
    let (state, first) = start(ConversionState::new(), Operation::Convert);
    let (state, _) = update(state, Msg::OperationAbandoned { generation: first });
    assert!(!state.is_loading());

    // A settlement carrying another target's generation is not current for validation.
    let (state, effects) = update(
        state,
        Msg::ValidationSettled {
            generation: first,
            result: valid(),
        },
    );
    assert!(effects.is_empty());
    assert!(!state.is_loading());
    assert_eq!(state.validation_result(), None);

    let (state, _) = update(state, Msg::OperationAbandoned { generation: first });
    assert!(!state.is_loading());
}

#[test]
fn replayed_start_is_rejected() {
    let (state, first) = start(ConversionState::new(), Operation::Convert);
    let (state, _) = update(
        state,
        Msg::ConversionSettled {
            generation: first,
            operation: Operation::Convert,
            result: result("done"),
        },
    );
    let (state, _) = update(
        state,
        Msg::OperationStarted {
            generation: first,
            operation: Operation::Convert,
        },
    );
    assert!(!state.is_loading());
    assert_eq!(state.latest_generation(), first);
}
