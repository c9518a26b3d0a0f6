use crate::{
    ConversionResult, ConversionState, Effect, Msg, NotificationRequest, Operation,
    ValidationResult,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Settlement messages whose generation is no longer the latest for their target
/// are dropped without touching state, so an older request can never overwrite a
/// newer one. Operations on different targets settle independently.
pub fn update(mut state: ConversionState, msg: Msg) -> (ConversionState, Vec<Effect>) {
    let effects = match msg {
        Msg::OperationStarted {
            generation,
            operation,
        } => {
            if generation <= state.latest_generation() {
                return (state, Vec::new());
            }
            state.start(generation, operation);
            Vec::new()
        }
        Msg::ConversionSettled {
            generation,
            operation,
            result,
        } => {
            if !state.is_current(generation, operation) {
                return (state, Vec::new());
            }
            let effects = conversion_notifications(operation, &result);
            state.set_conversion(result);
            state.settle(generation);
            effects
        }
        Msg::ValidationSettled { generation, result } => {
            if !state.is_current(generation, Operation::Validate) {
                return (state, Vec::new());
            }
            let effects = vec![Effect::Notify(validation_notification(&result))];
            state.set_validation(result);
            state.settle(generation);
            effects
        }
        Msg::OperationFailed {
            generation,
            operation,
            message,
        } => {
            if !state.is_current(generation, operation) {
                return (state, Vec::new());
            }
            state.set_error(message.clone());
            state.settle(generation);
            vec![Effect::Notify(NotificationRequest::error(
                format!("{} error", operation.label()),
                message,
            ))]
        }
        Msg::OperationAbandoned { generation } => {
            state.settle(generation);
            Vec::new()
        }
        Msg::ConvertersLoaded(converters) => {
            state.set_converters(converters);
            Vec::new()
        }
        Msg::ConvertersFailed { message } => {
            state.set_error(message.clone());
            vec![Effect::Notify(NotificationRequest::error(
                format!("{} error", Operation::LoadConverters.label()),
                message,
            ))]
        }
        Msg::InputRejected { operation, message } => {
            // A running operation owns `last_error` until it settles.
            if !state.is_loading() {
                state.set_error(message.clone());
            }
            vec![Effect::Notify(NotificationRequest::warning(
                format!("{} not submitted", operation.label()),
                message,
            ))]
        }
        Msg::ClearRequested => {
            state.clear_results();
            Vec::new()
        }
        Msg::ErrorDismissed => {
            state.clear_error();
            Vec::new()
        }
    };

    (state, effects)
}

fn conversion_notifications(operation: Operation, result: &ConversionResult) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(2);
    if result.success {
        let message = match result.files.len() {
            0 => "No Kubernetes manifests were generated".to_string(),
            1 => "1 file generated".to_string(),
            n => format!("{n} files generated"),
        };
        effects.push(Effect::Notify(NotificationRequest::success(
            format!("{} succeeded", operation.label()),
            message,
        )));
    } else {
        let message = result
            .errors
            .first()
            .map(|error| error.message.clone())
            .unwrap_or_else(|| operation.failure_default().to_string());
        effects.push(Effect::Notify(NotificationRequest::error(
            format!("{} failed", operation.label()),
            message,
        )));
    }
    if !result.warnings.is_empty() {
        effects.push(Effect::Notify(NotificationRequest::warning(
            "Conversion warnings",
            format!("{} warning(s) reported", result.warnings.len()),
        )));
    }
    effects
}

fn validation_notification(result: &ValidationResult) -> NotificationRequest {
    if result.valid {
        NotificationRequest::success("Validation passed", result.message.clone())
    } else {
        let message = if result.errors.is_empty() {
            result.message.clone()
        } else {
            result.errors.join("; ")
        };
        NotificationRequest::error("Validation failed", message)
    }
}
