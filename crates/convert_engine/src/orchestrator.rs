use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use client_logging::{client_debug, client_warn};
use convert_core::{
    update, ConversionOptions, ConversionRequest, ConversionResult, ConversionState,
    ConversionView, ConverterInfo, ConvertersResponse, Effect, GeneratedFile, Generation, Msg,
    Operation, ValidationRequest, ValidationResult,
};
use tokio::sync::watch;

use crate::transport::UploadFile;
use crate::{ApiClient, ClientError, TransportError};

/// Receives effects produced by state transitions (notifications).
pub trait EffectSink: Send + Sync {
    fn dispatch(&self, effect: Effect);
}

/// Sink for orchestrators that run without a notification center.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardEffects;

impl EffectSink for DiscardEffects {
    fn dispatch(&self, _effect: Effect) {}
}

/// Drives convert/validate/upload calls and owns their shared state.
///
/// Cheap to clone; clones share state. The state lock is only held for
/// synchronous transitions, never across a request.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    state: Mutex<ConversionState>,
    views: watch::Sender<ConversionView>,
    sink: Arc<dyn EffectSink>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, ConversionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Builds a message from the current state and applies it atomically.
    fn dispatch_with(&self, build: impl FnOnce(&ConversionState) -> Msg) {
        let (effects, view) = {
            let mut guard = self.lock();
            let msg = build(&guard);
            let state = std::mem::take(&mut *guard);
            let (mut state, effects) = update(state, msg);
            let view = state.consume_dirty().then(|| state.view());
            *guard = state;
            (effects, view)
        };

        if let Some(view) = view {
            self.views.send_replace(view);
        }
        for effect in effects {
            self.sink.dispatch(effect);
        }
    }

    fn dispatch(&self, msg: Msg) {
        self.dispatch_with(move |_| msg);
    }
}

/// Marks one in-flight operation. Dropping it unsettled releases the loading flag.
struct InFlight {
    inner: Arc<Inner>,
    generation: Generation,
    operation: Operation,
    settled: bool,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.settled {
            client_warn!(
                "{:?} generation {} dropped before settling",
                self.operation,
                self.generation
            );
            self.inner.dispatch(Msg::OperationAbandoned {
                generation: self.generation,
            });
        }
    }
}

impl Orchestrator {
    pub fn new(api: ApiClient) -> Self {
        Self::with_sink(api, Arc::new(DiscardEffects))
    }

    pub fn with_sink(api: ApiClient, sink: Arc<dyn EffectSink>) -> Self {
        let state = ConversionState::new();
        let (views, _) = watch::channel(state.view());
        Self {
            inner: Arc::new(Inner {
                api,
                state: Mutex::new(state),
                views,
                sink,
            }),
        }
    }

    pub async fn convert(
        &self,
        request: ConversionRequest,
    ) -> Result<ConversionResult, ClientError> {
        if !request.has_content() {
            return Err(self.reject(Operation::Convert));
        }
        let flight = self.begin(Operation::Convert);
        let outcome = self.inner.api.convert(&request).await;
        self.settle(flight, outcome, |generation, result| Msg::ConversionSettled {
            generation,
            operation: Operation::Convert,
            result,
        })
    }

    /// Validation of empty content is left to the backend.
    pub async fn validate(
        &self,
        request: ValidationRequest,
    ) -> Result<ValidationResult, ClientError> {
        let flight = self.begin(Operation::Validate);
        let outcome = self.inner.api.validate(&request).await;
        self.settle(flight, outcome, |generation, result| Msg::ValidationSettled {
            generation,
            result,
        })
    }

    pub async fn upload_and_convert(
        &self,
        file: UploadFile,
        kind: &str,
        options: &ConversionOptions,
    ) -> Result<ConversionResult, ClientError> {
        if file.is_blank() {
            return Err(self.reject(Operation::UploadAndConvert));
        }
        let flight = self.begin(Operation::UploadAndConvert);
        let outcome = self.inner.api.upload_and_convert(file, kind, options).await;
        self.settle(flight, outcome, |generation, result| Msg::ConversionSettled {
            generation,
            operation: Operation::UploadAndConvert,
            result,
        })
    }

    /// Fetches the converter catalog. Runs beside conversions without touching `is_loading`.
    pub async fn load_converters(&self) -> Result<ConvertersResponse, ClientError> {
        match self.inner.api.converters().await {
            Ok(response) => {
                client_debug!("loaded {} converters", response.converters.len());
                self.inner.dispatch(Msg::ConvertersLoaded(response.converters.clone()));
                Ok(response)
            }
            Err(err) => {
                let message = failure_message(Operation::LoadConverters, &err);
                client_warn!("converter catalog failed: {}", err);
                self.inner.dispatch(Msg::ConvertersFailed { message });
                Err(err.into())
            }
        }
    }

    /// Returns the cached catalog, loading it on first use.
    pub async fn ensure_converters(&self) -> Result<Vec<ConverterInfo>, ClientError> {
        if let Some(cached) = self.converters_cached() {
            return Ok(cached);
        }
        Ok(self.load_converters().await?.converters)
    }

    pub fn clear(&self) {
        self.inner.dispatch(Msg::ClearRequested);
    }

    pub fn clear_error(&self) {
        self.inner.dispatch(Msg::ErrorDismissed);
    }

    pub fn view(&self) -> ConversionView {
        self.inner.lock().view()
    }

    /// Receives a fresh view after every state change.
    pub fn subscribe(&self) -> watch::Receiver<ConversionView> {
        self.inner.views.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().is_loading()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error().map(ToOwned::to_owned)
    }

    pub fn current_conversion(&self) -> Option<ConversionResult> {
        self.inner.lock().current_conversion().cloned()
    }

    pub fn validation_result(&self) -> Option<ValidationResult> {
        self.inner.lock().validation_result().cloned()
    }

    pub fn has_result(&self) -> bool {
        self.inner.lock().has_result()
    }

    pub fn succeeded(&self) -> bool {
        self.inner.lock().succeeded()
    }

    pub fn has_errors(&self) -> bool {
        self.inner.lock().has_errors()
    }

    pub fn has_warnings(&self) -> bool {
        self.inner.lock().has_warnings()
    }

    pub fn generated_files(&self) -> Vec<GeneratedFile> {
        self.inner.lock().generated_files().to_vec()
    }

    pub fn converters(&self) -> Vec<ConverterInfo> {
        self.converters_cached().unwrap_or_default()
    }

    fn converters_cached(&self) -> Option<Vec<ConverterInfo>> {
        self.inner
            .lock()
            .converters()
            .map(<[ConverterInfo]>::to_vec)
    }

    fn begin(&self, operation: Operation) -> InFlight {
        let mut generation = 0;
        self.inner.dispatch_with(|state| {
            generation = state.next_generation();
            Msg::OperationStarted {
                generation,
                operation,
            }
        });
        client_debug!("{:?} started as generation {}", operation, generation);
        InFlight {
            inner: self.inner.clone(),
            generation,
            operation,
            settled: false,
        }
    }

    fn settle<T: Clone>(
        &self,
        mut flight: InFlight,
        outcome: Result<T, TransportError>,
        settled: impl FnOnce(Generation, T) -> Msg,
    ) -> Result<T, ClientError> {
        flight.settled = true;
        let (generation, operation) = (flight.generation, flight.operation);
        if !self.inner.lock().is_current(generation, operation) {
            client_debug!(
                "{:?} generation {} settled after a newer request; state left untouched",
                operation,
                generation
            );
        }
        match outcome {
            Ok(value) => {
                self.inner.dispatch(settled(generation, value.clone()));
                Ok(value)
            }
            Err(err) => {
                let message = failure_message(operation, &err);
                client_warn!("{:?} failed: {}", operation, err);
                self.inner.dispatch(Msg::OperationFailed {
                    generation,
                    operation,
                    message,
                });
                Err(err.into())
            }
        }
    }

    fn reject(&self, operation: Operation) -> ClientError {
        let err = ClientError::EmptyContent;
        self.inner.dispatch(Msg::InputRejected {
            operation,
            message: err.to_string(),
        });
        err
    }
}

/// Prefers the server's own explanation, else a per-operation default.
fn failure_message(operation: Operation, err: &TransportError) -> String {
    err.server_message()
        .unwrap_or_else(|| format!("{}: {}", operation.failure_default(), err.kind))
}
