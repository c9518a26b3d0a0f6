//! Converter client engine: HTTP transport, result normalization, operation
//! orchestration and the notification center.
mod api;
mod error;
mod normalize;
mod notify;
mod orchestrator;
mod persist;
mod session;
mod status;
mod transport;

pub use api::{
    ApiClient, CONVERTERS_PATH, CONVERT_PATH, HEALTH_DETAILED_PATH, HEALTH_PATH, UPLOAD_PATH,
    VALIDATE_PATH, VERSION_PATH,
};
pub use error::{ClientError, FailureKind, TransportError};
pub use normalize::{normalize, parse_json, StructuredOutcome};
pub use notify::{Clock, NotificationCenter};
pub use orchestrator::{DiscardEffects, EffectSink, Orchestrator};
pub use persist::{ensure_output_dir, save_generated_files, AtomicFileWriter, PersistError};
pub use session::ClientSession;
pub use status::{ServiceSnapshot, StatusTracker};
pub use transport::{
    ApiRequest, Method, MultipartPayload, ReqwestTransport, RequestBody, Transport,
    TransportSettings, UploadFile, DEFAULT_BASE_URL,
};
