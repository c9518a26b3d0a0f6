//! Converter client core: wire types, option bag, pure state machine and
//! notification queue. No IO happens here.
mod effect;
mod msg;
mod notification;
mod options;
mod state;
mod types;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use notification::{
    Notification, NotificationId, NotificationQueue, NotificationRequest, Severity,
    AUTO_EXPIRE_DELAY,
};
pub use options::{ConversionOptions, OptionValue, ServiceType, NAMESPACE, REPLICAS, SERVICE_TYPE};
pub use state::{ConversionState, Generation, Operation, Target};
pub use types::{
    ConversionError, ConversionMetadata, ConversionRequest, ConversionResult, ConversionWarning,
    ConverterInfo, ConvertersResponse, GeneratedFile, HealthDetailedResponse, HealthResponse,
    MemoryUsage, ServiceStatus, SystemInfo, ValidationRequest, ValidationResult, VersionResponse,
    DOCKER_COMPOSE_KIND,
};
pub use update::update;
pub use view_model::ConversionView;
