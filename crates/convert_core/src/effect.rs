use crate::NotificationRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Surface a notification to the user.
    Notify(NotificationRequest),
}
