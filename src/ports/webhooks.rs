use crate::domain::{AppError, ApplyOutcome};

/// Best-effort outbound notification of an apply outcome. Delivery errors
/// are logged by the caller, never surfaced in the command result.
pub trait WebhooksSender: Send + Sync {
    fn send(&self, outcome: &ApplyOutcome) -> Result<(), AppError>;
}
