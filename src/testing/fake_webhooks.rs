use std::sync::Mutex;

use crate::domain::{AppError, ApplyOutcome};
use crate::ports::WebhooksSender;

/// Records sent apply outcomes; can be told to fail delivery.
#[derive(Default)]
pub struct FakeWebhooksSender {
    pub sent: Mutex<Vec<ApplyOutcome>>,
    fail: Mutex<bool>,
}

impl FakeWebhooksSender {
    pub fn fail_next(&self) {
        *self.fail.lock().unwrap() = true;
    }
}

impl WebhooksSender for FakeWebhooksSender {
    fn send(&self, outcome: &ApplyOutcome) -> Result<(), AppError> {
        let mut fail = self.fail.lock().unwrap();
        if *fail {
            *fail = false;
            return Err(AppError::api_error("posting webhook", "500 Internal Server Error"));
        }
        self.sent.lock().unwrap().push(outcome.clone());
        Ok(())
    }
}
