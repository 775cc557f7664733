//! Outbound apply-result notifications, delivered as JSON POSTs.

use std::time::Duration;

use reqwest::blocking::Client;
use url::Url;

use crate::domain::{AppError, ApplyOutcome};
use crate::ports::WebhooksSender;

pub struct HttpWebhooksSender {
    client: Client,
    urls: Vec<Url>,
}

impl HttpWebhooksSender {
    pub fn new(urls: Vec<Url>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        HttpWebhooksSender { client, urls }
    }
}

impl WebhooksSender for HttpWebhooksSender {
    fn send(&self, outcome: &ApplyOutcome) -> Result<(), AppError> {
        let mut errors: Vec<String> = Vec::new();
        for url in &self.urls {
            let result = self.client.post(url.clone()).json(outcome).send();
            match result {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    errors.push(format!("{url}: status {}", response.status()));
                }
                Err(e) => errors.push(format!("{url}: {e}")),
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::api_error("posting apply webhook", errors.join("; ")))
        }
    }
}
