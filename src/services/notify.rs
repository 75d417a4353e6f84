//! Review-result notification dispatch.
//!
//! Runs strictly after the finalize transaction commits. Failures are
//! logged and never propagated back into the review flow.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::ReviewResultNotification;

#[async_trait]
pub trait ReviewNotifier: Send + Sync {
    async fn notify(&self, payload: &ReviewResultNotification) -> AppResult<()>;
}

/// Posts the payload as JSON to a configured webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl ReviewNotifier for WebhookNotifier {
    async fn notify(&self, payload: &ReviewResultNotification) -> AppResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Notification webhook unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Storage(format!(
                "Notification webhook returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Fallback when no webhook is configured: the outcome only hits the log.
pub struct LogNotifier;

#[async_trait]
impl ReviewNotifier for LogNotifier {
    async fn notify(&self, payload: &ReviewResultNotification) -> AppResult<()> {
        info!(
            ficha_id = %payload.ficha_id,
            student = %payload.student_email,
            approved = payload.approved,
            rejected_fields = payload.rejected_fields.len(),
            "Review result (no webhook configured)"
        );
        Ok(())
    }
}

/// Pick the notifier implied by the configuration.
pub fn from_config(config: &Config) -> Box<dyn ReviewNotifier> {
    match config.notify_webhook_url {
        Some(ref url) => Box::new(WebhookNotifier::new(url.clone())),
        None => Box::new(LogNotifier),
    }
}

/// Fire a notification, logging any failure.
pub async fn dispatch(notifier: &dyn ReviewNotifier, payload: &ReviewResultNotification) {
    if let Err(e) = notifier.notify(payload).await {
        warn!(
            ficha_id = %payload.ficha_id,
            error = %e,
            "Review notification failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct FailingNotifier;

    #[async_trait]
    impl ReviewNotifier for FailingNotifier {
        async fn notify(&self, _payload: &ReviewResultNotification) -> AppResult<()> {
            Err(AppError::Storage("webhook down".to_string()))
        }
    }

    fn payload() -> ReviewResultNotification {
        ReviewResultNotification {
            ficha_id: Uuid::nil(),
            student_email: "ana@uni.cl".to_string(),
            approved: false,
            rejected_fields: Vec::new(),
            global_notes: None,
            dashboard_link: "http://localhost:3000/ficha".to_string(),
        }
    }

    #[test]
    fn test_dispatch_swallows_notifier_failure() {
        tokio_test::block_on(dispatch(&FailingNotifier, &payload()));
    }

    #[test]
    fn test_log_notifier_always_succeeds() {
        let result = tokio_test::block_on(LogNotifier.notify(&payload()));
        assert!(result.is_ok());
    }
}
