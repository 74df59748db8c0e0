use crate::core::render::render_email;
use crate::domain::model::{AssessmentSubmission, HealthReport, SubmissionReceipt};
use crate::domain::ports::{Clock, MailSenderFactory};
use crate::utils::error::{AppError, Result};
use std::sync::Arc;

/// Format of the timestamp stamped onto submissions.
pub const SUBMISSION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const HEALTH_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Orchestrates one submission: stamp, render, hand over to the mail sender.
pub struct AssessmentService {
    mailers: Arc<dyn MailSenderFactory>,
    clock: Arc<dyn Clock>,
    default_recipient: Option<String>,
}

impl AssessmentService {
    pub fn new(
        mailers: Arc<dyn MailSenderFactory>,
        clock: Arc<dyn Clock>,
        default_recipient: Option<String>,
    ) -> Self {
        Self {
            mailers,
            clock,
            default_recipient,
        }
    }

    fn now(&self, format: &str) -> String {
        self.clock.now().format(format).to_string()
    }

    pub async fn submit(&self, mut submission: AssessmentSubmission) -> Result<SubmissionReceipt> {
        tracing::info!(
            total_score = submission.total_score,
            maturity_level = %submission.maturity_level,
            categories = submission.scores.len(),
            "New assessment submission received"
        );
        for (category, score) in &submission.scores {
            tracing::debug!("  - {}: {:.1}%", category, score);
        }

        let timestamp = submission
            .stamp(|| self.now(SUBMISSION_TIME_FORMAT))
            .to_string();

        let recipient = self.default_recipient.as_deref().ok_or_else(|| {
            AppError::config(
                "No recipient email specified and MAIL_RECIPIENT_ADDRESS is not set",
            )
        })?;

        if let Some(contact) = &submission.contact_info {
            tracing::info!(
                "Contact: {} - {}",
                contact.name().unwrap_or("No name"),
                contact.email().unwrap_or("No email")
            );
        } else {
            tracing::info!("Anonymous submission");
        }

        let mailer = self.mailers.connect()?;
        if !mailer.test_connection().await {
            return Err(AppError::connection("Failed to connect to email server"));
        }

        let mail = render_email(&submission, &timestamp)?;
        tracing::info!("Sending assessment email to {}", recipient);
        mailer
            .send(&mail.subject, &mail.body, Some(recipient), mail.is_html)
            .await?;

        tracing::info!("Assessment email delivered");
        Ok(SubmissionReceipt::sent(timestamp))
    }

    /// Liveness plus a best-effort mail connectivity check. Never fails: a
    /// mail client that cannot be built is reported inside the payload.
    pub async fn health(&self) -> serde_json::Value {
        let timestamp = self.now(HEALTH_TIME_FORMAT);

        let email_status = match self.mailers.connect() {
            Ok(mailer) => {
                if mailer.test_connection().await {
                    "connected".to_string()
                } else {
                    "disconnected".to_string()
                }
            }
            Err(e) => {
                tracing::warn!("Health check could not build mail client: {}", e);
                format!("error: {}", e)
            }
        };

        let report = HealthReport {
            status: "healthy".to_string(),
            timestamp: timestamp.clone(),
            email_backend: self.mailers.backend_name().to_string(),
            email_status,
        };

        serde_json::to_value(&report).unwrap_or_else(|e| {
            tracing::error!("Health check failed: {}", e);
            serde_json::json!({
                "status": "unhealthy",
                "timestamp": timestamp,
                "error": e.to_string(),
            })
        })
    }
}

/// Logs a server-side failure with everything needed to diagnose it. Only the
/// message is ever returned to the client.
pub fn log_failure(context: &str, error: &AppError) {
    tracing::error!(
        category = ?error.category(),
        chain = ?error.source_chain(),
        "{}: {}",
        context,
        error
    );
    tracing::error!("Error detail: {:?}", error);
}
