use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Outbound mail capability.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Sends one message. `recipient` may hold several comma separated
    /// addresses; `None` falls back to the sender's configured recipient.
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipient: Option<&str>,
        is_html: bool,
    ) -> Result<()>;

    /// Checks that the provider is reachable and accepts our credentials.
    /// Failures are logged and reported as `false`, never as an error.
    async fn test_connection(&self) -> bool;
}

/// Builds a [`MailSender`] on demand. Construction fails with a
/// configuration error when required settings are missing.
pub trait MailSenderFactory: Send + Sync {
    fn connect(&self) -> Result<Box<dyn MailSender>>;

    /// Human readable backend name reported by the health probe.
    fn backend_name(&self) -> &str;
}

pub trait Clock: Send + Sync {
    /// Current wall clock time in the server's local zone.
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
