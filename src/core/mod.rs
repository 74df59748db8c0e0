pub mod render;
pub mod service;

pub use crate::domain::model::{AssessmentSubmission, OutgoingMail, SubmissionReceipt};
pub use crate::domain::ports::{Clock, MailSender, MailSenderFactory};
pub use crate::utils::error::Result;
