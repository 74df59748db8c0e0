pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{GraphMailClient, GraphMailerFactory};
pub use app::{router, AppState};
pub use config::{MailEnvironment, ServerOptions};
pub use core::service::AssessmentService;
pub use utils::error::{AppError, Result};
