// Adapters layer: concrete implementations for external systems.

pub mod graph;
pub mod token;

pub use graph::{parse_recipients, GraphMailClient, GraphMailerFactory};
pub use token::ClientCredentialsProvider;
