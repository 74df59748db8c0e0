pub mod mail;

pub use mail::{MailEnvironment, MailSettings};

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "assessment-mailer")]
#[command(about = "Receives self-assessment results and forwards them by email")]
pub struct ServerOptions {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, default_value = "8000")]
    pub port: u16,

    #[arg(long, default_value = "static", help = "Directory holding index.html and assets")]
    pub static_dir: PathBuf,

    #[arg(
        long,
        default_value = "mailer.toml",
        help = "Optional settings file; never overrides variables already set"
    )]
    pub env_file: PathBuf,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl ServerOptions {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ServerOptions::parse_from(["assessment-mailer"]);
        assert_eq!(options.bind_address(), "0.0.0.0:8000");
        assert_eq!(options.static_dir, PathBuf::from("static"));
        assert_eq!(options.env_file, PathBuf::from("mailer.toml"));
        assert!(!options.verbose);
    }

    #[test]
    fn test_overrides() {
        let options = ServerOptions::parse_from([
            "assessment-mailer",
            "--port",
            "9090",
            "--host",
            "127.0.0.1",
            "--json-logs",
        ]);
        assert_eq!(options.bind_address(), "127.0.0.1:9090");
        assert!(options.json_logs);
    }
}
