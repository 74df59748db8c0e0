use assessment_mailer::domain::ports::MailSender;
use assessment_mailer::utils::logger;
use assessment_mailer::{GraphMailClient, MailEnvironment};
use clap::Parser;
use std::path::PathBuf;

/// 檢查郵件設定：連線、寄送測試信、列出收件匣
#[derive(Debug, Parser)]
#[command(name = "mail_check")]
#[command(about = "Verifies mail credentials by probing the mailbox and sending a test message")]
struct CheckOptions {
    #[arg(long, default_value = "mailer.toml")]
    env_file: PathBuf,

    #[arg(long, help = "Override MAIL_RECIPIENT_ADDRESS (comma separated)")]
    to: Option<String>,

    #[arg(long, help = "Skip sending the test message")]
    no_send: bool,

    #[arg(long, default_value = "0", help = "List this many recent inbox messages")]
    inbox: usize,

    #[arg(long)]
    verbose: bool,
}

fn test_body(client: &GraphMailClient, recipients: &str, timestamp: &str) -> String {
    format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; padding: 20px;">
    <h2>Test Email - Mail API OAuth Integration</h2>
    <p><strong>Timestamp:</strong> {timestamp}</p>
    <ul>
      <li><strong>From:</strong> {from}</li>
      <li><strong>To:</strong> {recipients}</li>
      <li><strong>Server:</strong> {server}</li>
    </ul>
    <p style="color: green; font-weight: bold;">OAuth integration working.</p>
  </body>
</html>"#,
        from = client.sender_address(),
        server = client.server_url(),
    )
}

async fn run(options: &CheckOptions) -> assessment_mailer::Result<()> {
    let env = MailEnvironment::load(Some(options.env_file.as_path()));
    env.log_summary();

    let client = GraphMailClient::new(&env)?;

    if !client.test_connection().await {
        return Err(assessment_mailer::AppError::connection(
            "Connection test failed, check credentials and mailbox permissions",
        ));
    }

    if !options.no_send {
        let recipients = options
            .to
            .clone()
            .or_else(|| env.recipient_address.clone())
            .unwrap_or_default();
        let now = chrono::Local::now();
        let subject = format!("Mail API OAuth Test - {}", now.format("%Y-%m-%d %H:%M"));
        let body = test_body(&client, &recipients, &now.format("%Y-%m-%d %H:%M:%S").to_string());

        tracing::info!("Sending test email to {}", recipients);
        client
            .send_message(&subject, &body, Some(recipients.as_str()).filter(|r| !r.is_empty()), true)
            .await?;
        tracing::info!("Test email sent");
    }

    if options.inbox > 0 {
        for message in client.read_inbox(options.inbox).await? {
            tracing::info!("  - {} (from: {})", message.subject, message.from);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let options = CheckOptions::parse();
    logger::init_logger(options.verbose);

    match run(&options).await {
        Ok(()) => {
            tracing::info!("✅ Mail check passed");
            println!("✅ Mail check passed");
        }
        Err(e) => {
            tracing::error!("❌ Mail check failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}
