use anyhow::Context;
use assessment_mailer::adapters::GraphMailerFactory;
use assessment_mailer::domain::ports::SystemClock;
use assessment_mailer::utils::logger;
use assessment_mailer::{router, AppState, AssessmentService, MailEnvironment, ServerOptions};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = ServerOptions::parse();

    // 初始化日誌
    if options.json_logs {
        logger::init_json_logger(options.verbose);
    } else {
        logger::init_logger(options.verbose);
    }

    tracing::info!("Starting assessment-mailer");
    if options.verbose {
        tracing::debug!("Server options: {:?}", options);
    }

    // 環境變數優先，設定檔只補缺
    let mail_env = MailEnvironment::load(Some(options.env_file.as_path()));
    mail_env.log_summary();

    let default_recipient = mail_env.recipient_address.clone();
    let mailers = Arc::new(GraphMailerFactory::new(Arc::new(mail_env)));
    let service = AssessmentService::new(mailers, Arc::new(SystemClock), default_recipient);
    let app = router(AppState::new(service), &options.static_dir);

    let addr = options.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
