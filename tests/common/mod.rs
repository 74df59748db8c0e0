#![allow(dead_code)]

use assessment_mailer::domain::ports::{FixedClock, MailSender, MailSenderFactory};
use assessment_mailer::{router, AppError, AppState, AssessmentService};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const RECIPIENT: &str = "sales@contoso.com";

/// 測試用的假郵件服務行為
#[derive(Debug, Clone)]
pub enum Behavior {
    Succeed,
    Disconnected,
    FailSend(String),
    FailConstruct,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub subject: String,
    pub body: String,
    pub recipient: Option<String>,
    pub is_html: bool,
}

#[derive(Default)]
pub struct Recorder {
    pub sent: Mutex<Vec<SentMail>>,
    pub probes: AtomicUsize,
    pub constructions: AtomicUsize,
}

impl Recorder {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }
}

struct FakeMailer {
    behavior: Behavior,
    recorder: Arc<Recorder>,
}

#[async_trait]
impl MailSender for FakeMailer {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        recipient: Option<&str>,
        is_html: bool,
    ) -> assessment_mailer::Result<()> {
        if let Behavior::FailSend(message) = &self.behavior {
            return Err(AppError::DeliveryError {
                status: 500,
                body: message.clone(),
            });
        }
        self.recorder.sent.lock().unwrap().push(SentMail {
            subject: subject.to_string(),
            body: body.to_string(),
            recipient: recipient.map(str::to_string),
            is_html,
        });
        Ok(())
    }

    async fn test_connection(&self) -> bool {
        self.recorder.probes.fetch_add(1, Ordering::SeqCst);
        !matches!(self.behavior, Behavior::Disconnected)
    }
}

pub struct FakeFactory {
    pub behavior: Behavior,
    pub recorder: Arc<Recorder>,
}

impl MailSenderFactory for FakeFactory {
    fn connect(&self) -> assessment_mailer::Result<Box<dyn MailSender>> {
        self.recorder.constructions.fetch_add(1, Ordering::SeqCst);
        if let Behavior::FailConstruct = self.behavior {
            return Err(AppError::MissingConfigError {
                field: "MAIL_TENANT_ID".to_string(),
            });
        }
        Ok(Box::new(FakeMailer {
            behavior: self.behavior.clone(),
            recorder: self.recorder.clone(),
        }))
    }

    fn backend_name(&self) -> &str {
        "Fake mailbox"
    }
}

pub fn frozen_clock() -> FixedClock {
    FixedClock(
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(10, 15, 30)
            .unwrap(),
    )
}

pub fn static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static")
}

pub fn test_app_with(behavior: Behavior, recipient: Option<&str>) -> (Router, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let factory = FakeFactory {
        behavior,
        recorder: recorder.clone(),
    };
    let service = AssessmentService::new(
        Arc::new(factory),
        Arc::new(frozen_clock()),
        recipient.map(str::to_string),
    );
    (router(AppState::new(service), &static_dir()), recorder)
}

pub fn test_app(behavior: Behavior) -> (Router, Arc<Recorder>) {
    test_app_with(behavior, Some(RECIPIENT))
}

pub fn example_payload() -> serde_json::Value {
    serde_json::json!({
        "scores": {"A": 80.0},
        "totalScore": 80.0,
        "maturityLevel": "Advanced",
        "insights": {"A": "Keep going"},
        "userAnswers": {"q1": "yes"}
    })
}

pub async fn post_json(app: Router, uri: &str, body: String) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
