use crate::domain::model::{AssessmentSubmission, ContactInfo, OutgoingMail};
use crate::utils::error::Result;
use askama::Template;
use indexmap::IndexMap;

pub const SUBJECT_PREFIX: &str = "KI-Reifegradanalyse Ergebnisse";

const MISSING: &str = "N/A";

#[derive(Clone, Copy)]
struct ContactBlock<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    company: &'a str,
}

impl<'a> From<&'a ContactInfo> for ContactBlock<'a> {
    fn from(info: &'a ContactInfo) -> Self {
        Self {
            name: info.name().unwrap_or(MISSING),
            email: info.email().unwrap_or(MISSING),
            phone: info.phone().unwrap_or(MISSING),
            company: info.company().unwrap_or(MISSING),
        }
    }
}

/// Caller text is written into the body as is, keys included.
#[derive(Template)]
#[template(path = "assessment_email.html", escape = "none")]
struct AssessmentEmail<'a> {
    timestamp: &'a str,
    contact: Option<ContactBlock<'a>>,
    total_score: f64,
    maturity_level: &'a str,
    scores: &'a IndexMap<String, f64>,
    insights: &'a IndexMap<String, String>,
    answers_json: String,
}

pub fn subject_for(submission: &AssessmentSubmission) -> String {
    format!("{} - {}", SUBJECT_PREFIX, submission.maturity_level)
}

/// Renders the HTML summary mail for a stamped submission.
pub fn render_email(submission: &AssessmentSubmission, timestamp: &str) -> Result<OutgoingMail> {
    let template = AssessmentEmail {
        timestamp,
        contact: submission.contact_info.as_ref().map(ContactBlock::from),
        total_score: submission.total_score,
        maturity_level: &submission.maturity_level,
        scores: &submission.scores,
        insights: &submission.insights,
        answers_json: serde_json::to_string_pretty(&submission.user_answers)?,
    };

    Ok(OutgoingMail {
        subject: subject_for(submission),
        body: template.render()?,
        is_html: true,
    })
}
