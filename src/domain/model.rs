use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One survey result as posted by the front end.
///
/// `scores` and `insights` keep the order the caller sent them in, since the
/// email lists categories in that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSubmission {
    pub scores: IndexMap<String, f64>,
    pub total_score: f64,
    pub maturity_level: String,
    pub insights: IndexMap<String, String>,
    #[serde(default)]
    pub contact_info: Option<ContactInfo>,
    pub user_answers: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl AssessmentSubmission {
    /// Sets the timestamp unless the caller already supplied one and returns
    /// the value now in effect.
    pub fn stamp(&mut self, now: impl FnOnce() -> String) -> &str {
        self.timestamp.get_or_insert_with(now)
    }
}

/// Free-form contact details. Only `name`, `email`, `phone` and `company` are
/// rendered; other keys are accepted and ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ContactInfo(pub HashMap<String, String>);

impl ContactInfo {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    pub fn email(&self) -> Option<&str> {
        self.get("email")
    }

    pub fn phone(&self) -> Option<&str> {
        self.get("phone")
    }

    pub fn company(&self) -> Option<&str> {
        self.get("company")
    }
}

/// A fully rendered message ready for the mail collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub subject: String,
    pub body: String,
    pub is_html: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

impl SubmissionReceipt {
    pub fn sent(timestamp: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: "Assessment results sent successfully".to_string(),
            timestamp: timestamp.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: String,
    pub email_backend: String,
    pub email_status: String,
}

/// Short listing of a mailbox item, used by the operator tooling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InboxSummary {
    pub subject: String,
    pub from: String,
    pub received: Option<String>,
    pub preview: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> serde_json::Value {
        serde_json::json!({
            "scores": {"Strategie": 62.5, "Daten": 40, "Kultur": 81.25},
            "totalScore": 61.25,
            "maturityLevel": "Fortgeschritten",
            "insights": {"Strategie": "Roadmap schärfen", "Daten": "Datenqualität prüfen"},
            "userAnswers": {"q1": "yes", "q2": ["a", "b"]}
        })
    }

    #[test]
    fn test_deserialize_keeps_caller_order() {
        let submission: AssessmentSubmission = serde_json::from_value(sample_json()).unwrap();
        let keys: Vec<&str> = submission.scores.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Strategie", "Daten", "Kultur"]);
        assert_eq!(submission.scores["Daten"], 40.0);
        assert!(submission.contact_info.is_none());
        assert!(submission.timestamp.is_none());
    }

    #[test]
    fn test_missing_total_score_is_rejected() {
        let mut value = sample_json();
        value.as_object_mut().unwrap().remove("totalScore");
        let err = serde_json::from_value::<AssessmentSubmission>(value).unwrap_err();
        assert!(err.to_string().contains("totalScore"));
    }

    #[test]
    fn test_non_numeric_score_is_rejected() {
        let mut value = sample_json();
        value["scores"]["Daten"] = serde_json::json!("viel");
        assert!(serde_json::from_value::<AssessmentSubmission>(value).is_err());
    }

    #[test]
    fn test_stamp_sets_only_once() {
        let mut submission: AssessmentSubmission = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(submission.stamp(|| "2025-03-01 10:00:00".to_string()), "2025-03-01 10:00:00");
        assert_eq!(submission.stamp(|| "2030-01-01 00:00:00".to_string()), "2025-03-01 10:00:00");
    }

    #[test]
    fn test_contact_info_accessors() {
        let mut value = sample_json();
        value["contactInfo"] = serde_json::json!({"name": "Erika Muster", "company": "ACME"});
        let submission: AssessmentSubmission = serde_json::from_value(value).unwrap();
        let contact = submission.contact_info.as_ref().unwrap();
        assert_eq!(contact.name(), Some("Erika Muster"));
        assert_eq!(contact.company(), Some("ACME"));
        assert_eq!(contact.phone(), None);
    }
}
