//! Intake answers, sessions, and stored response records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::risk::RiskLevel;
use super::state::IntakeStep;

/// Symptom ids offered by question 4.
pub const SYMPTOM_OPTIONS: u8 = 7;
/// Condition ids offered by question 5.
pub const CONDITION_OPTIONS: u8 = 4;

/// Answers collected so far. Missing fields were not asked yet or skipped.
///
/// Stored as JSON, both in the session while in progress and in the final
/// response record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntakeAnswers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gestational_weeks: Option<u32>,
    #[serde(default)]
    pub symptom_ids: Vec<u8>,
    #[serde(default)]
    pub condition_ids: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prenatal_visits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bp_systolic: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bp_diastolic: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    /// Current tobacco or alcohol use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tobacco_alcohol: Option<bool>,
}

impl IntakeAnswers {
    pub fn has_symptom(&self, id: u8) -> bool {
        self.symptom_ids.contains(&id)
    }

    pub fn has_condition(&self, id: u8) -> bool {
        self.condition_ids.contains(&id)
    }

    /// Both blood pressure readings, when given.
    pub fn blood_pressure(&self) -> Option<(u32, u32)> {
        self.bp_systolic.zip(self.bp_diastolic)
    }

    /// BP at or above 140/90.
    pub fn has_elevated_bp(&self) -> bool {
        self.blood_pressure()
            .is_some_and(|(sys, dia)| sys >= 140 || dia >= 90)
    }

    pub fn has_high_bmi(&self) -> bool {
        self.bmi.is_some_and(|bmi| bmi >= 30.0)
    }

    /// Recompute BMI from weight and height; cleared if either is missing.
    pub fn refresh_bmi(&mut self) {
        self.bmi = match (self.weight_kg, self.height_m) {
            (Some(w), Some(h)) if h > 0.0 => Some(super::parse::bmi(w, h)),
            _ => None,
        };
    }
}

/// In-progress conversation state for one respondent.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Session key: the sender's phone number without the `whatsapp:` prefix.
    pub phone: String,
    /// Raw persisted step ordinal; see [`Session::step`].
    pub step_ordinal: i64,
    pub answers: IntakeAnswers,
    pub consented: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// A fresh session waiting for consent.
    pub fn new(phone: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            phone: phone.into(),
            step_ordinal: IntakeStep::AwaitingConsent.ordinal(),
            answers: IntakeAnswers::default(),
            consented: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The current step, or `None` if the stored ordinal is unknown.
    pub fn step(&self) -> Option<IntakeStep> {
        IntakeStep::from_ordinal(self.step_ordinal)
    }

    pub fn set_step(&mut self, step: IntakeStep) {
        self.step_ordinal = step.ordinal();
    }
}

/// A completed questionnaire, one row per completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    pub id: i64,
    pub phone: String,
    pub answers: IntakeAnswers,
    pub risk_level: RiskLevel,
    pub gestational_weeks: Option<u32>,
    pub consented: bool,
    pub created_at: DateTime<Utc>,
}

/// A response about to be inserted (no id yet).
#[derive(Debug, Clone)]
pub struct NewResponse<'a> {
    pub phone: &'a str,
    pub answers: &'a IntakeAnswers,
    pub risk_level: RiskLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_answers_serialize_compactly() {
        let json = serde_json::to_value(IntakeAnswers::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"symptom_ids": [], "condition_ids": []})
        );
    }

    #[test]
    fn answers_tolerate_missing_fields() {
        let answers: IntakeAnswers = serde_json::from_str(r#"{"age": 30}"#).unwrap();
        assert_eq!(answers.age, Some(30));
        assert!(answers.symptom_ids.is_empty());
        assert!(answers.bmi.is_none());
    }

    #[test]
    fn refresh_bmi_needs_both_measurements() {
        let mut answers = IntakeAnswers {
            weight_kg: Some(70.0),
            ..Default::default()
        };
        answers.refresh_bmi();
        assert!(answers.bmi.is_none());

        answers.height_m = Some(1.6);
        answers.refresh_bmi();
        assert_eq!(answers.bmi, Some(27.3));

        answers.weight_kg = None;
        answers.refresh_bmi();
        assert!(answers.bmi.is_none());
    }

    #[test]
    fn elevated_bp_requires_both_readings() {
        let mut answers = IntakeAnswers {
            bp_systolic: Some(150),
            ..Default::default()
        };
        assert!(!answers.has_elevated_bp());
        answers.bp_diastolic = Some(70);
        assert!(answers.has_elevated_bp());
        answers.bp_systolic = Some(120);
        answers.bp_diastolic = Some(90);
        assert!(answers.has_elevated_bp());
        answers.bp_diastolic = Some(80);
        assert!(!answers.has_elevated_bp());
    }

    #[test]
    fn new_session_awaits_consent() {
        let session = Session::new("+5511999990000");
        assert_eq!(session.step(), Some(IntakeStep::AwaitingConsent));
        assert!(!session.consented);
    }
}
