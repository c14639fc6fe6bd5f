//! Questionnaire state machine — tracks which step a respondent is on.

use serde::{Deserialize, Serialize};

use super::prompts;

/// The steps of the intake conversation.
///
/// Progresses linearly: AwaitingConsent → Initials → Age → Gestation →
/// Symptoms → Conditions → PrenatalVisits → BloodPressure → Weight →
/// Height → Habits → EducationOffer → FollowUp.
///
/// Persisted as its ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStep {
    AwaitingConsent,
    Initials,
    Age,
    Gestation,
    Symptoms,
    Conditions,
    PrenatalVisits,
    BloodPressure,
    Weight,
    Height,
    Habits,
    EducationOffer,
    FollowUp,
}

impl IntakeStep {
    const ALL: [IntakeStep; 13] = [
        Self::AwaitingConsent,
        Self::Initials,
        Self::Age,
        Self::Gestation,
        Self::Symptoms,
        Self::Conditions,
        Self::PrenatalVisits,
        Self::BloodPressure,
        Self::Weight,
        Self::Height,
        Self::Habits,
        Self::EducationOffer,
        Self::FollowUp,
    ];

    /// Look up a step by its persisted ordinal.
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// The persisted ordinal of this step.
    pub fn ordinal(&self) -> i64 {
        *self as i64
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<IntakeStep> {
        Self::from_ordinal(self.ordinal() + 1)
    }

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: IntakeStep) -> bool {
        self.next() == Some(target)
    }

    /// Whether this step is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FollowUp)
    }

    /// Whether this step asks one of the numbered questionnaire questions.
    pub fn is_question(&self) -> bool {
        (Self::Initials.ordinal()..=Self::Habits.ordinal()).contains(&self.ordinal())
    }

    /// Question text for question steps.
    pub fn prompt(&self) -> Option<&'static str> {
        let text = match self {
            Self::Initials => prompts::Q_INITIALS,
            Self::Age => prompts::Q_AGE,
            Self::Gestation => prompts::Q_GESTATION,
            Self::Symptoms => prompts::Q_SYMPTOMS,
            Self::Conditions => prompts::Q_CONDITIONS,
            Self::PrenatalVisits => prompts::Q_PRENATAL_VISITS,
            Self::BloodPressure => prompts::Q_BLOOD_PRESSURE,
            Self::Weight => prompts::Q_WEIGHT,
            Self::Height => prompts::Q_HEIGHT,
            Self::Habits => prompts::Q_HABITS,
            Self::AwaitingConsent | Self::EducationOffer | Self::FollowUp => return None,
        };
        Some(text)
    }
}

impl std::fmt::Display for IntakeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AwaitingConsent => "awaiting_consent",
            Self::Initials => "initials",
            Self::Age => "age",
            Self::Gestation => "gestation",
            Self::Symptoms => "symptoms",
            Self::Conditions => "conditions",
            Self::PrenatalVisits => "prenatal_visits",
            Self::BloodPressure => "blood_pressure",
            Self::Weight => "weight",
            Self::Height => "height",
            Self::Habits => "habits",
            Self::EducationOffer => "education_offer",
            Self::FollowUp => "follow_up",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_roundtrip() {
        for (i, step) in IntakeStep::ALL.iter().enumerate() {
            assert_eq!(step.ordinal(), i as i64);
            assert_eq!(IntakeStep::from_ordinal(i as i64), Some(*step));
        }
        assert_eq!(IntakeStep::from_ordinal(13), None);
        assert_eq!(IntakeStep::from_ordinal(-1), None);
    }

    #[test]
    fn next_walks_all_steps() {
        let mut current = IntakeStep::AwaitingConsent;
        let mut visited = 1;
        while let Some(next) = current.next() {
            assert!(current.can_transition_to(next));
            current = next;
            visited += 1;
        }
        assert_eq!(visited, 13);
        assert!(current.is_terminal());
    }

    #[test]
    fn invalid_transitions() {
        use IntakeStep::*;
        assert!(!AwaitingConsent.can_transition_to(Age));
        assert!(!Weight.can_transition_to(BloodPressure));
        assert!(!Habits.can_transition_to(Habits));
        assert!(!FollowUp.can_transition_to(AwaitingConsent));
    }

    #[test]
    fn only_question_steps_have_prompts() {
        for step in IntakeStep::ALL {
            assert_eq!(step.is_question(), step.prompt().is_some(), "{step}");
        }
        assert!(IntakeStep::Initials.prompt().unwrap().starts_with("1)"));
        assert!(IntakeStep::Habits.prompt().unwrap().starts_with("10)"));
    }

    #[test]
    fn display_matches_serde() {
        for step in IntakeStep::ALL {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{step}\""), json);
        }
    }
}
