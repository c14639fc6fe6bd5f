//! Risk classification, evaluated once when the last question is answered.

use serde::{Deserialize, Serialize};

use super::model::IntakeAnswers;

/// Symptoms that call for immediate care: bleeding, severe abdominal pain,
/// fever, severe headache/visual changes/sudden swelling, absent fetal
/// movements.
pub const SEVERE_SYMPTOMS: [u8; 5] = [1, 2, 3, 4, 6];

/// Symptom id for absent fetal movements.
const ABSENT_FETAL_MOVEMENT: u8 = 6;

/// Condition ids counted as comorbidities (hypertension, diabetes, UTI).
const COMORBIDITIES: [u8; 3] = [1, 2, 3];

/// Triage category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "EMERGENTE")]
    Emergent,
    #[serde(rename = "PRIORITÁRIO")]
    Priority,
    #[serde(rename = "ROTINA")]
    Routine,
}

impl RiskLevel {
    /// Label shown to respondents and written to the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergent => "EMERGENTE",
            Self::Priority => "PRIORITÁRIO",
            Self::Routine => "ROTINA",
        }
    }

    /// Call to action appended to the classification message.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Emergent => "➡️ Procure um serviço de *emergência agora* ou ligue *192 (SAMU)*.",
            Self::Priority => "➡️ Procure *avaliação na sua unidade* ainda hoje/amanhã.",
            Self::Routine => "➡️ Mantenha seu *acompanhamento de rotina*.",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMERGENTE" => Ok(Self::Emergent),
            "PRIORITÁRIO" => Ok(Self::Priority),
            "ROTINA" => Ok(Self::Routine),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

/// A risk level together with the reasons that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub level: RiskLevel,
    pub rationale: String,
}

/// Classify the collected answers.
pub fn classify(answers: &IntakeAnswers) -> Assessment {
    if SEVERE_SYMPTOMS.iter().any(|id| answers.has_symptom(*id)) {
        return Assessment {
            level: RiskLevel::Emergent,
            rationale: "Sintoma(s) de alerta reportado(s). Orientar ida IMEDIATA ao serviço / 192."
                .to_string(),
        };
    }
    if answers
        .blood_pressure()
        .is_some_and(|(sys, dia)| sys >= 160 || dia >= 110)
    {
        return Assessment {
            level: RiskLevel::Emergent,
            rationale: "Pressão arterial muito elevada (≥160/110). Procurar emergência.".to_string(),
        };
    }

    let mut reasons: Vec<&str> = Vec::new();
    if answers.age.is_some_and(|age| age < 18 || age >= 35) {
        reasons.push(
            "Faixa etária (<18 ou ≥35) pode elevar riscos obstétricos; acompanhamento mais próximo é recomendado.",
        );
    }
    if COMORBIDITIES.iter().any(|id| answers.has_condition(*id)) {
        reasons.push("Comorbidade (hipertensão/diabetes/ITU).");
    }
    if answers.gestational_weeks.is_some_and(|w| w >= 28)
        && answers.has_symptom(ABSENT_FETAL_MOVEMENT)
    {
        // Shadowed by the severe-symptom rule while 6 is in SEVERE_SYMPTOMS.
        reasons.push("Queixa sobre movimentos fetais no 3º trimestre.");
    }
    if answers.has_elevated_bp() {
        reasons.push("Pressão arterial elevada (≥140/90).");
    }
    if answers.has_high_bmi() {
        reasons.push("IMC elevado (≥30).");
    }
    if answers.tobacco_alcohol == Some(true) {
        reasons.push("Uso de tabaco/álcool (risco gestacional).");
    }

    if reasons.is_empty() {
        return Assessment {
            level: RiskLevel::Routine,
            rationale: "Sem sinais de alerta no momento. Manter acompanhamento de pré-natal e orientações gerais."
                .to_string(),
        };
    }

    Assessment {
        level: RiskLevel::Priority,
        rationale: format!(
            "{} Para saber mais, envie `? faixa etária` ou `? pressão alta`. \
             Orientar avaliação em breve (hoje/amanhã).",
            reasons.join("; ")
        ),
    }
}
