//! Personalised educational material sent after classification.

use super::model::IntakeAnswers;
use super::prompts::ALERT_SIGNS;
use super::risk::RiskLevel;

const CONDITION_HYPERTENSION: u8 = 1;
const CONDITION_DIABETES: u8 = 2;

/// Trimester for a gestational age in weeks.
pub fn trimester(weeks: u32) -> u8 {
    match weeks {
        0..=13 => 1,
        14..=27 => 2,
        _ => 3,
    }
}

fn calendar_tip(weeks: Option<u32>) -> &'static str {
    match weeks {
        None => "• Consultas: mensais até 34s; quinzenais 34–36s; semanais >36s.",
        Some(w) if w < 34 => "• Consultas: mensais até 34s; depois quinzenais.",
        Some(w) if w < 36 => "• Consultas: quinzenais até 36s; depois semanais.",
        Some(_) => "• Consultas: semanais a partir de 36s.",
    }
}

fn trimester_exams(weeks: Option<u32>) -> &'static str {
    match weeks.map(trimester) {
        Some(1) => {
            "• 1º tri: hemograma, tipagem/Rh, glicemia, sorologias, urina/urocultura, US obstétrico."
        }
        Some(2) => "• 2º tri: TOTG 24–28s, US morfológico.",
        Some(_) => "• 3º tri: hemograma, sorologias de controle, cultura para EGB 35–37s.",
        None => "• Exames por trimestre variam; siga o pedido da sua unidade.",
    }
}

fn vaccine_tips(weeks: Option<u32>) -> String {
    match weeks {
        None => "• Vacinas: Influenza (anual), Hep. B e COVID-19 conforme indicação; dTpa entre 20–36s."
            .to_string(),
        Some(w) => {
            let mut tips = Vec::new();
            if (20..=36).contains(&w) {
                tips.push("• dTpa entre 20–36s.");
            }
            tips.push("• Influenza (anual), Hep. B e COVID-19 conforme indicação.");
            tips.join("\n")
        }
    }
}

/// Build the educational pack for a classified respondent.
pub fn educational_pack(answers: &IntakeAnswers, level: RiskLevel) -> String {
    let weeks = answers.gestational_weeks;
    let mut block: Vec<String> = Vec::new();

    block.push(
        match level {
            RiskLevel::Emergent => {
                "*Prioridade:* sinais de gravidade detectados. Procure *emergência agora* / 192."
            }
            RiskLevel::Priority => "*Prioridade:* avaliação em breve (hoje/amanhã) na sua unidade.",
            RiskLevel::Routine => "*Rotina:* manter acompanhamento e autocuidados.",
        }
        .to_string(),
    );
    block.push(calendar_tip(weeks).to_string());
    block.push(trimester_exams(weeks).to_string());
    block.push(vaccine_tips(weeks));

    if answers.has_high_bmi() {
        block.push("• IMC elevado (≥30): foco em alimentação equilibrada, atividade leve e metas de ganho de peso orientadas pela equipe.".to_string());
    }
    if answers.has_elevated_bp() {
        block.push("• Pressão arterial elevada: meça em horários regulares e leve os registros à sua unidade.".to_string());
    }
    if answers.has_condition(CONDITION_DIABETES) {
        block.push("• Diabetes/risco: siga orientações de dieta, atividade e metas glicêmicas; TOTG 24–28s se ainda não realizou.".to_string());
    }
    if answers.has_condition(CONDITION_HYPERTENSION) {
        block.push("• Hipertensão: atenção a cefaleia forte, escotomas, dor em “boca do estômago” e inchaço súbito.".to_string());
    }
    if answers.tobacco_alcohol == Some(true) {
        block.push("• Tabaco/álcool: interromper traz benefício imediato; busque apoio na sua unidade.".to_string());
    }

    block.push(format!("\n{ALERT_SIGNS}"));
    block.push("\nTem dúvidas? Envie `? tema` (ex.: `? pressão alta`, `? alimentação`) ou `MENU` para a lista. Para encerrar, mande *FIM*.".to_string());
    block.join("\n")
}
