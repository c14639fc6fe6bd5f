//! IntakeManager — drives one respondent's conversation per inbound message.
//!
//! Each call loads the session, applies global commands and the help
//! shortcut, validates the answer for the current step, persists the new
//! state and returns the reply text.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::error::DatabaseError;
use crate::faq::{FAQ_MENU, FaqService, mentions_topic};
use crate::store::Database;

use super::education::educational_pack;
use super::model::{CONDITION_OPTIONS, IntakeAnswers, NewResponse, SYMPTOM_OPTIONS, Session};
use super::parse::{self, IntegerError};
use super::prompts::{self, not_understood};
use super::risk;
use super::state::IntakeStep;

/// Commands recognised at any step, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    End,
    Restart,
    Menu,
    Erase,
}

impl Command {
    fn parse(upper: &str) -> Option<Self> {
        match upper {
            "SAIR" | "FIM" => Some(Self::End),
            "REINICIAR" => Some(Self::Restart),
            "MENU" => Some(Self::Menu),
            "APAGAR" => Some(Self::Erase),
            _ => None,
        }
    }
}

/// Coordinates the questionnaire: session state, answer validation, risk
/// classification and storage.
pub struct IntakeManager {
    db: Arc<dyn Database>,
    faq: Arc<FaqService>,
}

impl IntakeManager {
    pub fn new(db: Arc<dyn Database>, faq: Arc<FaqService>) -> Self {
        Self { db, faq }
    }

    /// Handle one inbound message and return the reply.
    ///
    /// Storage failures end the session and produce a generic error reply.
    pub async fn handle_message(&self, phone: &str, body: &str) -> String {
        match self.process(phone, body.trim()).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(phone, error = %e, "Intake message failed");
                if let Err(e) = self.db.end_session(phone).await {
                    warn!(phone, error = %e, "Failed to end session after error");
                }
                prompts::UNEXPECTED_ERROR.to_string()
            }
        }
    }

    async fn process(&self, phone: &str, body: &str) -> Result<String, DatabaseError> {
        let upper = body.to_uppercase();
        let lower = body.to_lowercase();

        if let Some(command) = Command::parse(&upper) {
            return self.run_command(phone, command).await;
        }

        let Some(mut session) = self.db.get_session(phone).await? else {
            self.db.save_session(&Session::new(phone)).await?;
            info!(phone, "Intake session started");
            return Ok(prompts::WELCOME.to_string());
        };

        let Some(step) = session.step() else {
            warn!(phone, ordinal = session.step_ordinal, "Unknown step; resetting session");
            self.db.end_session(phone).await?;
            return Ok(prompts::SESSION_RESET_UNKNOWN.to_string());
        };

        let explicit_question = upper.starts_with('?');
        if explicit_question || mentions_topic(&lower) {
            let follow_up = step.is_terminal();
            if let Some(answer) = self.faq.answer(body).await {
                let suffix = if follow_up {
                    prompts::FAQ_SUFFIX_FOLLOW_UP
                } else {
                    prompts::FAQ_SUFFIX_QUESTIONNAIRE
                };
                return Ok(format!("{answer}\n\n{suffix}"));
            }
            if explicit_question {
                return Ok(if follow_up {
                    prompts::FAQ_NOT_FOUND_FOLLOW_UP
                } else {
                    prompts::FAQ_NOT_FOUND_QUESTIONNAIRE
                }
                .to_string());
            }
        }

        if !session.consented {
            if upper != "ACEITO" {
                return Ok(prompts::CONSENT_REQUIRED.to_string());
            }
            session.consented = true;
            session.set_step(IntakeStep::Initials);
            self.db.save_session(&session).await?;
            info!(phone, "Consent recorded");
            return Ok(format!(
                "{}\n\n{}",
                prompts::CONSENT_CONFIRMED,
                prompts::Q_INITIALS
            ));
        }

        match step {
            _ if step.is_terminal() => Ok(if upper == "CONTINUAR" {
                prompts::FOLLOW_UP_CONTINUE
            } else {
                prompts::FOLLOW_UP_IDLE
            }
            .to_string()),
            _ if upper == "CONTINUAR" || prompts::GREETINGS.contains(&lower.as_str()) => {
                Ok(current_prompt(step).to_string())
            }
            IntakeStep::EducationOffer => self.education_offer(session, body).await,
            IntakeStep::AwaitingConsent => {
                // Consented but never advanced; resume at the first question.
                session.set_step(IntakeStep::Initials);
                self.db.save_session(&session).await?;
                Ok(prompts::Q_INITIALS.to_string())
            }
            _ => self.answer_question(session, step, body).await,
        }
    }

    async fn run_command(&self, phone: &str, command: Command) -> Result<String, DatabaseError> {
        match command {
            Command::End => {
                self.db.end_session(phone).await?;
                info!(phone, "Intake session ended by user");
                Ok(prompts::SESSION_ENDED.to_string())
            }
            Command::Restart => {
                self.db.end_session(phone).await?;
                self.db.save_session(&Session::new(phone)).await?;
                info!(phone, "Intake session restarted");
                Ok(prompts::SESSION_RESTARTED.to_string())
            }
            Command::Menu => Ok(FAQ_MENU.to_string()),
            Command::Erase => {
                self.db.end_session(phone).await?;
                let removed = self.db.delete_responses_for(phone).await?;
                info!(phone, removed, "Respondent data erased on request");
                Ok(prompts::DATA_ERASED.to_string())
            }
        }
    }

    /// Validate and store the answer to a numbered question.
    async fn answer_question(
        &self,
        mut session: Session,
        step: IntakeStep,
        body: &str,
    ) -> Result<String, DatabaseError> {
        if let Err(hint) = apply_answer(step, body, &mut session.answers, today()) {
            debug!(phone = %session.phone, %step, "Answer rejected");
            return Ok(hint);
        }

        if step == IntakeStep::Habits {
            return self.complete(session).await;
        }

        let Some(next) = step.next() else {
            return Ok(prompts::CONTINUE_FALLBACK.to_string());
        };
        session.set_step(next);
        self.db.save_session(&session).await?;
        debug!(phone = %session.phone, from = %step, to = %next, "Intake step advanced");
        Ok(current_prompt(next).to_string())
    }

    /// Classify, store the response row and offer the educational pack.
    async fn complete(&self, mut session: Session) -> Result<String, DatabaseError> {
        let assessment = risk::classify(&session.answers);
        let id = self
            .db
            .store_response(NewResponse {
                phone: &session.phone,
                answers: &session.answers,
                risk_level: assessment.level,
            })
            .await?;

        session.set_step(IntakeStep::EducationOffer);
        self.db.save_session(&session).await?;
        info!(
            phone = %session.phone,
            response_id = id,
            risk_level = %assessment.level,
            "Questionnaire completed"
        );

        Ok(format!(
            "{}\n\n*Classificação:* {}\n*Justificativa:* {}\n{}\n\n{}",
            prompts::FINAL_MSG,
            assessment.level,
            assessment.rationale,
            assessment.level.guidance(),
            prompts::EDU_OFFER
        ))
    }

    async fn education_offer(&self, mut session: Session, body: &str) -> Result<String, DatabaseError> {
        match body {
            "1" => {
                let level = risk::classify(&session.answers).level;
                let pack = educational_pack(&session.answers, level);
                session.set_step(IntakeStep::FollowUp);
                self.db.save_session(&session).await?;
                Ok(pack)
            }
            "2" => {
                self.db.end_session(&session.phone).await?;
                info!(phone = %session.phone, "Educational pack declined");
                Ok(prompts::EDU_DECLINED.to_string())
            }
            _ => Ok(prompts::EDU_OFFER_HINT.to_string()),
        }
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Text that repeats the current step to the respondent.
fn current_prompt(step: IntakeStep) -> &'static str {
    match step {
        IntakeStep::EducationOffer => prompts::EDU_OFFER,
        _ => step.prompt().unwrap_or(prompts::CONTINUE_FALLBACK),
    }
}

/// Parse `body` as the answer to `step` and record it.
///
/// On rejection returns the reply to send, leaving `answers` untouched.
pub fn apply_answer(
    step: IntakeStep,
    body: &str,
    answers: &mut IntakeAnswers,
    today: NaiveDate,
) -> Result<(), String> {
    let repeat = || not_understood(step.prompt().unwrap_or_default());

    match step {
        IntakeStep::Initials => {
            let initials: String = body.chars().take(20).collect::<String>().trim().to_string();
            if initials.is_empty() {
                return Err(repeat());
            }
            answers.initials = Some(initials);
        }
        IntakeStep::Age => {
            let age = parse::integer_in(body, 10..=60).map_err(|e| match e {
                IntegerError::NotANumber => prompts::AGE_NOT_NUMBER.to_string(),
                IntegerError::OutOfRange => prompts::INVALID_AGE.to_string(),
            })?;
            answers.age = Some(age);
        }
        IntakeStep::Gestation => {
            answers.gestational_weeks = Some(parse::weeks_or_lmp(body, today).ok_or_else(repeat)?);
        }
        IntakeStep::Symptoms => {
            answers.symptom_ids = parse::option_ids(body, SYMPTOM_OPTIONS).ok_or_else(repeat)?;
        }
        IntakeStep::Conditions => {
            answers.condition_ids = parse::option_ids(body, CONDITION_OPTIONS).ok_or_else(repeat)?;
        }
        IntakeStep::PrenatalVisits => {
            let visits = parse::integer_in(body, 0..=50).map_err(|e| match e {
                IntegerError::NotANumber => repeat(),
                IntegerError::OutOfRange => prompts::INVALID_VISITS.to_string(),
            })?;
            answers.prenatal_visits = Some(visits);
        }
        IntakeStep::BloodPressure => {
            let reading = if parse::is_skip(body) {
                None
            } else {
                Some(parse::blood_pressure(body).ok_or_else(repeat)?)
            };
            answers.bp_systolic = reading.map(|(sys, _)| sys);
            answers.bp_diastolic = reading.map(|(_, dia)| dia);
        }
        IntakeStep::Weight => {
            answers.weight_kg = if parse::is_skip(body) {
                None
            } else {
                Some(parse::weight_kg(body).ok_or_else(repeat)?)
            };
            answers.refresh_bmi();
        }
        IntakeStep::Height => {
            answers.height_m = if parse::is_skip(body) {
                None
            } else {
                Some(parse::height_m(body).ok_or_else(repeat)?)
            };
            answers.refresh_bmi();
        }
        IntakeStep::Habits => {
            answers.tobacco_alcohol = match body.trim() {
                "1" => Some(true),
                "2" => Some(false),
                _ => return Err(prompts::HABITS_HINT.to_string()),
            };
        }
        IntakeStep::AwaitingConsent | IntakeStep::EducationOffer | IntakeStep::FollowUp => {
            return Err(prompts::CONTINUE_FALLBACK.to_string());
        }
    }
    Ok(())
}
