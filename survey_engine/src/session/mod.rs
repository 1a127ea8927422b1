//! Phase session: the per-phase lifecycle over a loaded form
//!
//! ```text
//! Unstarted --begin_phase--> InProgress --submit--> Validating
//!     ^                          ^                      |
//!     |                          +------ rejected ------+
//!     +--- cancel ---- InProgress                       |
//! Completed <------------------ accepted ---------------+
//! ```
//!
//! The identification section (the section of the first question) has to be
//! completed before any other phase can begin.

pub mod error;

pub use error::{SessionError, SessionResult};

use crate::answers::{combine_answers, AnswerMap, AnswerValue, CollectedPhase, QuestionId};
use crate::condition::{question_is_visible, ConditionContext};
use crate::logging::codes;
use crate::project::ProjectContext;
use crate::structure::{FormStructure, Question};
use crate::validation::{validate_section, SectionValidation, ValidatorConfig};
use crate::{log_info, log_success, log_warning};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseState {
    Unstarted,
    InProgress,
    Validating,
    Completed,
}

impl PhaseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::InProgress => "in progress",
            Self::Validating => "validating",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`PhaseSession::submit`]
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The phase was appended to the collected sequence
    Completed(CollectedPhase),
    /// Answers are kept; the validation explains what is missing
    Rejected(SectionValidation),
}

impl SubmitOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// One operator filling in a form, phase after phase
#[derive(Debug, Clone)]
pub struct PhaseSession {
    structure: FormStructure,
    project: ProjectContext,
    config: ValidatorConfig,
    submission_id: Uuid,
    iteration_id: Uuid,
    started_at: DateTime<Utc>,
    state: PhaseState,
    current_section: Option<String>,
    current_answers: AnswerMap,
    collected: Vec<CollectedPhase>,
    identification_completed: bool,
    show_justification: bool,
}

impl PhaseSession {
    pub fn new(structure: FormStructure, project: ProjectContext, config: ValidatorConfig) -> Self {
        let session = Self {
            structure,
            project,
            config,
            submission_id: Uuid::new_v4(),
            iteration_id: Uuid::new_v4(),
            started_at: Utc::now(),
            state: PhaseState::Unstarted,
            current_section: None,
            current_answers: AnswerMap::new(),
            collected: Vec::new(),
            identification_completed: false,
            show_justification: false,
        };

        log_info!("Session opened",
            "submission_id" => session.submission_id,
            "questions" => session.structure.len()
        );
        session
    }

    pub fn submission_id(&self) -> Uuid {
        self.submission_id
    }

    /// Identifier of the current phase attempt, renewed on every change of phase
    pub fn iteration_id(&self) -> Uuid {
        self.iteration_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn state(&self) -> PhaseState {
        self.state
    }

    pub fn structure(&self) -> &FormStructure {
        &self.structure
    }

    pub fn project(&self) -> &ProjectContext {
        &self.project
    }

    pub fn current_section(&self) -> Option<&str> {
        self.current_section.as_deref()
    }

    pub fn current_answers(&self) -> &AnswerMap {
        &self.current_answers
    }

    pub fn collected(&self) -> &[CollectedPhase] {
        &self.collected
    }

    pub fn identification_completed(&self) -> bool {
        self.identification_completed
    }

    /// Whether the justification comment should be shown to the operator
    pub fn show_justification(&self) -> bool {
        self.show_justification
    }

    pub fn identification_section(&self) -> Option<&str> {
        self.structure.identification_section()
    }

    pub fn available_phases(&self) -> Vec<&str> {
        self.structure.available_phases()
    }

    /// Start answering `section`.
    ///
    /// Only the identification section and the selectable phases can be
    /// started, and only from `Unstarted` or `Completed`. Identification
    /// runs once per session.
    pub fn begin_phase(&mut self, section: &str) -> SessionResult<()> {
        if !matches!(self.state, PhaseState::Unstarted | PhaseState::Completed) {
            return Err(SessionError::invalid_transition(self.state, "begin a phase"));
        }

        let requested = section.trim();
        let identification = self
            .identification_section()
            .ok_or_else(|| SessionError::unknown_section(requested))?
            .to_string();

        let is_identification = requested == identification;
        if is_identification && self.identification_completed {
            return Err(SessionError::invalid_transition(
                self.state,
                "restart the identification section",
            ));
        }
        if !is_identification {
            if !self.available_phases().contains(&requested) {
                return Err(SessionError::unknown_section(requested));
            }
            if !self.identification_completed {
                return Err(SessionError::IdentificationPending {
                    identification,
                    requested: requested.to_string(),
                });
            }
        }

        self.current_section = Some(requested.to_string());
        self.current_answers.clear();
        self.iteration_id = Uuid::new_v4();
        self.show_justification = false;
        self.state = PhaseState::InProgress;

        log_success!(codes::success::PHASE_STARTED,
            "Phase started",
            "section" => requested,
            "iteration_id" => self.iteration_id
        );
        Ok(())
    }

    /// Store an answer for a question of the current section, or for the
    /// justification comment. Numbers follow the question's numeric kind.
    pub fn record_answer(&mut self, id: QuestionId, value: AnswerValue) -> SessionResult<()> {
        let section = self.in_progress_section("record an answer")?;

        let value = if id == self.config.comment_question_id {
            value
        } else {
            self.section_question(id, &section)?.normalize_answer(value)
        };
        self.current_answers.insert(id, value);
        Ok(())
    }

    /// Remove an answer, returning the previous value
    pub fn clear_answer(&mut self, id: QuestionId) -> SessionResult<Option<AnswerValue>> {
        let section = self.in_progress_section("clear an answer")?;
        if id != self.config.comment_question_id {
            self.section_question(id, &section)?;
        }
        Ok(self.current_answers.remove(&id))
    }

    /// Collected answers merged with the in-progress ones
    pub fn combined_answers(&self) -> AnswerMap {
        combine_answers(&self.collected, &self.current_answers)
    }

    /// Questions of the current section to display, in id order
    pub fn visible_questions(&self) -> Vec<&Question> {
        let Some(section) = self.current_section.as_deref() else {
            return Vec::new();
        };

        let combined = self.combined_answers();
        let ctx = ConditionContext::new(&combined, &self.project)
            .with_decision_logging(self.config.log_visibility_decisions);

        self.structure
            .questions_in_section(section)
            .into_iter()
            .filter(|q| q.id != self.config.comment_question_id)
            .filter(|q| question_is_visible(q, &ctx))
            .collect()
    }

    /// Validate the in-progress phase and, when valid, append it to the
    /// collected phases
    pub fn submit(&mut self) -> SessionResult<SubmitOutcome> {
        let section = self.in_progress_section("submit")?;
        self.state = PhaseState::Validating;
        self.show_justification = false;

        let validation = validate_section(
            &self.structure,
            &section,
            &mut self.current_answers,
            &self.collected,
            &self.project,
            &self.config,
        );

        if !validation.is_valid {
            self.show_justification = validation.requires_justification();
            self.state = PhaseState::InProgress;
            return Ok(SubmitOutcome::Rejected(validation));
        }

        let entry = CollectedPhase::new(section.clone(), std::mem::take(&mut self.current_answers));
        self.collected.push(entry.clone());
        if self.identification_section() == Some(section.as_str()) {
            self.identification_completed = true;
        }
        self.state = PhaseState::Completed;

        log_success!(codes::success::PHASE_COMPLETED,
            "Phase completed",
            "section" => section,
            "answers" => entry.answer_count(),
            "collected" => self.collected.len()
        );
        Ok(SubmitOutcome::Completed(entry))
    }

    /// Abandon the in-progress phase
    pub fn cancel(&mut self) -> SessionResult<()> {
        self.in_progress_section("cancel")?;
        self.current_answers.clear();
        self.current_section = None;
        self.show_justification = false;
        self.state = PhaseState::Unstarted;
        Ok(())
    }

    /// Abandon the in-progress phase so that another one can be picked
    pub fn change_phase(&mut self) -> SessionResult<()> {
        self.cancel()?;
        self.iteration_id = Uuid::new_v4();
        Ok(())
    }

    /// `(phase name, answer count)` for each collected phase
    pub fn phase_summaries(&self) -> Vec<(&str, usize)> {
        self.collected
            .iter()
            .map(|p| (p.phase_name.as_str(), p.answer_count()))
            .collect()
    }

    /// Hand over the collected phases, ending the session
    pub fn into_collected(self) -> Vec<CollectedPhase> {
        self.collected
    }

    fn in_progress_section(&self, action: &'static str) -> SessionResult<String> {
        match (&self.state, &self.current_section) {
            (PhaseState::InProgress, Some(section)) => Ok(section.clone()),
            _ => Err(SessionError::invalid_transition(self.state, action)),
        }
    }

    fn section_question(&self, id: QuestionId, section: &str) -> SessionResult<&Question> {
        match self.structure.question(id) {
            Some(question) if question.section.trim() == section => Ok(question),
            _ => {
                log_warning!(code = codes::session::QUESTION_OUTSIDE_SECTION,
                    "Answer rejected for question outside the current section",
                    "question" => id,
                    "section" => section
                );
                Err(SessionError::QuestionOutsideSection {
                    id,
                    section: section.to_string(),
                })
            }
        }
    }
}
