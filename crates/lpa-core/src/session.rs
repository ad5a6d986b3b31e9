//! Quiz sessions
//!
//! [`QuizRun`] walks a parent through `Info -> Questions -> Results`,
//! recording answers with timestamps and the conversion events the
//! marketing funnel is measured by.

use crate::error::QuizError;
use crate::record::DeviceInfo;
use crate::service::Submission;
use crate::validate::{validate_form, FormData};
use chrono::{DateTime, Utc};
use lpa_bank::{OptionId, Question, QuestionBank, QuestionId};
use lpa_scoring::Answer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use ulid::Ulid;

/// Session identifier (ULID: sortable by start time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Ulid);

impl SessionId {
    /// Generate new session id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Time the session id was minted
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.0.datetime())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

/// Funnel event with its time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionEvent {
    /// Event name (`assessment_started`, `question_3_answered`, ...)
    pub event: String,
    /// When it happened
    #[serde(rename = "timestamp", alias = "at")]
    pub at: DateTime<Utc>,
}

impl ConversionEvent {
    /// Event stamped now
    #[must_use]
    pub fn now(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            at: Utc::now(),
        }
    }
}

/// An answer with the time it was given
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedAnswer {
    /// Question answered
    #[serde(rename = "questionId", alias = "question")]
    pub question: QuestionId,
    /// Option chosen
    #[serde(rename = "answer", alias = "option")]
    pub option: OptionId,
    /// When it was chosen
    #[serde(rename = "timestamp", alias = "at", default = "Utc::now")]
    pub at: DateTime<Utc>,
}

impl TimedAnswer {
    /// Answer stamped now
    #[must_use]
    pub fn now(question: QuestionId, option: OptionId) -> Self {
        Self {
            question,
            option,
            at: Utc::now(),
        }
    }

    /// The answer without its timestamp
    #[must_use]
    pub fn answer(&self) -> Answer {
        Answer::new(self.question, self.option.clone())
    }
}

/// Step of the quiz flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Parent details
    Info,
    /// One question at a time
    Questions,
    /// Finished
    Results,
}

impl Step {
    /// Step name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Questions => "questions",
            Self::Results => "results",
        }
    }
}

/// One parent's pass through the quiz
#[derive(Debug, Clone)]
pub struct QuizRun {
    session: SessionId,
    bank: Arc<QuestionBank>,
    step: Step,
    current: usize,
    selected: Option<OptionId>,
    form: Option<FormData>,
    answers: Vec<TimedAnswer>,
    events: Vec<ConversionEvent>,
    started_at: DateTime<Utc>,
}

impl QuizRun {
    /// Start a run, recording `assessment_started`
    #[must_use]
    pub fn start(bank: Arc<QuestionBank>) -> Self {
        let mut run = Self {
            session: SessionId::new(),
            bank,
            step: Step::Info,
            current: 0,
            selected: None,
            form: None,
            answers: Vec::new(),
            events: Vec::new(),
            started_at: Utc::now(),
        };
        run.track("assessment_started");
        run
    }

    fn track(&mut self, event: impl Into<String>) {
        let event = ConversionEvent::now(event);
        tracing::trace!(session = %self.session, event = %event.event, "conversion event");
        self.events.push(event);
    }

    fn expect_step(&self, step: Step, action: &'static str) -> Result<(), QuizError> {
        if self.step == step {
            Ok(())
        } else {
            Err(QuizError::WrongStep {
                action,
                step: self.step.as_str(),
            })
        }
    }

    /// Accept the parent form and move to the questions
    ///
    /// # Errors
    /// Returns the form errors, or [`QuizError::WrongStep`] outside the
    /// info step
    pub fn complete_info(&mut self, form: FormData) -> Result<(), QuizError> {
        self.expect_step(Step::Info, "complete the form")?;
        validate_form(&form)?;
        self.form = Some(form);
        self.step = Step::Questions;
        self.track("info_completed");
        Ok(())
    }

    /// Current question, personalized with the child's name
    #[must_use]
    pub fn current_question(&self) -> Option<Question> {
        if self.step != Step::Questions {
            return None;
        }
        let question = self.bank.questions.get(self.current)?;
        let name = self.form.as_ref().map_or("", |f| f.child_name.as_str());
        Some(question.personalized(name))
    }

    /// Highlight an option of the current question
    ///
    /// # Errors
    /// Returns [`QuizError::UnknownOption`] if the question does not offer it
    pub fn select(&mut self, option: OptionId) -> Result<(), QuizError> {
        self.expect_step(Step::Questions, "select an option")?;
        let offered = self
            .bank
            .questions
            .get(self.current)
            .is_some_and(|q| q.option(&option).is_some());
        if !offered {
            return Err(QuizError::UnknownOption(option));
        }
        self.selected = Some(option);
        Ok(())
    }

    /// Record the selected option and advance
    ///
    /// Returns `true` when that was the last question.
    ///
    /// # Errors
    /// Returns [`QuizError::NoSelection`] if nothing is selected
    pub fn submit(&mut self) -> Result<bool, QuizError> {
        self.expect_step(Step::Questions, "submit an answer")?;
        let option = self.selected.take().ok_or(QuizError::NoSelection)?;
        let question = self
            .bank
            .questions
            .get(self.current)
            .map(|q| q.id)
            .ok_or(QuizError::WrongStep {
                action: "submit an answer",
                step: Step::Results.as_str(),
            })?;
        self.answers.push(TimedAnswer::now(question, option));

        if self.current + 1 < self.bank.questions.len() {
            self.current += 1;
            self.track(format!("question_{}_answered", self.current));
            Ok(false)
        } else {
            self.step = Step::Results;
            self.track("assessment_completed");
            Ok(true)
        }
    }

    /// Go back one question, dropping its answer
    ///
    /// # Errors
    /// Returns [`QuizError::AtFirstQuestion`] on the first question
    pub fn back(&mut self) -> Result<(), QuizError> {
        self.expect_step(Step::Questions, "go back")?;
        if self.current == 0 {
            return Err(QuizError::AtFirstQuestion);
        }
        let from = self.current;
        self.current -= 1;
        self.selected = None;
        self.answers.pop();
        self.track(format!("question_{from}_back"));
        Ok(())
    }

    /// Completion percentage (0 to 100)
    #[must_use]
    pub fn progress(&self) -> u8 {
        let total = self.bank.questions.len();
        match self.step {
            Step::Info => 0,
            Step::Results => 100,
            Step::Questions if total == 0 => 100,
            Step::Questions => {
                let pct = ((self.current + 1) * 100 + total / 2) / total;
                u8::try_from(pct.min(100)).unwrap_or(100)
            }
        }
    }

    /// Record how the submission went (`results_viewed` or
    /// `submission_error`)
    pub fn finish(&mut self, stored: bool) {
        self.track(if stored {
            "results_viewed"
        } else {
            "submission_error"
        });
    }

    /// Submission for the service, once the quiz is finished
    #[must_use]
    pub fn submission(
        &self,
        referral_source: Option<String>,
        device_info: Option<DeviceInfo>,
    ) -> Option<Submission> {
        if self.step != Step::Results {
            return None;
        }
        Some(Submission {
            form: self.form.clone()?,
            bank_version: Some(self.bank.version.clone()),
            answers: self.answers.clone(),
            referral_source,
            session_id: Some(self.session),
            started_at: Some(self.started_at),
            conversion_events: self.events.clone(),
            device_info,
        })
    }

    /// Session id
    #[inline]
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Current step
    #[inline]
    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    /// Index of the current question
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.current
    }

    /// Answers so far
    #[inline]
    #[must_use]
    pub fn answers(&self) -> &[TimedAnswer] {
        &self.answers
    }

    /// Events so far
    #[inline]
    #[must_use]
    pub fn events(&self) -> &[ConversionEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpa_bank::BankRegistry;

    fn run() -> QuizRun {
        let bank = BankRegistry::with_builtin().unwrap().get("classic").unwrap();
        QuizRun::start(bank)
    }

    fn form() -> FormData {
        FormData::new("Maya", "8", "parent@example.com")
    }

    fn names(run: &QuizRun) -> Vec<&str> {
        run.events().iter().map(|e| e.event.as_str()).collect()
    }

    #[test]
    fn full_run_records_funnel() {
        let mut run = run();
        assert_eq!(run.progress(), 0);
        run.complete_info(form()).unwrap();
        assert!(run.current_question().unwrap().prompt.contains("Maya"));

        let mut finished = false;
        while !finished {
            run.select("A".parse().unwrap()).unwrap();
            finished = run.submit().unwrap();
        }
        run.finish(true);

        assert_eq!(run.step(), Step::Results);
        assert_eq!(run.progress(), 100);
        assert_eq!(run.answers().len(), 5);
        assert_eq!(
            names(&run),
            vec![
                "assessment_started",
                "info_completed",
                "question_1_answered",
                "question_2_answered",
                "question_3_answered",
                "question_4_answered",
                "assessment_completed",
                "results_viewed",
            ]
        );
        let submission = run.submission(None, None).unwrap();
        assert_eq!(submission.session_id, Some(run.session()));
        assert_eq!(submission.answers.len(), 5);
    }

    #[test]
    fn back_drops_last_answer() {
        let mut run = run();
        run.complete_info(form()).unwrap();
        assert!(matches!(run.back(), Err(QuizError::AtFirstQuestion)));

        run.select("B".parse().unwrap()).unwrap();
        run.submit().unwrap();
        assert_eq!(run.progress(), 40);
        run.back().unwrap();
        assert_eq!(run.position(), 0);
        assert!(run.answers().is_empty());
        assert_eq!(names(&run).last(), Some(&"question_1_back"));
    }

    #[test]
    fn guards() {
        let mut run = run();
        assert!(matches!(
            run.select("A".parse().unwrap()),
            Err(QuizError::WrongStep { .. })
        ));
        assert!(matches!(
            run.complete_info(FormData::new("", "8", "x@y.com")),
            Err(QuizError::Form(_))
        ));
        run.complete_info(form()).unwrap();
        assert!(matches!(run.submit(), Err(QuizError::NoSelection)));
        assert!(matches!(
            run.select("Z".parse().unwrap()),
            Err(QuizError::UnknownOption(_))
        ));
        assert!(run.submission(None, None).is_none());
    }

    #[test]
    fn session_ids_round_trip() {
        let id = SessionId::new();
        assert_eq!(id.to_string().parse::<SessionId>().unwrap(), id);
    }
}
