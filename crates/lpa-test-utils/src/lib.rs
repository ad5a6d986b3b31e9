//! Testing utilities for the LPA workspace
//!
//! Shared fixtures: answer sets, parent forms and services wired to the
//! in-memory sink and log mailer.

#![allow(missing_docs)]

use lpa_bank::OptionId;
use lpa_core::{
    AssessmentService, FormData, LogMailer, MemorySink, ServiceConfig, Submission, TimedAnswer,
};
use lpa_scoring::Answer;
use std::sync::Arc;

pub fn option(label: &str) -> OptionId {
    label.parse().unwrap()
}

pub fn answers(pairs: &[(u32, &str)]) -> Vec<Answer> {
    pairs
        .iter()
        .map(|(q, o)| Answer::new(*q, option(o)))
        .collect()
}

/// The same option for questions `1..=count`
pub fn uniform_answers(count: u32, label: &str) -> Vec<Answer> {
    (1..=count).map(|q| Answer::new(q, option(label))).collect()
}

pub fn timed(answers: &[Answer]) -> Vec<TimedAnswer> {
    answers
        .iter()
        .map(|a| TimedAnswer::now(a.question, a.option.clone()))
        .collect()
}

pub fn valid_form() -> FormData {
    FormData::new("Maya", "8", "parent@example.com")
}

pub fn submission(bank: &str, answers: &[Answer]) -> Submission {
    Submission {
        form: valid_form(),
        bank_version: Some(bank.to_string()),
        answers: timed(answers),
        referral_source: None,
        session_id: None,
        started_at: None,
        conversion_events: Vec::new(),
        device_info: None,
    }
}

/// Service plus handles to its sink and mailer
pub struct TestService {
    pub service: Arc<AssessmentService>,
    pub sink: Arc<MemorySink>,
    pub mailer: Arc<LogMailer>,
}

pub fn setup_test_service() -> TestService {
    setup_test_service_with(ServiceConfig::new())
}

pub fn setup_test_service_with(config: ServiceConfig) -> TestService {
    let sink = Arc::new(MemorySink::new());
    let mailer = Arc::new(LogMailer::new());
    let service = AssessmentService::new(config, sink.clone(), mailer.clone()).unwrap();
    TestService {
        service: Arc::new(service),
        sink,
        mailer,
    }
}
