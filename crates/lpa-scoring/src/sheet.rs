//! Answer aggregation
//!
//! [`aggregate`] folds a list of selected options into a [`ScoreSheet`]:
//! `score[trait] += weight` for every weight of every selected option.
//! Points are fixed-point integers, so the fold is order independent.

use lpa_bank::{OptionId, Points, QuestionBank, QuestionId, TraitKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One selected option
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Answer {
    /// Question answered
    #[serde(alias = "questionId")]
    pub question: QuestionId,
    /// Selected option label
    #[serde(alias = "answer")]
    pub option: OptionId,
}

impl Answer {
    /// Create new answer
    #[inline]
    #[must_use]
    pub fn new(question: impl Into<QuestionId>, option: OptionId) -> Self {
        Self {
            question: question.into(),
            option,
        }
    }
}

/// Why an answer contributed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Question id not in the bank
    UnknownQuestion,
    /// Option label not offered by the question
    UnknownOption,
}

/// An answer ignored during aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAnswer {
    /// The ignored answer
    pub answer: Answer,
    /// Reason it was ignored
    pub reason: SkipReason,
}

/// Per-trait point totals
///
/// Traits never awarded are implicitly zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSheet {
    totals: BTreeMap<TraitKey, Points>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    skipped: Vec<SkippedAnswer>,
    #[serde(default)]
    counted: usize,
}

impl ScoreSheet {
    /// Create empty sheet
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total for a trait (zero when absent)
    #[inline]
    #[must_use]
    pub fn get(&self, trait_key: &str) -> Points {
        self.totals.get(trait_key).copied().unwrap_or(Points::ZERO)
    }

    /// Add points to a trait
    pub fn add(&mut self, trait_key: &TraitKey, points: Points) {
        *self.totals.entry(trait_key.clone()).or_default() += points;
    }

    /// Fold another sheet into this one
    pub fn merge(&mut self, other: &Self) {
        for (trait_key, points) in &other.totals {
            self.add(trait_key, *points);
        }
        self.skipped.extend(other.skipped.iter().cloned());
        self.counted += other.counted;
    }

    /// Iterate over awarded traits in key order
    pub fn iter(&self) -> impl Iterator<Item = (&TraitKey, Points)> {
        self.totals.iter().map(|(k, v)| (k, *v))
    }

    /// Answers that were ignored
    #[inline]
    #[must_use]
    pub fn skipped(&self) -> &[SkippedAnswer] {
        &self.skipped
    }

    /// Number of answers that contributed points
    #[inline]
    #[must_use]
    pub fn counted(&self) -> usize {
        self.counted
    }

    /// Check if nothing was awarded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.values().all(|p| p.is_zero())
    }

    /// Totals as plain numbers, for storage and JSON responses
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.totals
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_f64()))
            .collect()
    }
}

/// Sum the weights of every selected option
///
/// Answers naming an unknown question or option are skipped and recorded on
/// the sheet.
#[must_use]
pub fn aggregate<'a, I>(bank: &QuestionBank, answers: I) -> ScoreSheet
where
    I: IntoIterator<Item = &'a Answer>,
{
    let mut sheet = ScoreSheet::new();
    for answer in answers {
        let reason = match bank.question(answer.question) {
            None => SkipReason::UnknownQuestion,
            Some(question) => match question.option(&answer.option) {
                None => SkipReason::UnknownOption,
                Some(option) => {
                    for (trait_key, points) in &option.weights {
                        sheet.add(trait_key, *points);
                    }
                    sheet.counted += 1;
                    continue;
                }
            },
        };
        tracing::warn!(
            bank = %bank.version,
            question = %answer.question,
            option = %answer.option,
            ?reason,
            "skipping answer"
        );
        sheet.skipped.push(SkippedAnswer {
            answer: answer.clone(),
            reason,
        });
    }
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpa_bank::BankRegistry;

    fn answer(q: u32, o: &str) -> Answer {
        Answer::new(q, o.parse().unwrap())
    }

    #[test]
    fn aggregate_sums_weights() {
        let bank = BankRegistry::with_builtin().unwrap().get("classic").unwrap();
        let answers = [answer(1, "A"), answer(3, "A"), answer(5, "A")];
        let sheet = aggregate(&bank, &answers);

        assert_eq!(sheet.get("visual"), Points::whole(2));
        assert_eq!(sheet.get("kinesthetic"), Points::from_hundredths(150));
        assert_eq!(sheet.get("adhd"), Points::from_hundredths(50));
        assert_eq!(sheet.get("reading"), Points::ZERO);
        assert_eq!(sheet.counted(), 3);
    }

    #[test]
    fn aggregate_skips_unknown_ids() {
        let bank = BankRegistry::with_builtin().unwrap().get("classic").unwrap();
        let answers = [answer(1, "A"), answer(99, "A"), answer(2, "Z")];
        let sheet = aggregate(&bank, &answers);

        assert_eq!(sheet.counted(), 1);
        assert_eq!(sheet.skipped().len(), 2);
        assert_eq!(sheet.skipped()[0].reason, SkipReason::UnknownQuestion);
        assert_eq!(sheet.skipped()[1].reason, SkipReason::UnknownOption);
    }

    #[test]
    fn empty_answers_give_empty_sheet() {
        let bank = BankRegistry::with_builtin().unwrap().get("enhanced").unwrap();
        let sheet = aggregate(&bank, &[]);
        assert!(sheet.is_empty());
        assert_eq!(sheet.counted(), 0);
    }

    #[test]
    fn merge_adds_totals() {
        let visual: TraitKey = "visual".parse().unwrap();
        let mut a = ScoreSheet::new();
        a.add(&visual, Points::whole(1));
        let mut b = ScoreSheet::new();
        b.add(&visual, Points::from_hundredths(50));
        a.merge(&b);
        assert_eq!(a.get("visual"), Points::from_hundredths(150));
    }

    #[test]
    fn answer_accepts_original_field_names() {
        let parsed: Answer = serde_json::from_str(r#"{"questionId": 3, "answer": "b"}"#).unwrap();
        assert_eq!(parsed, answer(3, "B"));
    }
}
