//! Question bank definitions
//!
//! A [`QuestionBank`] is the static weight table behind one version of the
//! quiz: every `(question, option)` pair maps to a partial `trait -> points`
//! table, and every awarded trait belongs to exactly one [`Domain`].

use crate::error::BankError;
use crate::fingerprint::Fingerprint;
use crate::ids::{OptionId, QuestionId, TraitKey};
use crate::personalize::personalize;
use crate::points::Points;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One selectable answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Option label
    pub id: OptionId,
    /// Text shown to the parent
    pub text: String,
    /// Points awarded per trait when selected
    #[serde(default)]
    pub weights: BTreeMap<TraitKey, Points>,
}

impl AnswerOption {
    /// Points awarded to a trait (zero when absent)
    #[inline]
    #[must_use]
    pub fn weight(&self, trait_key: &str) -> Points {
        self.weights.get(trait_key).copied().unwrap_or(Points::ZERO)
    }
}

/// A multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question id
    pub id: QuestionId,
    /// Section heading ("Learning Style", "Focus Patterns", ...)
    pub section: String,
    /// Question text, may contain "your child"
    pub prompt: String,
    /// Answer options in display order
    pub options: Vec<AnswerOption>,
}

impl Question {
    /// Find an option by label
    #[inline]
    #[must_use]
    pub fn option(&self, id: &OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|o| &o.id == id)
    }

    /// Copy of this question with the prompt personalized for a child
    #[must_use]
    pub fn personalized(&self, child_name: &str) -> Self {
        Self {
            prompt: personalize(&self.prompt, child_name),
            ..self.clone()
        }
    }
}

/// A disjoint group of traits resolved together
///
/// The order of `traits` is the tie-break priority: when two traits share
/// the top score, the one listed first wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Machine key (`learning_style`, `executive_function`, ...)
    pub key: String,
    /// Display label
    pub label: String,
    /// Member traits in priority order
    pub traits: Vec<TraitKey>,
}

impl Domain {
    /// Check membership
    #[inline]
    #[must_use]
    pub fn contains(&self, trait_key: &str) -> bool {
        self.traits.iter().any(|t| t.as_str() == trait_key)
    }

    /// Priority rank of a trait (0 is highest)
    #[inline]
    #[must_use]
    pub fn priority(&self, trait_key: &str) -> Option<usize> {
        self.traits.iter().position(|t| t.as_str() == trait_key)
    }
}

/// One version of the quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    /// Version name (`classic`, `enhanced`, `multi-domain`)
    pub version: String,
    /// Human readable title
    pub title: String,
    /// Name of the resolution strategy used to turn scores into a profile
    pub resolution: String,
    /// Disjoint trait domains
    pub domains: Vec<Domain>,
    /// Questions in display order
    pub questions: Vec<Question>,
}

impl QuestionBank {
    /// Parse and validate a YAML definition
    ///
    /// # Errors
    /// Returns [`BankError::Parse`] for malformed YAML or any validation error
    pub fn from_yaml(source: &str) -> Result<Self, BankError> {
        let bank: Self = serde_yaml::from_str(source)?;
        bank.validate()?;
        Ok(bank)
    }

    /// Parse and validate a JSON definition
    ///
    /// # Errors
    /// Returns [`BankError::Parse`] for malformed JSON or any validation error
    pub fn from_json(source: &str) -> Result<Self, BankError> {
        let bank: Self = serde_json::from_str(source)?;
        bank.validate()?;
        Ok(bank)
    }

    /// Check structural invariants
    ///
    /// - at least one question, question ids unique
    /// - option ids unique per question, each option awards points
    /// - every weight is greater than zero
    /// - domains are non-empty and pairwise disjoint
    /// - every awarded trait belongs to a domain
    ///
    /// # Errors
    /// Returns the first violated invariant
    pub fn validate(&self) -> Result<(), BankError> {
        if self.questions.is_empty() {
            return Err(BankError::NoQuestions(self.version.clone()));
        }

        let mut domain_keys = HashSet::new();
        let mut owned = HashSet::new();
        for domain in &self.domains {
            if !domain_keys.insert(domain.key.as_str()) {
                return Err(BankError::DuplicateDomain(domain.key.clone()));
            }
            if domain.traits.is_empty() {
                return Err(BankError::EmptyDomain(domain.key.clone()));
            }
            for t in &domain.traits {
                if !owned.insert(t.as_str()) {
                    return Err(BankError::OverlappingDomain(t.clone()));
                }
            }
        }

        let mut question_ids = HashSet::new();
        for question in &self.questions {
            if !question_ids.insert(question.id) {
                return Err(BankError::DuplicateQuestion(question.id));
            }

            let mut option_ids = HashSet::new();
            for option in &question.options {
                if !option_ids.insert(&option.id) {
                    return Err(BankError::DuplicateOption {
                        question: question.id,
                        option: option.id.clone(),
                    });
                }
                if option.weights.is_empty() {
                    return Err(BankError::EmptyOption {
                        question: question.id,
                        option: option.id.clone(),
                    });
                }
                for (trait_key, points) in &option.weights {
                    if points.is_zero() {
                        return Err(BankError::ZeroWeight {
                            question: question.id,
                            option: option.id.clone(),
                            trait_key: trait_key.clone(),
                        });
                    }
                    if !owned.contains(trait_key.as_str()) {
                        return Err(BankError::UnassignedTrait(trait_key.clone()));
                    }
                }
            }
        }

        Ok(())
    }

    /// Find a question
    #[inline]
    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Look up the weights for a selected option
    #[must_use]
    pub fn lookup(&self, question: QuestionId, option: &OptionId) -> Option<&AnswerOption> {
        self.question(question).and_then(|q| q.option(option))
    }

    /// Number of questions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Check for an empty bank
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Every trait any option can award, in declaration order
    ///
    /// Declaration order is the order of first appearance walking questions
    /// and options top to bottom.
    #[must_use]
    pub fn traits(&self) -> Vec<TraitKey> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for question in &self.questions {
            for option in &question.options {
                for key in option.weights.keys() {
                    if seen.insert(key.as_str()) {
                        out.push(key.clone());
                    }
                }
            }
        }
        out
    }

    /// Find a domain by key
    #[inline]
    #[must_use]
    pub fn domain(&self, key: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.key == key)
    }

    /// Domain owning a trait
    #[inline]
    #[must_use]
    pub fn domain_of(&self, trait_key: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.contains(trait_key))
    }

    /// Highest total a single trait can reach (one option per question)
    #[must_use]
    pub fn max_points(&self, trait_key: &str) -> Points {
        self.questions
            .iter()
            .map(|q| {
                q.options
                    .iter()
                    .map(|o| o.weight(trait_key))
                    .max()
                    .unwrap_or(Points::ZERO)
            })
            .sum()
    }

    /// Content fingerprint of the canonical JSON form
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        // BTreeMap weights and ordered Vecs make the encoding canonical.
        Fingerprint::of_serializable(self)
            .unwrap_or_else(|_| Fingerprint::compute(self.version.as_bytes()))
    }

    /// All questions personalized for a child
    #[must_use]
    pub fn personalized_questions(&self, child_name: &str) -> Vec<Question> {
        self.questions
            .iter()
            .map(|q| q.personalized(child_name))
            .collect()
    }
}
