//! Long-form profile content for the PDF report and its cover email

use crate::catalog::fill;
use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const PROFILES: &str = include_str!("../data/profiles.yaml");

/// Style used when the requested one is unknown
pub const FALLBACK_STYLE: &str = "visual";

/// The four processing styles the PDF knows, in chart order
pub const STYLES: [&str; 4] = ["visual", "kinesthetic", "auditory", "text"];

/// Map trait keys onto a PDF style (`reading` is `text`)
#[must_use]
pub fn canonical_style(style: &str) -> &str {
    match style {
        "reading" => "text",
        other => other,
    }
}

/// Everything the PDF and cover email say about one processing style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileContent {
    /// Profile name ("Visual-Spatial Learner")
    pub profile_type: String,
    /// One-line translation for the email
    pub translation: String,
    /// "Try tonight" tip for the email
    pub parent_tip: String,
    /// Executive summary opener
    pub superpower: String,
    /// Why school feels hard
    pub why_struggles: String,
    /// What the profile means long term
    pub what_this_means: String,
    /// Strategies for home
    pub home_strategies: Vec<String>,
    /// Strategies to ask school for
    pub school_strategies: Vec<String>,
    /// Suggested words for the teacher conversation
    pub teacher_script: String,
    /// When to seek professional support
    pub red_flags: String,
    /// Comma separated strengths
    pub strengths_examples: String,
    /// Classroom accommodations
    pub accommodations: Vec<String>,
    /// Research summary
    pub research_background: String,
}

impl ProfileContent {
    /// Copy with every placeholder filled in
    #[must_use]
    pub fn personalized(&self, child_name: &str) -> Self {
        let all = |items: &[String]| -> Vec<String> {
            items.iter().map(|s| fill(s, child_name)).collect()
        };
        Self {
            profile_type: self.profile_type.clone(),
            translation: fill(&self.translation, child_name),
            parent_tip: fill(&self.parent_tip, child_name),
            superpower: fill(&self.superpower, child_name),
            why_struggles: fill(&self.why_struggles, child_name),
            what_this_means: fill(&self.what_this_means, child_name),
            home_strategies: all(&self.home_strategies),
            school_strategies: all(&self.school_strategies),
            teacher_script: fill(&self.teacher_script, child_name),
            red_flags: fill(&self.red_flags, child_name),
            strengths_examples: fill(&self.strengths_examples, child_name),
            accommodations: all(&self.accommodations),
            research_background: self.research_background.clone(),
        }
    }
}

/// Profile content keyed by style
#[derive(Debug, Clone)]
pub struct ContentLibrary {
    profiles: BTreeMap<String, ProfileContent>,
    fallback: ProfileContent,
}

impl ContentLibrary {
    /// Load the built-in content
    ///
    /// # Errors
    /// Returns a parse error or [`ReportError::MissingContent`] when the
    /// fallback style is absent
    pub fn builtin() -> Result<Self, ReportError> {
        Self::from_yaml(PROFILES)
    }

    /// Parse content from YAML
    ///
    /// # Errors
    /// Returns a parse error or [`ReportError::MissingContent`] when the
    /// fallback style is absent
    pub fn from_yaml(source: &str) -> Result<Self, ReportError> {
        let profiles: BTreeMap<String, ProfileContent> = serde_yaml::from_str(source)?;
        let fallback = profiles
            .get(FALLBACK_STYLE)
            .cloned()
            .ok_or_else(|| ReportError::MissingContent(FALLBACK_STYLE.to_string()))?;
        Ok(Self { profiles, fallback })
    }

    /// Content for a style, `visual` when unknown
    #[must_use]
    pub fn get(&self, style: &str) -> &ProfileContent {
        self.profiles
            .get(canonical_style(style))
            .unwrap_or(&self.fallback)
    }

    /// Check if a style has its own content
    #[inline]
    #[must_use]
    pub fn contains(&self, style: &str) -> bool {
        self.profiles.contains_key(canonical_style(style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_all_styles() {
        let library = ContentLibrary::builtin().unwrap();
        for style in STYLES {
            assert!(library.contains(style), "{style}");
            assert_eq!(library.get(style).home_strategies.len(), 5);
            assert_eq!(library.get(style).accommodations.len(), 7);
        }
    }

    #[test]
    fn reading_aliases_text() {
        let library = ContentLibrary::builtin().unwrap();
        assert_eq!(library.get("reading").profile_type, "Analytical-Sequential Learner");
    }

    #[test]
    fn unknown_falls_back_to_visual() {
        let library = ContentLibrary::builtin().unwrap();
        assert_eq!(library.get("balanced").profile_type, "Visual-Spatial Learner");
        assert_eq!(library.get("adhd").profile_type, "Visual-Spatial Learner");
    }

    #[test]
    fn personalized_names_child() {
        let library = ContentLibrary::builtin().unwrap();
        let content = library.get("auditory").personalized("Leo");
        assert!(content.superpower.starts_with("Leo has exceptional listening"));
        assert!(content.teacher_script.contains("that Leo is an auditory learner"));
    }

    #[test]
    fn missing_fallback_is_rejected() {
        let err = ContentLibrary::from_yaml("{}").unwrap_err();
        assert!(matches!(err, ReportError::MissingContent(_)));
    }
}
