//! Assembled, personalized report

use crate::catalog::{Insight, ReportCatalog};
use lpa_scoring::{Percentile, Profile};
use serde::{Deserialize, Serialize};

/// Catalog text resolved for one profile and child
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Child the report is written for
    pub child_name: String,
    /// Catalog key that matched (`default` when nothing specific did)
    pub matched_key: String,
    /// Headline
    pub title: String,
    /// Summary sentence
    pub description: String,
    /// Strengths from the catalog
    pub strengths: Vec<String>,
    /// Parent strategies
    pub strategies: Vec<String>,
    /// Follow-up activities
    pub next_steps: Vec<String>,
    /// Sections for the winning traits of the other domains
    pub insights: Vec<Insight>,
    /// Raised neurodivergent signals
    pub signals: Vec<String>,
    /// Observed strengths from the answers
    pub observed_strengths: Vec<String>,
    /// Percentile of the leading domain
    pub percentile: Percentile,
}

impl Report {
    /// Resolve catalog text for a profile
    #[must_use]
    pub fn assemble(profile: &Profile, catalog: &ReportCatalog, child_name: &str) -> Self {
        let (entry, matched) = catalog.lookup(&profile.report_keys);
        let entry = entry.personalized(child_name);

        let insights = profile
            .domains
            .iter()
            .skip(1)
            .filter_map(|d| catalog.insight(d.primary.as_str()))
            .map(|i| i.personalized(child_name))
            .collect();

        tracing::debug!(
            catalog = %catalog.version,
            matched = matched,
            primary = %profile.primary,
            "assembled report"
        );

        Self {
            child_name: child_name.to_string(),
            matched_key: matched.to_string(),
            title: entry.title,
            description: entry.description,
            strengths: entry.strengths,
            strategies: entry.strategies,
            next_steps: entry.next_steps,
            insights,
            signals: profile.signal_labels().into_iter().map(String::from).collect(),
            observed_strengths: profile
                .strength_labels()
                .into_iter()
                .map(String::from)
                .collect(),
            percentile: profile.percentile().unwrap_or_default(),
        }
    }

    /// Plain-text rendering, used for logs and the `score` command
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = format!("{}\n\n{}\n", self.title, self.description);
        let mut section = |heading: &str, items: &[String]| {
            if items.is_empty() {
                return;
            }
            out.push('\n');
            out.push_str(heading);
            out.push('\n');
            for item in items {
                out.push_str("  - ");
                out.push_str(item);
                out.push('\n');
            }
        };
        section("Strengths:", &self.strengths);
        section("Strategies:", &self.strategies);
        section("Next steps:", &self.next_steps);
        section("Signals:", &self.signals);
        section("Observed strengths:", &self.observed_strengths);
        for insight in &self.insights {
            out.push('\n');
            out.push_str(&insight.heading);
            out.push('\n');
            if !insight.intro.is_empty() {
                out.push_str(&insight.intro);
                out.push('\n');
            }
            for item in &insight.items {
                out.push_str("  - ");
                out.push_str(item);
                out.push('\n');
            }
        }
        out
    }
}
