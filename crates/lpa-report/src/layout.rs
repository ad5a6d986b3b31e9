//! PDF report layout
//!
//! [`ReportLayout::build`] turns a [`ReportInput`] into pages of positioned
//! elements. Coordinates are millimetres from the top-left corner of an A4
//! page. Blocks never straddle the bottom margin: when the next block would
//! cross it, a new page starts.

use crate::content::{canonical_style, ContentLibrary, ProfileContent};
use crate::metrics::{text_width, wrap, Font, MM_PER_PT};
use chrono::NaiveDate;
use lpa_scoring::{percentile_for, Percentile, Profile};
use serde::{Deserialize, Serialize};

/// A4 width in millimetres
pub const PAGE_WIDTH: f32 = 210.0;
/// A4 height in millimetres
pub const PAGE_HEIGHT: f32 = 297.0;
/// Page margin in millimetres
pub const MARGIN: f32 = 20.0;

const LINE: f32 = 6.0;
const BODY_SIZE: f32 = 11.0;
const MAX_NAME_CHARS: usize = 60;

/// Name used when the child's name is blank
pub const FALLBACK_CHILD: &str = "Your Child";

/// RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Headings and highlights
    pub const PRIMARY_BLUE: Self = Self(25, 118, 210);
    /// Info box fill
    pub const LIGHT_BLUE: Self = Self(227, 242, 253);
    /// Accent headings
    pub const ACCENT_ORANGE: Self = Self(255, 152, 0);
    /// Insight box fill
    pub const LIGHT_ORANGE: Self = Self(255, 243, 224);
    /// Body text
    pub const DARK_GRAY: Self = Self(55, 65, 81);
    /// Secondary text and chart bars
    pub const MEDIUM_GRAY: Self = Self(107, 114, 128);
    /// Panel fill
    pub const LIGHT_GRAY: Self = Self(249, 250, 251);
    /// Strength markers
    pub const SUCCESS_GREEN: Self = Self(34, 197, 94);
    /// Strength box fill
    pub const LIGHT_GREEN: Self = Self(240, 253, 244);
    /// Cover banner
    pub const BANNER: Self = Self(30, 64, 175);
    /// White
    pub const WHITE: Self = Self(255, 255, 255);
}

/// Outline of a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Line color
    pub color: Color,
    /// Line width in millimetres
    pub width: f32,
}

/// Something drawn on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    /// Single line of text; `y` is the baseline
    Text {
        /// Left edge
        x: f32,
        /// Baseline
        y: f32,
        /// Font size in points
        size: f32,
        /// Helvetica face
        font: Font,
        /// Text color
        color: Color,
        /// Content, already wrapped
        text: String,
    },
    /// Rectangle, optionally rounded
    Rect {
        /// Left edge
        x: f32,
        /// Top edge
        y: f32,
        /// Width
        width: f32,
        /// Height
        height: f32,
        /// Corner radius, zero for square corners
        radius: f32,
        /// Fill color
        fill: Option<Color>,
        /// Outline
        stroke: Option<Stroke>,
    },
    /// Filled circle
    Circle {
        /// Centre x
        x: f32,
        /// Centre y
        y: f32,
        /// Radius
        radius: f32,
        /// Fill color
        fill: Color,
    },
}

impl Element {
    /// Bounding box as `(left, top, right, bottom)`
    #[must_use]
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        match self {
            Self::Text {
                x,
                y,
                size,
                font,
                text,
                ..
            } => {
                let em = size * MM_PER_PT;
                (*x, y - em, x + text_width(text, *font, *size), y + em * 0.25)
            }
            Self::Rect {
                x,
                y,
                width,
                height,
                stroke,
                ..
            } => {
                let half = stroke.map_or(0.0, |s| s.width / 2.0);
                (x - half, y - half, x + width + half, y + height + half)
            }
            Self::Circle { x, y, radius, .. } => (x - radius, y - radius, x + radius, y + radius),
        }
    }
}

/// One page of elements, in drawing order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Elements in drawing order
    pub elements: Vec<Element>,
}

impl Page {
    /// All text on the page, one line per element
    #[must_use]
    pub fn text(&self) -> String {
        self.elements
            .iter()
            .filter_map(|e| match e {
                Element::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Percentiles shown in the score chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StylePercentiles {
    /// Visual bar
    pub visual: Percentile,
    /// Kinesthetic bar
    pub kinesthetic: Percentile,
    /// Auditory bar
    pub auditory: Percentile,
    /// Reading/writing bar
    pub text: Percentile,
}

impl Default for StylePercentiles {
    fn default() -> Self {
        Self {
            visual: Percentile::new(50),
            kinesthetic: Percentile::new(50),
            auditory: Percentile::new(80),
            text: Percentile::new(30),
        }
    }
}

impl StylePercentiles {
    /// Chart bars in display order
    #[must_use]
    pub fn bars(&self) -> [(&'static str, Percentile); 4] {
        [
            ("Visual", self.visual),
            ("Kinesthetic", self.kinesthetic),
            ("Auditory", self.auditory),
            ("Text", self.text),
        ]
    }

    fn set(&mut self, style: &str, value: Percentile) {
        match canonical_style(style) {
            "visual" => self.visual = value,
            "kinesthetic" => self.kinesthetic = value,
            "auditory" => self.auditory = value,
            "text" => self.text = value,
            _ => {}
        }
    }
}

/// Everything the PDF depends on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    /// Name as entered
    pub child_name: String,
    /// Primary processing style; unknown styles use the visual content
    pub primary_style: String,
    /// Primary domain percentile, 70 when absent
    #[serde(default)]
    pub percentile: Option<Percentile>,
    /// Score chart bars
    #[serde(default)]
    pub percentiles: StylePercentiles,
    /// Date printed on the report
    pub generated_on: NaiveDate,
}

impl ReportInput {
    /// Create input with default percentiles
    #[must_use]
    pub fn new(
        child_name: impl Into<String>,
        primary_style: impl Into<String>,
        generated_on: NaiveDate,
    ) -> Self {
        Self {
            child_name: child_name.into(),
            primary_style: primary_style.into(),
            percentile: None,
            percentiles: StylePercentiles::default(),
            generated_on,
        }
    }

    /// Set the primary domain percentile
    #[must_use]
    pub fn with_percentile(mut self, percentile: Percentile) -> Self {
        self.percentile = Some(percentile);
        self
    }

    /// Set the chart percentiles
    #[must_use]
    pub fn with_percentiles(mut self, percentiles: StylePercentiles) -> Self {
        self.percentiles = percentiles;
        self
    }

    /// Input for a resolved profile
    ///
    /// Chart bars come from the leading domain's ranking; styles it does
    /// not cover keep their defaults.
    #[must_use]
    pub fn from_profile(profile: &Profile, child_name: &str, generated_on: NaiveDate) -> Self {
        let mut percentiles = StylePercentiles::default();
        if let Some(lead) = profile.domains.first() {
            for score in &lead.ranking {
                percentiles.set(score.trait_key.as_str(), percentile_for(score.points));
            }
        }
        Self {
            child_name: child_name.to_string(),
            primary_style: canonical_style(&profile.primary).to_string(),
            percentile: profile.percentile(),
            percentiles,
            generated_on,
        }
    }

    /// Display name, trimmed and bounded
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = self.child_name.trim();
        if name.is_empty() {
            return FALLBACK_CHILD.to_string();
        }
        name.chars().take(MAX_NAME_CHARS).collect()
    }
}

/// Positioned pages of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLayout {
    /// Page width in mm
    pub width: f32,
    /// Page height in mm
    pub height: f32,
    /// Pages in order
    pub pages: Vec<Page>,
}

impl ReportLayout {
    /// Lay out the report
    #[must_use]
    pub fn build(input: &ReportInput, library: &ContentLibrary) -> Self {
        let child = input.display_name();
        let content = library.get(&input.primary_style).personalized(&child);
        let percentile = input.percentile.unwrap_or_default();

        let mut c = Composer::new();
        c.cover(&child);
        c.insight_box(
            &executive_summary(&child, &content, percentile),
            Color::LIGHT_BLUE,
            Color::PRIMARY_BLUE,
        );
        c.header("Assessment Methodology", Color::PRIMARY_BLUE);
        c.paragraph(&methodology(&child), BODY_SIZE, Color::DARK_GRAY);
        c.header("Learning Profile Analysis", Color::ACCENT_ORANGE);
        c.paragraph(
            &format!(
                "{child}'s assessment reveals their strongest learning processing channels. \
                 Higher scores indicate more natural and effective learning pathways."
            ),
            BODY_SIZE,
            Color::DARK_GRAY,
        );
        c.score_chart(&input.percentiles);
        c.paragraph(
            "Learning Styles: Visual (charts/diagrams), Kinesthetic (movement/hands-on), \
             Auditory (listening/discussion), Text (reading/writing)",
            10.0,
            Color::MEDIUM_GRAY,
        );

        c.new_page();
        c.header("Why Traditional School Feels Challenging", Color::ACCENT_ORANGE);
        c.insight_box(&content.why_struggles, Color::LIGHT_ORANGE, Color::ACCENT_ORANGE);
        c.header(
            &format!("Understanding {child}'s Learning Strengths"),
            Color::SUCCESS_GREEN,
        );
        c.paragraph(
            &format!(
                "{}\n\nKey Strengths: {}",
                content.what_this_means, content.strengths_examples
            ),
            BODY_SIZE,
            Color::DARK_GRAY,
        );
        c.header("Research Foundation", Color::MEDIUM_GRAY);
        c.paragraph(&content.research_background, 10.0, Color::MEDIUM_GRAY);

        c.new_page();
        c.header("Evidence-Based Home Strategies", Color::PRIMARY_BLUE);
        c.bullets(&content.home_strategies, Color::PRIMARY_BLUE);
        c.header("Strategies to Request at School", Color::PRIMARY_BLUE);
        c.bullets(&content.school_strategies, Color::PRIMARY_BLUE);
        c.header("Classroom Accommodations", Color::PRIMARY_BLUE);
        c.bullets(&content.accommodations, Color::PRIMARY_BLUE);
        c.header(&format!("Talking With {child}'s Teacher"), Color::ACCENT_ORANGE);
        c.insight_box(
            &format!("\"{}\"", content.teacher_script),
            Color::LIGHT_ORANGE,
            Color::ACCENT_ORANGE,
        );
        c.header("30-Day Implementation Timeline", Color::SUCCESS_GREEN);
        c.timeline();

        c.new_page();
        c.header("When to Consider Additional Support", Color::ACCENT_ORANGE);
        c.insight_box(&support(&content), Color::LIGHT_ORANGE, Color::ACCENT_ORANGE);
        c.insight_box(&remember(&child), Color::LIGHT_GREEN, Color::SUCCESS_GREEN);
        c.footer(&child, input.generated_on);

        let layout = Self {
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            pages: c.finish(),
        };
        tracing::debug!(
            style = %input.primary_style,
            pages = layout.pages.len(),
            "laid out report"
        );
        layout
    }

    /// Check that every element lies inside the page
    #[must_use]
    pub fn is_within_pages(&self) -> bool {
        self.pages.iter().flat_map(|p| &p.elements).all(|e| {
            let (left, top, right, bottom) = e.bounds();
            left >= 0.0 && top >= 0.0 && right <= self.width && bottom <= self.height
        })
    }
}

fn executive_summary(child: &str, content: &ProfileContent, percentile: Percentile) -> String {
    let lower = content.profile_type.to_lowercase();
    let processing = lower.trim_end_matches(" learner");
    format!(
        "EXECUTIVE SUMMARY\n\n{}\n\nAssessment shows {child} performs at the {percentile}th \
         percentile in {processing} processing, indicating this as their primary learning \
         strength.",
        content.superpower
    )
}

fn methodology(child: &str) -> String {
    format!(
        "This assessment utilizes a multi-dimensional framework based on established learning \
         science research. {child}'s responses were analyzed across four key domains: \
         visual-spatial, kinesthetic-tactile, auditory-linguistic, and analytical-sequential \
         processing. The assessment incorporates principles from Universal Design for Learning \
         (UDL) and cognitive load theory to identify optimal learning conditions."
    )
}

fn support(content: &ProfileContent) -> String {
    format!(
        "PROFESSIONAL CONSULTATION INDICATORS\n\nConsider consulting with your school's \
         learning specialist or an educational psychologist if you observe:\n\n- {}\n\
         - Strategies show no improvement after 6-8 weeks of consistent implementation\n\
         - Significant emotional distress related to learning\n\
         - Widening gap between ability and performance\n\nREMEMBER: This assessment \
         identifies learning preferences and educational strategies. It is not a clinical \
         diagnosis or substitute for professional psychological evaluation when comprehensive \
         support is needed.",
        content.red_flags
    )
}

fn remember(child: &str) -> String {
    format!(
        "REMEMBER\n\n{child} is already intelligent, creative, and capable. These strategies \
         simply help them demonstrate their brilliance in ways that traditional schooling \
         recognizes.\n\nYou're not fixing anything - you're unlocking potential that was \
         always there.\n\nEvery small step forward is progress worth celebrating."
    )
}

const TIMELINE: [(&str, &str, &str); 4] = [
    (
        "Week 1",
        "Select 2-3 strategies that align with your family's routine",
        "Start small and build confidence",
    ),
    (
        "Week 2",
        "Implement chosen strategies consistently",
        "Document what works and what doesn't",
    ),
    (
        "Week 3",
        "Monitor progress and adjust approaches as needed",
        "Look for improvements in attitude and engagement",
    ),
    (
        "Week 4",
        "Evaluate overall progress and celebrate successes",
        "Plan for continued implementation",
    ),
];

/// Cursor that places blocks and breaks pages
struct Composer {
    done: Vec<Page>,
    current: Page,
    y: f32,
}

impl Composer {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            current: Page::default(),
            y: MARGIN,
        }
    }

    fn content_width() -> f32 {
        PAGE_WIDTH - 2.0 * MARGIN
    }

    fn push(&mut self, element: Element) {
        self.current.elements.push(element);
    }

    fn text(&mut self, x: f32, y: f32, size: f32, font: Font, color: Color, text: String) {
        self.push(Element::Text {
            x,
            y,
            size,
            font,
            color,
            text,
        });
    }

    fn new_page(&mut self) {
        self.done.push(std::mem::take(&mut self.current));
        self.y = MARGIN + 10.0;
    }

    fn ensure(&mut self, required: f32) {
        if self.y + required > PAGE_HEIGHT - MARGIN {
            self.new_page();
        }
    }

    fn finish(mut self) -> Vec<Page> {
        self.done.push(self.current);
        self.done
    }

    /// Centered lines starting at baseline `y`; returns the extra height
    /// used beyond the first line
    fn centered(&mut self, text: &str, y: f32, size: f32, font: Font, color: Color) -> f32 {
        let line_height = size * MM_PER_PT * 1.15;
        let lines = wrap(text, font, size, Self::content_width());
        let count = lines.len();
        for (i, line) in lines.into_iter().enumerate() {
            let x = (PAGE_WIDTH - text_width(&line, font, size)) / 2.0;
            self.text(x, y + i as f32 * line_height, size, font, color, line);
        }
        count.saturating_sub(1) as f32 * line_height
    }

    fn cover(&mut self, child: &str) {
        let title = format!("{child}'s Learning Profile");
        let lines = wrap(&title, Font::Bold, 28.0, Self::content_width()).len();
        let extra = lines.saturating_sub(1) as f32 * 28.0 * MM_PER_PT * 1.15;
        self.push(Element::Rect {
            x: 0.0,
            y: 0.0,
            width: PAGE_WIDTH,
            height: 60.0 + extra,
            radius: 0.0,
            fill: Some(Color::BANNER),
            stroke: None,
        });
        self.centered(&title, 25.0, 28.0, Font::Bold, Color::WHITE);
        self.centered(
            "Comprehensive Learning Assessment Report",
            40.0 + extra,
            16.0,
            Font::Regular,
            Color::WHITE,
        );
        self.centered(
            "Vedyx Learning Assessment Center",
            52.0 + extra,
            12.0,
            Font::Regular,
            Color::WHITE,
        );
        self.y = 80.0 + extra;
    }

    fn header(&mut self, title: &str, color: Color) {
        let lines = wrap(title, Font::Bold, 14.0, Self::content_width() - 20.0);
        let extra = lines.len().saturating_sub(1) as f32 * LINE;
        self.ensure(40.0 + extra);
        self.push(Element::Rect {
            x: MARGIN,
            y: self.y - 5.0,
            width: Self::content_width(),
            height: 25.0 + extra,
            radius: 3.0,
            fill: Some(color),
            stroke: None,
        });
        for (i, line) in lines.into_iter().enumerate() {
            let y = self.y + 8.0 + i as f32 * LINE;
            self.text(MARGIN + 10.0, y, 14.0, Font::Bold, Color::WHITE, line);
        }
        self.y += 35.0 + extra;
    }

    fn insight_box(&mut self, text: &str, fill: Color, border: Color) {
        let lines = wrap(text, Font::Regular, BODY_SIZE, Self::content_width() - 20.0);
        // tallest box that fits below the top of a fresh page
        let per_page = ((PAGE_HEIGHT - 2.0 * MARGIN - 10.0 - 20.0) / LINE).floor() as usize;
        for chunk in lines.chunks(per_page.max(1)) {
            let height = chunk.len() as f32 * LINE + 20.0;
            self.ensure(height);
            self.push(Element::Rect {
                x: MARGIN,
                y: self.y,
                width: Self::content_width(),
                height,
                radius: 2.0,
                fill: Some(fill),
                stroke: Some(Stroke {
                    color: border,
                    width: 1.5,
                }),
            });
            for (i, line) in chunk.iter().enumerate() {
                let y = self.y + 15.0 + i as f32 * LINE;
                self.text(MARGIN + 10.0, y, BODY_SIZE, Font::Regular, Color::DARK_GRAY, line.clone());
            }
            self.y += height + 15.0;
        }
    }

    fn paragraph(&mut self, text: &str, size: f32, color: Color) {
        for line in wrap(text, Font::Regular, size, Self::content_width()) {
            self.ensure(LINE);
            let y = self.y;
            self.text(MARGIN, y, size, Font::Regular, color, line);
            self.y += LINE;
        }
        self.y += 10.0;
    }

    fn bullets(&mut self, items: &[String], color: Color) {
        for item in items {
            let lines = wrap(item, Font::Regular, BODY_SIZE, Self::content_width() - 15.0);
            let height = lines.len() as f32 * LINE + 8.0;
            self.ensure(height);
            self.push(Element::Circle {
                x: MARGIN + 5.0,
                y: self.y + 3.0,
                radius: 2.0,
                fill: color,
            });
            for (i, line) in lines.into_iter().enumerate() {
                let y = self.y + 5.0 + i as f32 * LINE;
                self.text(MARGIN + 15.0, y, BODY_SIZE, Font::Regular, Color::DARK_GRAY, line);
            }
            self.y += height;
        }
        self.y += 5.0;
    }

    fn score_chart(&mut self, percentiles: &StylePercentiles) {
        self.ensure(80.0);
        let top = self.y;
        self.push(Element::Rect {
            x: MARGIN,
            y: top,
            width: Self::content_width(),
            height: 60.0,
            radius: 2.0,
            fill: Some(Color::LIGHT_GRAY),
            stroke: None,
        });

        let bars = percentiles.bars();
        let bar_width = (Self::content_width() - 60.0) / 4.0;
        let highest = bars.iter().map(|(_, p)| *p).max().unwrap_or_default();
        for (i, (label, pct)) in bars.into_iter().enumerate() {
            let x = MARGIN + 15.0 + i as f32 * (bar_width + 10.0);
            let height = f32::from(pct.get()) / 100.0 * 40.0;
            let bar_y = top + 45.0 - height;
            let color = if pct == highest {
                Color::PRIMARY_BLUE
            } else {
                Color::MEDIUM_GRAY
            };
            self.push(Element::Rect {
                x,
                y: bar_y,
                width: bar_width,
                height,
                radius: 0.0,
                fill: Some(color),
                stroke: None,
            });

            let value = format!("{pct}%");
            let value_x = x + (bar_width - text_width(&value, Font::Bold, 10.0)) / 2.0;
            self.text(value_x, bar_y - 3.0, 10.0, Font::Bold, Color::DARK_GRAY, value);
            let label_x = x + (bar_width - text_width(label, Font::Regular, 9.0)) / 2.0;
            self.text(
                label_x,
                top + 55.0,
                9.0,
                Font::Regular,
                Color::MEDIUM_GRAY,
                label.to_string(),
            );
        }
        self.y += 80.0;
    }

    fn timeline(&mut self) {
        let task_x = MARGIN + 30.0;
        let task_width = Self::content_width() - 30.0;
        for (week, task, focus) in TIMELINE {
            let tasks = wrap(task, Font::Regular, BODY_SIZE, task_width);
            let focus = wrap(&format!("Focus: {focus}"), Font::Italic, 10.0, task_width);
            self.ensure((tasks.len() + focus.len()) as f32 * LINE + 8.0);
            let y = self.y;
            self.text(MARGIN, y, 12.0, Font::Bold, Color::SUCCESS_GREEN, week.to_string());
            for line in tasks {
                let y = self.y;
                self.text(task_x, y, BODY_SIZE, Font::Regular, Color::DARK_GRAY, line);
                self.y += LINE;
            }
            for line in focus {
                let y = self.y;
                self.text(task_x, y, 10.0, Font::Italic, Color::MEDIUM_GRAY, line);
                self.y += LINE;
            }
            self.y += 8.0;
        }
    }

    fn footer(&mut self, child: &str, generated_on: NaiveDate) {
        self.ensure(35.0);
        let date = generated_on.format("%-m/%-d/%Y");
        self.centered(
            "Report prepared by Vedyx Learning Assessment Center",
            PAGE_HEIGHT - 20.0,
            10.0,
            Font::Regular,
            Color::MEDIUM_GRAY,
        );
        // the name is bounded, but keep the line on the page regardless
        let personal = format!("Personalized for {child} \u{2022} Generated {date}");
        let width = text_width(&personal, Font::Regular, 10.0);
        let personal = if width > Self::content_width() {
            format!("Generated {date}")
        } else {
            personal
        };
        self.centered(&personal, PAGE_HEIGHT - 12.0, 10.0, Font::Regular, Color::MEDIUM_GRAY);
        self.centered(
            "Evidence-based strategies for neurodivergent learners",
            PAGE_HEIGHT - 4.0,
            10.0,
            Font::Regular,
            Color::MEDIUM_GRAY,
        );
    }
}
