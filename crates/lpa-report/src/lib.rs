//! Learning Profile Assessment: reports
//!
//! Everything a parent receives after the quiz.
//!
//! # Core Concepts
//!
//! - [`ReportCatalog`]: canned text per report key with a mandatory
//!   `default` entry, so lookup never fails
//! - [`Report`]: catalog text resolved and personalized for one profile
//! - [`ContentLibrary`]: long-form content for the four processing styles
//! - [`render_summary_email`] / [`render_pdf_cover_email`]: escaped HTML
//! - [`ReportLayout`] + [`PdfWriter`]: the multi-page PDF report
//! - [`RenderCache`]: rendered PDFs keyed by input hash
//!
//! # Example
//!
//! ```rust,ignore
//! use lpa_report::{render_pdf, ContentLibrary, ReportInput};
//!
//! let input = ReportInput::new("Maya", "kinesthetic", chrono::Utc::now().date_naive());
//! let pdf = render_pdf(&input, &ContentLibrary::builtin()?);
//! std::fs::write("maya.pdf", pdf)?;
//! ```

#![warn(unreachable_pub)]

mod cache;
mod catalog;
mod content;
mod error;
mod html;
mod layout;
mod metrics;
mod pdf;
mod report;

pub use cache::{render_pdf, RenderCache, RenderKey};
pub use catalog::{fill, CatalogSet, Insight, ReportCatalog, ReportEntry, CHILD_PLACEHOLDER, DEFAULT_KEY};
pub use content::{canonical_style, ContentLibrary, ProfileContent, FALLBACK_STYLE, STYLES};
pub use error::ReportError;
pub use html::{escape, pdf_subject, render_pdf_cover_email, render_summary_email, summary_subject};
pub use layout::{
    Color, Element, Page, ReportInput, ReportLayout, Stroke, StylePercentiles, FALLBACK_CHILD,
    MARGIN, PAGE_HEIGHT, PAGE_WIDTH,
};
pub use metrics::{text_width, wrap, Font};
pub use pdf::PdfWriter;
pub use report::Report;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
