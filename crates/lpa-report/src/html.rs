//! HTML email bodies
//!
//! Every interpolated value is escaped; templates themselves are trusted.

use crate::content::ProfileContent;
use crate::report::Report;
use lpa_scoring::Percentile;
use std::fmt::Write as _;

/// Escape text for HTML element and attribute content
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Subject line of the summary email
#[must_use]
pub fn summary_subject(child_name: &str) -> String {
    format!("{child_name}'s Learning Assessment Results")
}

/// Subject line of the PDF email
#[must_use]
pub fn pdf_subject(child_name: &str) -> String {
    format!("{child_name}'s Learning Assessment Results (PDF Report)")
}

fn list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = write!(out, "<h3>{}</h3>\n<ul>\n", escape(heading));
    for item in items {
        let _ = writeln!(out, "<li>{}</li>", escape(item));
    }
    out.push_str("</ul>\n");
}

fn report_html(report: &Report) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<h2>{}</h2>\n<p>{}</p>\n",
        escape(&report.title),
        escape(&report.description)
    );
    list(&mut out, "Strengths", &report.strengths);
    list(&mut out, "Recommended Strategies", &report.strategies);
    list(&mut out, "Next Steps", &report.next_steps);
    list(&mut out, "What We Noticed", &report.signals);
    list(&mut out, "Observed Strengths", &report.observed_strengths);
    for insight in &report.insights {
        let _ = writeln!(out, "<h3>{}</h3>", escape(&insight.heading));
        if !insight.intro.is_empty() {
            let _ = writeln!(out, "<p>{}</p>", escape(&insight.intro));
        }
        out.push_str("<ul>\n");
        for item in &insight.items {
            let _ = writeln!(out, "<li>{}</li>", escape(item));
        }
        out.push_str("</ul>\n");
    }
    out
}

/// Summary email with the assembled report inline
#[must_use]
pub fn render_summary_email(child_name: &str, report: &Report) -> String {
    let child = escape(child_name);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; }}
.header {{ background: #4F46E5; color: white; padding: 20px; text-align: center; }}
.content {{ padding: 20px; background: #f9f9f9; }}
.footer {{ text-align: center; padding: 20px; color: #666; font-size: 14px; }}
</style>
</head>
<body>
<div class="header">
<h1>🌟 {child}'s Learning Assessment Results</h1>
</div>
<div class="content">
<p>Hi there,</p>
<p>Here are {child}'s learning assessment results:</p>
{report}
</div>
<div class="footer">
<p>Thank you for using our assessment tool!</p>
</div>
</body>
</html>
"#,
        report = report_html(report),
    )
}

const PDF_CONTENTS: [&str; 5] = [
    "Assessment Methodology",
    "Visual Score Analysis",
    "Evidence-Based Home Strategies (12+)",
    "30-Day Implementation Plan",
    "When to Seek Support",
];

/// Cover email sent with the PDF attachment
#[must_use]
pub fn render_pdf_cover_email(
    child_name: &str,
    content: &ProfileContent,
    percentile: Percentile,
) -> String {
    let child = escape(child_name);
    let profile_type = escape(&content.profile_type);
    let profile_lower = escape(&content.profile_type.to_lowercase());
    let contents: String = PDF_CONTENTS
        .iter()
        .map(|item| format!("<li>{item}</li>\n"))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #374151; max-width: 600px; margin: 0 auto; }}
.header {{ background: #1E40AF; color: white; padding: 30px 20px; text-align: center; }}
.section {{ padding: 20px; }}
.discovery {{ background: #E3F2FD; border-left: 4px solid #1976D2; padding: 20px; margin: 20px 0; }}
.percentile {{ background: white; border-radius: 8px; padding: 15px; text-align: center; margin-top: 15px; }}
.percentile strong {{ font-size: 32px; color: #1976D2; display: block; }}
.tip {{ background: #FFF3E0; border-left: 4px solid #FF9800; padding: 20px; margin: 20px 0; }}
.attachment {{ background: #F0FDF4; border-left: 4px solid #22C55E; padding: 20px; margin: 20px 0; }}
.signature {{ margin-top: 30px; }}
.footer {{ text-align: center; padding: 20px; color: #6B7280; font-size: 13px; border-top: 1px solid #E5E7EB; }}
</style>
</head>
<body>
<div class="header">
<h1>Your Personalized Learning Report Is Ready</h1>
<p>We found the answer for {child}</p>
</div>
<div class="section">
<p>Hi there,</p>
<p>You asked the question so many parents ask: <em>"Why does my smart child struggle in school?"</em></p>
<p>We have great news. {child}'s assessment results are in, and they point to a clear answer.</p>
<div class="discovery">
<h2>The Key Discovery</h2>
<p><strong>{child} is a {profile_type}.</strong></p>
<p>{translation}</p>
<div class="percentile">
<strong>{percentile}th</strong>
<span>Percentile in Primary Learning Domain</span>
</div>
</div>
<h2>Why School Feels Hard for {child}</h2>
<p>{why_struggles}</p>
<p>Your child isn't broken. The method just doesn't match their brain.</p>
<div class="tip">
<h2>One Thing You Can Try Tonight</h2>
<p>{parent_tip}</p>
</div>
<div class="attachment">
<h2>Your Complete Learning Guide Is Attached</h2>
<p><strong>Inside Your 4-Page Report:</strong></p>
<ul>
{contents}</ul>
</div>
<h2>The Next Step: Learning That Fits {child}</h2>
<p>Start with one strategy from the report this week and watch how {child} responds. Small changes in how information is presented can make a big difference.</p>
<p>Have a question about {child}'s results? Just reply to this email. A real person reads every message.</p>
<div class="signature">
<p>Warmly,<br>
<strong>Sarah Chen</strong><br>
Educational Learning Specialist<br>
Vedyx Learning Assessment Center</p>
</div>
<p><em>P.S. {profile_lower}s like {child} often thrive once learning matches how they think. The strategies in your report are a great place to start.</em></p>
</div>
<div class="footer">
<p><strong>Vedyx Learning Assessment Center</strong></p>
<p>Evidence-based learning strategies for neurodivergent students</p>
</div>
</body>
</html>
"#,
        translation = escape(&content.translation),
        why_struggles = escape(&content.why_struggles),
        parent_tip = escape(&content.parent_tip),
    )
}
