use chrono::NaiveDate;
use lpa_bank::BankRegistry;
use lpa_report::{
    render_pdf, render_pdf_cover_email, render_summary_email, CatalogSet, ContentLibrary, Report,
    ReportInput,
};
use lpa_scoring::{Answer, StrategyRegistry};
use pretty_assertions::assert_eq;

fn answers(pairs: &[(u32, &str)]) -> Vec<Answer> {
    pairs
        .iter()
        .map(|(q, o)| Answer::new(*q, o.parse().unwrap()))
        .collect()
}

#[test]
fn enhanced_quiz_to_emails_and_pdf() {
    let bank = BankRegistry::with_builtin().unwrap().get("enhanced").unwrap();
    let evaluation = StrategyRegistry::with_defaults()
        .evaluate(&bank, &answers(&[(1, "A"), (2, "A"), (3, "C"), (4, "A")]))
        .unwrap();
    let profile = &evaluation.profile;
    assert_eq!(profile.primary, "visual");

    let catalog = CatalogSet::with_builtin().unwrap().get("enhanced").unwrap();
    let report = Report::assemble(profile, &catalog, "Rosa");
    let summary = render_summary_email("Rosa", &report);
    assert!(summary.contains("Rosa's Learning Assessment Results"));

    let library = ContentLibrary::builtin().unwrap();
    let content = library.get(&profile.primary).personalized("Rosa");
    let cover = render_pdf_cover_email("Rosa", &content, profile.percentile().unwrap_or_default());
    assert!(cover.contains("Visual-Spatial Learner"));

    let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
    let pdf = render_pdf(&ReportInput::from_profile(profile, "Rosa", date), &library);
    assert!(pdf.starts_with(b"%PDF-1.4"));
    assert!(pdf.ends_with(b"%%EOF\n"));
}

#[test]
fn classic_balanced_profile_renders_with_defaults() {
    let bank = BankRegistry::with_builtin().unwrap().get("classic").unwrap();
    let evaluation = StrategyRegistry::with_defaults().evaluate(&bank, &[]).unwrap();
    assert_eq!(evaluation.profile.primary, "balanced");

    let input = ReportInput::from_profile(
        &evaluation.profile,
        "",
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
    );
    assert_eq!(input.display_name(), "Your Child");
    let pdf = render_pdf(&input, &ContentLibrary::builtin().unwrap());
    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("Your Child's Learning Profile"));
}
