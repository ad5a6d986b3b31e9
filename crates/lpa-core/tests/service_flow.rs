use lpa_core::{
    AssessmentRecord, PdfReportRequest, QuizRun, SendReportRequest, ServiceError, DIRECT_REFERRAL,
    PDF_TAGS, SUMMARY_TAGS,
};
use lpa_test_utils::{answers, option, setup_test_service, submission, uniform_answers, valid_form};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn enhanced_submission_is_stored_with_record_fields() {
    let t = setup_test_service();
    let outcome = t
        .service
        .submit(submission("enhanced", &uniform_answers(11, "B")))
        .await
        .unwrap();
    assert!(outcome.stored);

    let docs = t.sink.documents("assessments");
    assert_eq!(docs.len(), 1);
    let record: AssessmentRecord = serde_json::from_value(docs[0].clone()).unwrap();
    assert_eq!(record.child_name, "Maya");
    assert_eq!(record.parent_email, "parent@example.com");
    assert_eq!(record.referral_source, DIRECT_REFERRAL);
    assert_eq!(record.source, "microsite");
    assert_eq!(record.answers.len(), 11);
    assert_eq!(record.session_id, outcome.session_id);
    assert_eq!(record.primary_learning_style, outcome.profile.primary);
    assert_eq!(record.bank_version, "enhanced");
    assert_eq!(
        record.email_preferences.urgent_concerns,
        !record.neurodivergent_traits.is_empty()
    );
    assert!(!record.has_tried_app && !record.signed_up_for_trial);

    let bank = t.service.bank(Some("enhanced")).unwrap();
    assert_eq!(record.bank_fingerprint, bank.fingerprint());
}

#[tokio::test]
async fn stored_document_uses_client_field_names() {
    let t = setup_test_service();
    t.service
        .submit(submission("classic", &answers(&[(1, "A")])))
        .await
        .unwrap();
    let doc = &t.sink.documents("assessments")[0];
    for key in [
        "childName",
        "childAge",
        "parentEmail",
        "primaryLearningStyle",
        "neurodivergentTraits",
        "urgencyLevel",
        "referralSource",
        "conversionEvents",
        "emailPreferences",
        "sessionId",
        "completionTimeSeconds",
    ] {
        assert!(doc.get(key).is_some(), "missing {key}");
    }
    assert_eq!(doc["answers"][0]["questionId"], 1);
    assert_eq!(doc["answers"][0]["answer"], "A");
}

#[tokio::test]
async fn quiz_run_feeds_the_service() {
    let t = setup_test_service();
    let mut run = QuizRun::start(t.service.bank(Some("multi-domain")).unwrap());
    run.complete_info(valid_form()).unwrap();
    loop {
        run.select(option("A")).unwrap();
        if run.submit().unwrap() {
            break;
        }
    }

    let outcome = t
        .service
        .submit(run.submission(Some("instagram".into()), None).unwrap())
        .await
        .unwrap();
    run.finish(outcome.stored);

    assert_eq!(outcome.session_id, run.session());
    assert_eq!(outcome.profile.domains.len(), 3);
    let doc = &t.sink.documents("assessments")[0];
    assert_eq!(doc["referralSource"], "instagram");
    assert_eq!(doc["conversionEvents"][0]["event"], "assessment_started");
    assert_eq!(run.events().last().unwrap().event, "results_viewed");
}

#[tokio::test]
async fn summary_and_pdf_emails_go_out() {
    let t = setup_test_service();
    t.service
        .send_report(SendReportRequest {
            email: "parent@example.com".into(),
            child_name: "Maya".into(),
            child_age: Some("8".into()),
            bank_version: Some("enhanced".into()),
            answers: uniform_answers(11, "A"),
        })
        .await
        .unwrap();
    t.service
        .send_pdf_report(PdfReportRequest {
            email: "parent@example.com".into(),
            child_name: "Maya".into(),
            bank_version: Some("enhanced".into()),
            answers: Some(uniform_answers(11, "A")),
            report_data: None,
        })
        .await
        .unwrap();

    let sent = t.mailer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].tags, SUMMARY_TAGS.map(String::from));
    assert!(sent[0].html.contains("Maya"));
    assert_eq!(sent[1].tags, PDF_TAGS.map(String::from));
    let attachment = sent[1].attachment.as_ref().unwrap();
    assert_eq!(attachment.name, "Maya_Learning_Assessment.pdf");
    assert!(attachment.content.starts_with(b"%PDF-1.4"));
}

#[tokio::test]
async fn bad_requests_are_client_errors() {
    let t = setup_test_service();
    let err = t
        .service
        .send_report(SendReportRequest {
            email: "parent@gmial.com".into(),
            child_name: "Maya".into(),
            child_age: None,
            bank_version: None,
            answers: Vec::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(ref m) if m == "Did you mean gmail.com?"));
    assert!(err.is_client_error());

    let err = t
        .service
        .submit(submission("nope", &uniform_answers(5, "A")))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(t.sink.is_empty());
    assert!(t.mailer.sent().is_empty());
}
