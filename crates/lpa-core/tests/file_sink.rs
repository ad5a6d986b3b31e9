use lpa_core::{
    AssessmentService, DocumentSink, JsonLinesSink, LogMailer, ServiceConfig, SinkConfig, SinkKind,
};
use lpa_test_utils::{submission, uniform_answers};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn appends_one_line_per_document() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonLinesSink::new(dir.path().join("out.jsonl"));
    assert!(sink.read_all().await.unwrap().is_empty());

    let first = sink.append("assessments", &json!({"n": 1})).await.unwrap();
    let second = sink.append("assessments", &json!({"n": 2})).await.unwrap();
    assert_ne!(first, second);

    let lines = sink.read_all().await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].id, first);
    assert_eq!(lines[1].document, json!({"n": 2}));
    assert_eq!(lines[1].collection, "assessments");
}

#[tokio::test]
async fn concurrent_appends_do_not_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(JsonLinesSink::new(dir.path().join("out.jsonl")));

    let tasks = (0..20).map(|n| {
        let sink = Arc::clone(&sink);
        tokio::spawn(async move { sink.append("c", &json!({ "n": n })).await })
    });
    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }
    assert_eq!(sink.read_all().await.unwrap().len(), 20);
}

#[tokio::test]
async fn service_writes_through_configured_file_sink() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assessments.jsonl");
    let config = ServiceConfig::new().with_sink(SinkConfig {
        kind: SinkKind::Jsonl,
        path: path.clone(),
        ..SinkConfig::default()
    });
    let service = AssessmentService::from_config(config).unwrap();

    let outcome = service
        .submit(submission("classic", &uniform_answers(5, "D")))
        .await
        .unwrap();
    assert!(outcome.stored);

    let lines = JsonLinesSink::new(path).read_all().await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(Some(lines[0].id.as_str()), outcome.record_id.as_deref());
    assert_eq!(lines[0].document["childName"], "Maya");
}

#[tokio::test]
async fn unwritable_path_leaves_results_unstored() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(JsonLinesSink::new(dir.path().join("missing/dir/out.jsonl")));
    let service =
        AssessmentService::new(ServiceConfig::new(), sink, Arc::new(LogMailer::new())).unwrap();

    let outcome = service
        .submit(submission("classic", &uniform_answers(5, "A")))
        .await
        .unwrap();
    assert!(!outcome.stored);
    assert_eq!(outcome.profile.primary, "visual");
}
