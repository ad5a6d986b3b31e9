use lpa_server::routes;
use lpa_test_utils::{setup_test_service, uniform_answers};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use warp::http::StatusCode;

fn body(response: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

#[tokio::test]
async fn health_check() {
    let t = setup_test_service();
    let response = warp::test::request()
        .path("/healthz")
        .reply(&routes(t.service))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response)["status"], "ok");
}

#[tokio::test]
async fn lists_builtin_banks() {
    let t = setup_test_service();
    let response = warp::test::request()
        .path("/api/banks")
        .reply(&routes(t.service))
        .await;
    let banks = body(&response);
    let versions: Vec<&str> = banks
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["version"].as_str().unwrap())
        .collect();
    assert_eq!(versions, vec!["classic", "enhanced", "multi-domain"]);
    let default: Vec<&Value> = banks
        .as_array()
        .unwrap()
        .iter()
        .filter(|b| b["isDefault"] == true)
        .collect();
    assert_eq!(default.len(), 1);
    assert_eq!(default[0]["version"], "enhanced");
}

#[tokio::test]
async fn personalizes_questions_without_weights() {
    let t = setup_test_service();
    let response = warp::test::request()
        .path("/api/banks/classic?child=Maya")
        .reply(&routes(t.service))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let bank = body(&response);
    assert_eq!(bank["questions"].as_array().unwrap().len(), 5);
    assert!(bank["questions"][0]["prompt"].as_str().unwrap().contains("Maya"));
    assert!(bank["questions"][0]["options"][0].get("weights").is_none());
}

#[tokio::test]
async fn unknown_bank_is_404() {
    let t = setup_test_service();
    let response = warp::test::request()
        .path("/api/banks/v9")
        .reply(&routes(t.service))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body(&response)["error"].as_str().unwrap().contains("v9"));
}

#[tokio::test]
async fn submit_assessment() {
    let t = setup_test_service();
    let answers: Vec<Value> = uniform_answers(11, "A")
        .iter()
        .map(|a| json!({ "questionId": a.question.0, "answer": a.option.as_str() }))
        .collect();
    let response = warp::test::request()
        .method("POST")
        .path("/api/assessments")
        .json(&json!({
            "childName": "Maya",
            "childAge": "8",
            "parentEmail": "parent@example.com",
            "answers": answers,
        }))
        .reply(&routes(t.service))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let outcome = body(&response);
    assert_eq!(outcome["bankVersion"], "enhanced");
    assert_eq!(outcome["stored"], true);
    assert_eq!(t.sink.documents("assessments").len(), 1);
}

#[tokio::test]
async fn invalid_form_is_400_with_fields() {
    let t = setup_test_service();
    let response = warp::test::request()
        .method("POST")
        .path("/api/assessments")
        .json(&json!({
            "childName": "",
            "childAge": "8",
            "parentEmail": "parent@example.com",
            "answers": [],
        }))
        .reply(&routes(t.service))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&response)["fields"]["childName"], "Child's name is required");
}

#[tokio::test]
async fn malformed_json_is_400() {
    let t = setup_test_service();
    let response = warp::test::request()
        .method("POST")
        .path("/api/send-report")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&routes(t.service))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body(&response)["error"].is_string());
}

#[tokio::test]
async fn send_pdf_report_rejects_loose_address() {
    let t = setup_test_service();
    let response = warp::test::request()
        .method("POST")
        .path("/api/send-pdf-report")
        .json(&json!({ "email": "a@b.c", "childName": "Maya" }))
        .reply(&routes(t.service))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&response)["error"], "Invalid email format: a@b.c");
    assert!(t.mailer.sent().is_empty());
}

#[tokio::test]
async fn send_pdf_report_with_client_data() {
    let t = setup_test_service();
    let response = warp::test::request()
        .method("POST")
        .path("/api/send-pdf-report")
        .json(&json!({
            "email": "parent@example.com",
            "childName": "Maya",
            "reportData": { "profile": { "primaryDomain": "text", "percentile": 95 } },
        }))
        .reply(&routes(t.service))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(&response)["success"], true);
    let sent = t.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].attachment.as_ref().unwrap().name,
        "Maya_Learning_Assessment.pdf"
    );
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let t = setup_test_service();
    let response = warp::test::request()
        .path("/nope")
        .reply(&routes(t.service))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(&response)["error"], "not found");
}
