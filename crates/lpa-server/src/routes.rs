//! HTTP routes
//!
//! | Method | Path                     | Handler            |
//! |--------|--------------------------|--------------------|
//! | GET    | `/healthz`               | liveness           |
//! | GET    | `/api/banks`             | bank summaries     |
//! | GET    | `/api/banks/:version`    | questions (`?child=` personalizes) |
//! | POST   | `/api/assessments`       | submit a quiz      |
//! | POST   | `/api/send-report`       | summary email      |
//! | POST   | `/api/send-pdf-report`   | PDF email          |

use crate::error::{handle_rejection, ApiError};
use lpa_bank::{Question, QuestionBank};
use lpa_core::{AssessmentService, PdfReportRequest, SendReportRequest, Submission};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// Largest accepted request body
const MAX_BODY_BYTES: u64 = 64 * 1024;

/// Bank listing entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankSummary {
    /// Bank version key
    pub version: String,
    /// Display title
    pub title: String,
    /// Resolution strategy name
    pub resolution: String,
    /// Number of questions
    pub questions: usize,
    /// Content fingerprint
    pub fingerprint: String,
    /// Used when a request names no bank
    pub is_default: bool,
}

/// Option as shown to the parent (weights stay on the server)
#[derive(Debug, Clone, Serialize)]
pub struct OptionView {
    /// Option label (`A`, `B`, ...)
    pub id: String,
    /// Answer text
    pub text: String,
}

/// Question as shown to the parent
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    /// Question id
    pub id: u32,
    /// Section heading
    pub section: String,
    /// Personalized prompt
    pub prompt: String,
    /// Options in display order
    pub options: Vec<OptionView>,
}

impl From<Question> for QuestionView {
    fn from(question: Question) -> Self {
        Self {
            id: question.id.0,
            section: question.section,
            prompt: question.prompt,
            options: question
                .options
                .into_iter()
                .map(|o| OptionView {
                    id: o.id.to_string(),
                    text: o.text,
                })
                .collect(),
        }
    }
}

/// A bank's questions
#[derive(Debug, Clone, Serialize)]
pub struct BankView {
    /// Bank version key
    pub version: String,
    /// Display title
    pub title: String,
    /// Content fingerprint
    pub fingerprint: String,
    /// Questions in order
    pub questions: Vec<QuestionView>,
}

impl BankView {
    fn new(bank: &QuestionBank, child: &str) -> Self {
        Self {
            version: bank.version.clone(),
            title: bank.title.clone(),
            fingerprint: bank.fingerprint().to_string(),
            questions: bank
                .personalized_questions(child)
                .into_iter()
                .map(QuestionView::from)
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct BankQuery {
    child: Option<String>,
}

/// All routes, with JSON error handling, CORS and request tracing
pub fn routes(
    service: Arc<AssessmentService>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health = warp::path!("healthz")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({ "status": "ok", "version": crate::VERSION })));

    let banks = warp::path!("api" / "banks")
        .and(warp::get())
        .and(with_service(Arc::clone(&service)))
        .map(|service: Arc<AssessmentService>| warp::reply::json(&bank_summaries(&service)));

    let bank = warp::path!("api" / "banks" / String)
        .and(warp::get())
        .and(warp::query::<BankQuery>())
        .and(with_service(Arc::clone(&service)))
        .and_then(get_bank);

    let submit = warp::path!("api" / "assessments")
        .and(warp::post())
        .and(json_body::<Submission>())
        .and(with_service(Arc::clone(&service)))
        .and_then(submit_assessment);

    let report = warp::path!("api" / "send-report")
        .and(warp::post())
        .and(json_body::<SendReportRequest>())
        .and(with_service(Arc::clone(&service)))
        .and_then(send_report);

    let pdf = warp::path!("api" / "send-pdf-report")
        .and(warp::post())
        .and(json_body::<PdfReportRequest>())
        .and(with_service(service))
        .and_then(send_pdf_report);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    health
        .or(banks)
        .or(bank)
        .or(submit)
        .or(report)
        .or(pdf)
        .with(cors)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

fn with_service(
    service: Arc<AssessmentService>,
) -> impl Filter<Extract = (Arc<AssessmentService>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&service))
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn bank_summaries(service: &AssessmentService) -> Vec<BankSummary> {
    let default = &service.config().default_bank;
    service
        .banks()
        .iter()
        .map(|bank| BankSummary {
            version: bank.version.clone(),
            title: bank.title.clone(),
            resolution: bank.resolution.clone(),
            questions: bank.len(),
            fingerprint: bank.fingerprint().to_string(),
            is_default: &bank.version == default,
        })
        .collect()
}

async fn get_bank(
    version: String,
    query: BankQuery,
    service: Arc<AssessmentService>,
) -> Result<warp::reply::Json, Rejection> {
    let bank = service.bank(Some(version.as_str())).map_err(reject)?;
    let child = query.child.unwrap_or_default();
    Ok(warp::reply::json(&BankView::new(&bank, &child)))
}

async fn submit_assessment(
    submission: Submission,
    service: Arc<AssessmentService>,
) -> Result<impl Reply, Rejection> {
    let outcome = service.submit(submission).await.map_err(reject)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&outcome),
        StatusCode::CREATED,
    ))
}

async fn send_report(
    request: SendReportRequest,
    service: Arc<AssessmentService>,
) -> Result<warp::reply::Json, Rejection> {
    let response = service.send_report(request).await.map_err(reject)?;
    Ok(warp::reply::json(&response))
}

async fn send_pdf_report(
    request: PdfReportRequest,
    service: Arc<AssessmentService>,
) -> Result<warp::reply::Json, Rejection> {
    let response = service.send_pdf_report(request).await.map_err(reject)?;
    Ok(warp::reply::json(&response))
}

fn reject(err: lpa_core::ServiceError) -> Rejection {
    warp::reject::custom(ApiError::from(err))
}
