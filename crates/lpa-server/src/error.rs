//! HTTP error replies
//!
//! Every failure leaves the API as `{ "error": message }`:
//! 400 for validation, 404 for unknown banks, 502 when the mail provider
//! fails, 500 otherwise.

use lpa_core::{FormErrors, ServiceError};
use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

/// JSON error body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
    /// Per-field messages for form errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FormErrors>,
}

/// A failed request, ready to be rendered
#[derive(Debug)]
pub struct ApiError {
    /// Reply status
    pub status: StatusCode,
    /// Reply body
    pub body: ErrorBody,
}

impl ApiError {
    /// Error with a plain message
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
                fields: None,
            },
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = if err.is_not_found() {
            StatusCode::NOT_FOUND
        } else if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if matches!(err, ServiceError::Delivery(_)) {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "request failed: {}", err);
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected: {}", err);
        }

        let fields = match &err {
            ServiceError::Form(fields) => Some(fields.clone()),
            _ => None,
        };
        Self {
            status,
            body: ErrorBody {
                error: err.to_string(),
                fields,
            },
        }
    }
}

impl warp::reject::Reject for ApiError {}

impl Reply for ApiError {
    fn into_response(self) -> Response {
        warp::reply::with_status(warp::reply::json(&self.body), self.status).into_response()
    }
}

/// Turn any rejection into a JSON error reply
///
/// # Errors
/// Never fails; the `Result` is what `recover` expects
pub async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    let error = if let Some(api) = rejection.find::<ApiError>() {
        ApiError {
            status: api.status,
            body: api.body.clone(),
        }
    } else if rejection.is_not_found() {
        ApiError::new(StatusCode::NOT_FOUND, "not found")
    } else if let Some(e) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        ApiError::new(StatusCode::BAD_REQUEST, format!("invalid request body: {e}"))
    } else if let Some(e) = rejection.find::<warp::reject::InvalidQuery>() {
        ApiError::new(StatusCode::BAD_REQUEST, e.to_string())
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
    } else if let Some(e) = rejection.find::<warp::cors::CorsForbidden>() {
        ApiError::new(StatusCode::FORBIDDEN, e.to_string())
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
    } else {
        tracing::error!("unhandled rejection: {:?}", rejection);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    };
    Ok(error.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpa_bank::BankError;
    use lpa_core::DeliveryError;

    #[test]
    fn status_mapping() {
        let cases = [
            (ServiceError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                ServiceError::Bank(BankError::UnknownVersion("v9".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::Delivery(DeliveryError::Transport("timeout".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (ServiceError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn form_errors_carry_fields() {
        let fields = FormErrors {
            child_name: Some("Child's name is required".into()),
            ..FormErrors::default()
        };
        let api = ApiError::from(ServiceError::Form(fields));
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(api.body.fields.is_some());
    }
}
