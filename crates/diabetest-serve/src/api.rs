//! `/predict` request handling.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use diabetest_core::{Assessment, DiabetestError, PatientRecord};

use crate::state::AppState;

// ============================================================================
// Errors
// ============================================================================

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Failure modes of the API, each rendered as `{"error": ...}`.
#[derive(Debug)]
pub enum ApiError {
    /// Body was not usable JSON.
    Rejected(StatusCode, String),
    /// JSON was fine but a measurement was missing or not a number.
    BadRecord(String),
    MethodNotAllowed,
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected(status, _) => *status,
            ApiError::BadRecord(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Rejected(_, msg) | ApiError::BadRecord(msg) | ApiError::Internal(msg) => {
                msg.clone()
            }
            ApiError::MethodNotAllowed => "Invalid request method".to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<DiabetestError> for ApiError {
    fn from(e: DiabetestError) -> Self {
        match e {
            DiabetestError::NotAnObject(_)
            | DiabetestError::MissingField(_)
            | DiabetestError::NonNumeric { .. } => ApiError::BadRecord(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody { error: self.message() };
        if status.is_server_error() {
            tracing::error!("{}", body.error);
        } else {
            tracing::warn!("Rejected request ({}): {}", status.as_u16(), body.error);
        }
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Assessment>, ApiError> {
    let Json(body) = body?;
    let record = PatientRecord::from_json(&body)?;
    let assessment = state.predictor.predict(&record)?;
    Ok(Json(assessment))
}

/// Any non-POST method on `/predict`.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    use diabetest_core::model::{LogisticClassifier, Model};
    use diabetest_core::{Predictor, RiskPolicy, StandardScaler, Variant, NUM_FEATURES};

    use super::*;
    use crate::server::build_router;

    /// Logistic model driven only by glucose, centered at 120 with unit
    /// scale 10, so `p = sigmoid((glucose - 120) / 10)`. DPF has a zero
    /// coefficient and a scale below 1, so a huge DPF scales to infinity
    /// and `0 * inf` poisons the decision value with NaN.
    fn state(policy: RiskPolicy) -> AppState {
        let mut mean = vec![0.0; NUM_FEATURES];
        let mut scale = vec![1.0; NUM_FEATURES];
        mean[1] = 120.0;
        scale[1] = 10.0;
        scale[6] = 0.5;
        let mut coef = vec![0.0; NUM_FEATURES];
        coef[1] = 1.0;
        let predictor = Predictor::new(
            StandardScaler::new(mean, scale),
            Model::LogisticRegression(LogisticClassifier::new(coef, 0.0)),
            policy,
        )
        .unwrap();
        AppState::new(predictor, "test.json".into(), Variant::Forest)
    }

    fn patient(glucose: Value) -> Value {
        json!({
            "Age": 45, "Pregnancies": 1, "Glucose": glucose, "BloodPressure": 70,
            "Insulin": 80, "BMI": 28.1, "SkinThickness": 22, "DPF": 0.35,
            "HrsSleep": 7, "Cholesterol": 195
        })
    }

    async fn send(state: AppState, method: Method, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri("/predict");
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = build_router(state).oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    #[tokio::test]
    async fn test_high_risk_response() {
        let (status, body) = send(state(RiskPolicy::Tiered), Method::POST, Some(patient(json!(140)))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["risk_level"], "high");
        assert_eq!(body["prediction"], "You have high chances of Diabetes!");
        // sigmoid(2) = 0.880797
        assert_eq!(body["probability"], "88.08%");
    }

    #[tokio::test]
    async fn test_tiered_low_omits_probability() {
        let (status, body) = send(state(RiskPolicy::Tiered), Method::POST, Some(patient(json!(90)))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["risk_level"], "low");
        assert!(body.get("probability").is_none());
    }

    #[tokio::test]
    async fn test_moderate_and_borderline() {
        // sigmoid(-0.5) = 0.3775 -> moderate
        let (_, body) = send(state(RiskPolicy::Tiered), Method::POST, Some(patient(json!(115)))).await;
        assert_eq!(body["risk_level"], "moderate");
        assert_eq!(body["probability"], "37.75%");

        // sigmoid(-0.08) = 0.48001 -> 48.0 -> borderline
        let (_, body) = send(state(RiskPolicy::Tiered), Method::POST, Some(patient(json!(119.2)))).await;
        assert_eq!(body["risk_level"], "borderline");
        assert_eq!(body["prediction"], "Borderline risk of Diabetes");
    }

    #[tokio::test]
    async fn test_binary_policy_shows_low_probability() {
        let (_, body) = send(state(RiskPolicy::Binary), Method::POST, Some(patient(json!(90)))).await;
        assert_eq!(body["risk_level"], "low");
        assert!(body["probability"].as_str().unwrap().ends_with('%'));
    }

    #[tokio::test]
    async fn test_numeric_strings_from_form_input() {
        let mut p = patient(json!("140"));
        p["BMI"] = json!("28.1");
        let (status, body) = send(state(RiskPolicy::Tiered), Method::POST, Some(p)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["risk_level"], "high");
    }

    #[tokio::test]
    async fn test_get_is_method_not_allowed() {
        let (status, body) = send(state(RiskPolicy::Tiered), Method::GET, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({ "error": "Invalid request method" }));
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let mut p = patient(json!(140));
        p.as_object_mut().unwrap().remove("HrsSleep");
        let (status, body) = send(state(RiskPolicy::Tiered), Method::POST, Some(p)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("HrsSleep"));
    }

    #[tokio::test]
    async fn test_non_numeric_is_bad_request() {
        let (status, body) = send(state(RiskPolicy::Tiered), Method::POST, Some(patient(json!("high")))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Glucose"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ nope"))
            .unwrap();
        let resp = build_router(state(RiskPolicy::Tiered)).oneshot(req).await.unwrap();
        assert!(resp.status().is_client_error());
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_missing_content_type_is_unsupported_media_type() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/predict")
            .body(Body::from(patient(json!(140)).to_string()))
            .unwrap();
        let resp = build_router(state(RiskPolicy::Tiered)).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().unwrap().contains("Content-Type"));
    }

    #[tokio::test]
    async fn test_non_finite_probability_is_internal_error() {
        let mut p = patient(json!(140));
        p["DPF"] = json!(1.7e308);
        let (status, body) = send(state(RiskPolicy::Tiered), Method::POST, Some(p)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("invalid probability"));
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = build_router(state(RiskPolicy::Tiered)).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["kind"], "logistic_regression");
        assert_eq!(body["variant"], "forest");
    }

    #[tokio::test]
    async fn test_cors_headers_present() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/predict")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(patient(json!(100)).to_string()))
            .unwrap();
        let resp = build_router(state(RiskPolicy::Tiered)).oneshot(req).await.unwrap();
        assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
