//! HTTP request handlers
//!
//! - POST /api/signature             (generate step: encode + preview)
//! - POST /api/matrix/decode         (words → signature)
//! - PUT  /api/matrix/:owner         (commit step: encode + pack + write)
//! - GET  /api/matrix/:owner         (read back + decode)
//! - GET  /api/permissions/:owner    (mask → binary / scope / quadrants)
//! - GET  /healthz

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::config::AppState;
use crate::encoder::{compute_density, encode};
use crate::error::{GatewayError, ValidationError};
use crate::i18n::{self, Locale, MessageKey};
use crate::onchain::{
    decode_matrix_to_signature, permission_mask_to_binary256, permission_mask_to_granted_quadrants,
    permission_mask_to_granted_scope, GrantedScope, Quadrant, SignatureMatrix,
};
use crate::types::{Signature, WizardState};

// ═══════════════════════════════════════════════════════════════════════════
// Router
// ═══════════════════════════════════════════════════════════════════════════

/// Build the API router (without outer middleware layers).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/signature", post(generate_handler))
        .route("/api/matrix/decode", post(decode_handler))
        .route("/api/matrix/:owner", get(read_matrix_handler).put(commit_handler))
        .route("/api/permissions/:owner", get(permissions_handler))
        .route("/healthz", get(health_handler))
        .with_state(state)
}

// ═══════════════════════════════════════════════════════════════════════════
// Request / Response Types
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize, Default)]
pub struct LocaleQuery {
    #[serde(default)]
    pub locale: Option<String>,
}

impl LocaleQuery {
    fn resolve(&self, fallback: Locale) -> Locale {
        self.locale
            .as_deref()
            .map(Locale::from_tag)
            .unwrap_or(fallback)
    }
}

/// Discriminated encode result: exactly one of `signature` / `error` is set.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub signature: Option<Signature>,
    pub density: Option<u32>,
    pub words: Option<SignatureMatrix>,
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    fn from_validation(err: &ValidationError) -> Self {
        Self {
            code: err.code.as_str().to_string(),
            message: err.message.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DecodeRequest {
    pub words: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecodeResponse {
    pub signature: Signature,
    pub density: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PermissionsResponse {
    pub owner: String,
    pub binary: String,
    pub scope: Vec<GrantedScope>,
    pub quadrants: Vec<Quadrant>,
}

fn generate(state: &WizardState, locale: Locale) -> (StatusCode, GenerateResponse) {
    match encode(state) {
        Ok(signature) => {
            let density = compute_density(signature.as_bytes());
            let words = SignatureMatrix::from_signature(&signature);
            (
                StatusCode::OK,
                GenerateResponse {
                    signature: Some(signature),
                    density: Some(density),
                    words: Some(words),
                    error: None,
                },
            )
        }
        Err(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            GenerateResponse {
                signature: None,
                density: None,
                words: None,
                error: Some(ErrorBody::from_validation(&err.localized(locale))),
            },
        ),
    }
}

fn gateway_failure(err: GatewayError, locale: Locale) -> (StatusCode, Json<serde_json::Value>) {
    match err {
        GatewayError::NotFound(owner) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": i18n::text(locale, MessageKey::MatrixNotFound),
                "owner": owner
            })),
        ),
        GatewayError::Malformed(e) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({
                "error": i18n::text(locale, MessageKey::MalformedWord),
                "detail": e.to_string()
            })),
        ),
        other => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": other.to_string() })),
        ),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Signature Generation
// ═══════════════════════════════════════════════════════════════════════════

/// POST /api/signature
///
/// Encode the wizard state for preview. Nothing is written.
pub async fn generate_handler(
    State(state): State<AppState>,
    Query(query): Query<LocaleQuery>,
    Json(body): Json<WizardState>,
) -> impl IntoResponse {
    let locale = query.resolve(state.config.locale);
    let (status, response) = generate(&body, locale);
    (status, Json(response))
}

// ═══════════════════════════════════════════════════════════════════════════
// Matrix Decode / Read / Commit
// ═══════════════════════════════════════════════════════════════════════════

/// POST /api/matrix/decode
pub async fn decode_handler(
    State(state): State<AppState>,
    Query(query): Query<LocaleQuery>,
    Json(body): Json<DecodeRequest>,
) -> impl IntoResponse {
    let locale = query.resolve(state.config.locale);
    match decode_matrix_to_signature(&body.words) {
        Ok(signature) => {
            let density = compute_density(signature.as_bytes());
            (
                StatusCode::OK,
                Json(json!(DecodeResponse { signature, density })),
            )
        }
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": i18n::text(locale, MessageKey::MalformedWord),
                "detail": e.to_string(),
                "word": e.index()
            })),
        ),
    }
}

/// GET /api/matrix/:owner
pub async fn read_matrix_handler(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Query(query): Query<LocaleQuery>,
) -> impl IntoResponse {
    let locale = query.resolve(state.config.locale);
    let matrix = match state.gateway.read_matrix(&owner).await {
        Ok(Some(matrix)) => matrix,
        Ok(None) => return gateway_failure(GatewayError::NotFound(owner), locale),
        Err(e) => {
            warn!(owner = %owner, error = %e, "Matrix read failed");
            return gateway_failure(e, locale);
        }
    };

    let signature = matrix.to_signature();
    let density = compute_density(signature.as_bytes());
    (
        StatusCode::OK,
        Json(json!({
            "owner": owner,
            "words": matrix,
            "signature": signature,
            "density": density
        })),
    )
}

/// PUT /api/matrix/:owner
///
/// Encode, pack and commit. A failed baseline check never reaches the gateway.
pub async fn commit_handler(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Query(query): Query<LocaleQuery>,
    Json(body): Json<WizardState>,
) -> impl IntoResponse {
    let locale = query.resolve(state.config.locale);
    let signature = match encode(&body) {
        Ok(signature) => signature,
        Err(err) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": ErrorBody::from_validation(&err.localized(locale)) })),
            );
        }
    };

    let matrix = SignatureMatrix::from_signature(&signature);
    match state.gateway.write_matrix(&owner, &matrix).await {
        Ok(receipt) => {
            info!(owner = %owner, receipt_id = %receipt.receipt_id, "Matrix committed");
            (StatusCode::OK, Json(json!(receipt)))
        }
        Err(e) => {
            warn!(owner = %owner, error = %e, "Matrix commit failed");
            gateway_failure(e, locale)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Permissions
// ═══════════════════════════════════════════════════════════════════════════

/// GET /api/permissions/:owner
pub async fn permissions_handler(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Query(query): Query<LocaleQuery>,
) -> impl IntoResponse {
    let locale = query.resolve(state.config.locale);
    match state.gateway.read_permission_mask(&owner).await {
        Ok(mask) => (
            StatusCode::OK,
            Json(json!(PermissionsResponse {
                binary: permission_mask_to_binary256(&mask),
                scope: permission_mask_to_granted_scope(&mask),
                quadrants: permission_mask_to_granted_quadrants(&mask),
                owner,
            })),
        ),
        Err(e) => gateway_failure(e, locale),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Health Check
// ═══════════════════════════════════════════════════════════════════════════

/// GET /healthz
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "gateway": state.gateway.mode().as_str() })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SportSetup;

    #[test]
    fn test_generate_discriminated_result() {
        let (status, response) = generate(&WizardState::default(), Locale::En);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.signature.is_none());
        assert_eq!(response.error.unwrap().code, "BASELINE_MISSING_FIELDS");

        let state = WizardState {
            sport_setup: SportSetup {
                frequency: "Rarely".into(),
                duration: "<30 min".into(),
                daily_steps: "<3,000".into(),
            },
            ..Default::default()
        };
        let (status, response) = generate(&state, Locale::En);
        assert_eq!(status, StatusCode::OK);
        assert!(response.error.is_none());
        assert!(response.signature.is_some());
        assert_eq!(response.words.unwrap().to_signature(), response.signature.unwrap());
    }

    #[test]
    fn test_permissions_response_round_trip() {
        use crate::onchain::PermissionMask;

        let mask = PermissionMask::from_quadrants(&[Quadrant::Digital, Quadrant::Spiritual]);
        let response = PermissionsResponse {
            owner: "0xabc".into(),
            binary: permission_mask_to_binary256(&mask),
            scope: permission_mask_to_granted_scope(&mask),
            quadrants: permission_mask_to_granted_quadrants(&mask),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["scope"][1]["startBit"], 192);

        let back: PermissionsResponse = serde_json::from_value(value).unwrap();
        assert_eq!(back.scope, response.scope);
        assert_eq!(back.quadrants, vec![Quadrant::Digital, Quadrant::Spiritual]);
    }

    #[test]
    fn test_locale_query_resolution() {
        let query = LocaleQuery {
            locale: Some("zh-TW".into()),
        };
        assert_eq!(query.resolve(Locale::En), Locale::ZhTw);
        assert_eq!(LocaleQuery::default().resolve(Locale::ZhTw), Locale::ZhTw);
    }
}
