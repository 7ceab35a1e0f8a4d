//! Chain gateway: the seam between the service and the token contract
//!
//! The gateway is chosen once at start-up ([`build_gateway`]) and injected
//! into the application state:
//!
//! - [`MockChainGateway`] keeps matrices and masks in memory (development, tests)
//! - [`RelayChainGateway`] forwards to an HTTP relay that owns wallet
//!   signing, transaction submission and receipt polling

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::codec::SignatureMatrix;
use super::permission::PermissionMask;
use crate::error::GatewayError;

// ═══════════════════════════════════════════════════════════════════════════
// Gateway Trait
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayMode {
    #[default]
    Mock,
    Relay,
}

impl GatewayMode {
    /// Parse `mock` / `relay` (case-insensitive). Anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mock" => Some(GatewayMode::Mock),
            "relay" => Some(GatewayMode::Relay),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayMode::Mock => "mock",
            GatewayMode::Relay => "relay",
        }
    }
}

/// Result of committing a matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReceipt {
    pub owner: String,
    pub receipt_id: String,
    pub words: SignatureMatrix,
    pub committed_at: DateTime<Utc>,
}

/// Read/write access to the on-chain matrix and permission state.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    fn mode(&self) -> GatewayMode;

    /// Matrix stored for `owner`, or `None` if nothing has been committed.
    async fn read_matrix(&self, owner: &str) -> Result<Option<SignatureMatrix>, GatewayError>;

    async fn write_matrix(
        &self,
        owner: &str,
        matrix: &SignatureMatrix,
    ) -> Result<CommitReceipt, GatewayError>;

    /// Permission mask for `owner`; zero when nothing is granted.
    async fn read_permission_mask(&self, owner: &str) -> Result<PermissionMask, GatewayError>;
}

// ═══════════════════════════════════════════════════════════════════════════
// Mock Gateway
// ═══════════════════════════════════════════════════════════════════════════

/// In-memory gateway.
pub struct MockChainGateway {
    matrices: Arc<RwLock<HashMap<String, SignatureMatrix>>>,
    masks: Arc<RwLock<HashMap<String, PermissionMask>>>,
}

impl MockChainGateway {
    pub fn new() -> Self {
        Self {
            matrices: Arc::new(RwLock::new(HashMap::new())),
            masks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed the permission mask returned for `owner`.
    pub async fn set_permission_mask(&self, owner: &str, mask: PermissionMask) {
        self.masks
            .write()
            .await
            .insert(owner.to_ascii_lowercase(), mask);
    }
}

impl Default for MockChainGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainGateway for MockChainGateway {
    fn mode(&self) -> GatewayMode {
        GatewayMode::Mock
    }

    async fn read_matrix(&self, owner: &str) -> Result<Option<SignatureMatrix>, GatewayError> {
        let found = self
            .matrices
            .read()
            .await
            .get(&owner.to_ascii_lowercase())
            .copied();
        debug!(owner, found = found.is_some(), "Mock matrix read");
        Ok(found)
    }

    async fn write_matrix(
        &self,
        owner: &str,
        matrix: &SignatureMatrix,
    ) -> Result<CommitReceipt, GatewayError> {
        self.matrices
            .write()
            .await
            .insert(owner.to_ascii_lowercase(), *matrix);

        let receipt = CommitReceipt {
            owner: owner.to_string(),
            receipt_id: format!("mock-{}", uuid::Uuid::new_v4()),
            words: *matrix,
            committed_at: Utc::now(),
        };
        info!(owner, receipt_id = %receipt.receipt_id, "Mock matrix committed");
        Ok(receipt)
    }

    async fn read_permission_mask(&self, owner: &str) -> Result<PermissionMask, GatewayError> {
        Ok(self
            .masks
            .read()
            .await
            .get(&owner.to_ascii_lowercase())
            .copied()
            .unwrap_or_default())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Relay Gateway
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize, Deserialize)]
struct RelayMatrixBody {
    words: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayCommitResponse {
    receipt_id: String,
    #[serde(default)]
    committed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RelayMaskResponse {
    mask: PermissionMask,
}

/// Gateway backed by an HTTP chain relay.
///
/// - `GET  {relay}/matrix/{owner}`      → `{"words": [8 hex words]}` or 404
/// - `PUT  {relay}/matrix/{owner}`      ← `{"words": [...]}` → `{"receiptId": ...}`
/// - `GET  {relay}/permissions/{owner}` → `{"mask": "0x..."}`
pub struct RelayChainGateway {
    /// Base URL of the relay (TWIN_RELAY_URL)
    relay_url: String,
    /// Shared HTTP client
    client: reqwest::Client,
}

impl RelayChainGateway {
    pub fn new(relay_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            relay_url: relay_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str, owner: &str) -> String {
        format!("{}/{}/{}", self.relay_url, path, owner)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), %body, "Chain relay returned an error");
        Err(GatewayError::Relay {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ChainGateway for RelayChainGateway {
    fn mode(&self) -> GatewayMode {
        GatewayMode::Relay
    }

    async fn read_matrix(&self, owner: &str) -> Result<Option<SignatureMatrix>, GatewayError> {
        let response = self.client.get(self.url("matrix", owner)).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(owner, "Relay has no matrix for owner");
            return Ok(None);
        }
        let body: RelayMatrixBody = Self::check(response).await?.json().await?;
        let matrix = SignatureMatrix::from_hex_words(&body.words)?;
        Ok(Some(matrix))
    }

    async fn write_matrix(
        &self,
        owner: &str,
        matrix: &SignatureMatrix,
    ) -> Result<CommitReceipt, GatewayError> {
        info!(owner, relay = %self.relay_url, "Committing matrix via relay");

        let response = self
            .client
            .put(self.url("matrix", owner))
            .json(&RelayMatrixBody {
                words: matrix.to_hex_words(),
            })
            .send()
            .await?;
        let body: RelayCommitResponse = Self::check(response).await?.json().await?;

        Ok(CommitReceipt {
            owner: owner.to_string(),
            receipt_id: body.receipt_id,
            words: *matrix,
            committed_at: body.committed_at.unwrap_or_else(Utc::now),
        })
    }

    async fn read_permission_mask(&self, owner: &str) -> Result<PermissionMask, GatewayError> {
        let response = self
            .client
            .get(self.url("permissions", owner))
            .send()
            .await?;
        let body: RelayMaskResponse = Self::check(response).await?.json().await?;
        Ok(body.mask)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Composition Root
// ═══════════════════════════════════════════════════════════════════════════

/// Select the gateway implementation. A relay without a URL falls back to the mock.
pub fn build_gateway(
    mode: GatewayMode,
    relay_url: Option<&str>,
    client: reqwest::Client,
) -> Arc<dyn ChainGateway> {
    match (mode, relay_url) {
        (GatewayMode::Relay, Some(url)) if !url.trim().is_empty() => {
            info!(relay = url, "Using relay chain gateway");
            Arc::new(RelayChainGateway::new(url, client))
        }
        (GatewayMode::Relay, _) => {
            warn!("TWIN_GATEWAY=relay but TWIN_RELAY_URL is unset; using mock gateway");
            Arc::new(MockChainGateway::new())
        }
        (GatewayMode::Mock, _) => {
            info!("Using mock chain gateway");
            Arc::new(MockChainGateway::new())
        }
    }
}
