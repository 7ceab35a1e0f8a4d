//! Error types for signature encoding, word decoding and chain access.

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::i18n::{self, Locale, MessageKey};

// ═══════════════════════════════════════════════════════════════════════════
// Baseline Validation
// ═══════════════════════════════════════════════════════════════════════════

/// Machine-readable validation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationCode {
    #[serde(rename = "BASELINE_MISSING_FIELDS")]
    BaselineMissingFields,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::BaselineMissingFields => "BASELINE_MISSING_FIELDS",
        }
    }
}

impl std::fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three mandatory sport-setup fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaselineField {
    Frequency,
    Duration,
    DailySteps,
}

impl BaselineField {
    pub const ALL: [BaselineField; 3] = [
        BaselineField::Frequency,
        BaselineField::Duration,
        BaselineField::DailySteps,
    ];

    /// Wire name, matching the wizard-state field.
    pub fn as_str(&self) -> &'static str {
        match self {
            BaselineField::Frequency => "frequency",
            BaselineField::Duration => "duration",
            BaselineField::DailySteps => "dailySteps",
        }
    }

    pub fn label_key(&self) -> MessageKey {
        match self {
            BaselineField::Frequency => MessageKey::FieldFrequency,
            BaselineField::Duration => MessageKey::FieldDuration,
            BaselineField::DailySteps => MessageKey::FieldDailySteps,
        }
    }
}

impl Serialize for BaselineField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Rejection returned when the activity baseline is incomplete.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{code}: {message}")]
pub struct ValidationError {
    pub code: ValidationCode,
    pub message: String,
    pub missing: Vec<BaselineField>,
}

impl ValidationError {
    pub fn baseline_missing(missing: Vec<BaselineField>) -> Self {
        let message = render_missing(Locale::En, &missing);
        Self {
            code: ValidationCode::BaselineMissingFields,
            message,
            missing,
        }
    }

    /// Same error with the message rendered in another locale.
    pub fn localized(&self, locale: Locale) -> Self {
        Self {
            code: self.code,
            message: render_missing(locale, &self.missing),
            missing: self.missing.clone(),
        }
    }
}

fn render_missing(locale: Locale, missing: &[BaselineField]) -> String {
    let fields = missing
        .iter()
        .map(|f| i18n::text(locale, f.label_key()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}{}", i18n::text(locale, MessageKey::BaselineMissingPrefix), fields)
}

// ═══════════════════════════════════════════════════════════════════════════
// Word Decoding
// ═══════════════════════════════════════════════════════════════════════════

/// A 32-byte word read back from chain state could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedWordError {
    #[error("Word {index}: expected 64 hex digits, got {length}")]
    InvalidLength { index: usize, length: usize },

    #[error("Word {index}: invalid hex '{value}'")]
    InvalidHex { index: usize, value: String },
}

impl MalformedWordError {
    /// What is wrong with the word, without its position.
    pub fn reason(&self) -> String {
        match self {
            MalformedWordError::InvalidLength { length, .. } => {
                format!("expected 64 hex digits, got {length}")
            }
            MalformedWordError::InvalidHex { value, .. } => format!("invalid hex '{value}'"),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            MalformedWordError::InvalidLength { index, .. } => *index,
            MalformedWordError::InvalidHex { index, .. } => *index,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Chain Gateway
// ═══════════════════════════════════════════════════════════════════════════

/// Errors from a [`crate::onchain::ChainGateway`] implementation.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("No matrix recorded for owner '{0}'")]
    NotFound(String),

    #[error("Relay transport error: {0}")]
    Transport(String),

    #[error("Relay returned {status}: {body}")]
    Relay { status: u16, body: String },

    #[error("Malformed on-chain data: {0}")]
    Malformed(#[from] MalformedWordError),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Transport(e.to_string())
    }
}
