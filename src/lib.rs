//! Twin Matrix - Library
//!
//! Deterministic identity signatures for the Twin Matrix wizard:
//!
//! - [`registry`] - which of the 256 dimensions exist and what fills them
//! - [`encoder`] - wizard state → 256-byte signature, plus density
//! - [`onchain`] - signature ↔ 8 × 32-byte contract words, permission masks,
//!   and the chain gateway seam
//!
//! The HTTP service in `main.rs` wraps these; the modules are re-exported
//! for integration testing and external use.

pub mod config;
pub mod encoder;
pub mod error;
pub mod handlers;
pub mod i18n;
pub mod onchain;
pub mod registry;
pub mod types;

pub use encoder::{compute_density, encode, validate_baseline};
pub use error::{BaselineField, GatewayError, MalformedWordError, ValidationCode, ValidationError};
pub use types::{Signature, WizardState};

/// Number of dimensions in a signature.
pub const SIGNATURE_DIMS: usize = 256;
