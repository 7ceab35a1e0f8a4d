//! On-chain matrix module
//!
//! Byte-exact conversion between a [`crate::Signature`] and the token
//! contract's 8 × 32-byte storage words, the 256-bit permission mask
//! queries, and the gateway trait through which the service reaches the
//! chain.

pub mod codec;
pub mod gateway;
pub mod permission;

pub use codec::{
    clamp_byte, clamp_each, decode_matrix_to_signature, encode_signature_to_matrix,
    OnchainWord, SignatureMatrix, MATRIX_WORDS, WORD_BYTES,
};
pub use gateway::{
    build_gateway, ChainGateway, CommitReceipt, GatewayMode, MockChainGateway,
    RelayChainGateway,
};
pub use permission::{
    permission_mask_to_binary256, permission_mask_to_granted_quadrants,
    permission_mask_to_granted_scope, GrantedScope, MaskParseError, PermissionMask, Quadrant,
};
