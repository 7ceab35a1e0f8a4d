//! Word codec: packs a signature into the contract's 8 × 32-byte layout
//!
//! Word `i` holds signature bytes `32*i ..= 32*i + 31` in order. Words
//! travel as `0x`-prefixed, 64-digit lowercase hex strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::error::MalformedWordError;
use crate::types::Signature;
use crate::SIGNATURE_DIMS;

/// Bytes per on-chain word.
pub const WORD_BYTES: usize = 32;

/// Words per signature matrix.
pub const MATRIX_WORDS: usize = SIGNATURE_DIMS / WORD_BYTES;

/// Hex digits per word, without prefix.
pub const WORD_HEX_DIGITS: usize = WORD_BYTES * 2;

// ═══════════════════════════════════════════════════════════════════════════
// Byte Clamping
// ═══════════════════════════════════════════════════════════════════════════

/// Clamp an arbitrary number into a byte.
///
/// Non-finite and negative values become 0, values above 255 become 255,
/// everything else rounds half-up.
#[inline]
pub fn clamp_byte(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    (value + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Element-wise [`clamp_byte`], padded with zeros or truncated to 256.
pub fn clamp_each(values: &[f64]) -> Signature {
    let mut dims = [0u8; SIGNATURE_DIMS];
    for (d, v) in dims.iter_mut().zip(values.iter()) {
        *d = clamp_byte(*v);
    }
    Signature::from_array(dims)
}

// ═══════════════════════════════════════════════════════════════════════════
// OnchainWord
// ═══════════════════════════════════════════════════════════════════════════

/// One 32-byte storage word.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OnchainWord([u8; WORD_BYTES]);

impl OnchainWord {
    #[inline]
    pub fn from_bytes(bytes: [u8; WORD_BYTES]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; WORD_BYTES] {
        &self.0
    }

    /// `0x` followed by 64 lowercase hex digits.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Strict parse; `index` is reported back in the error.
    pub fn from_hex(index: usize, word: &str) -> Result<Self, MalformedWordError> {
        let digits = word
            .strip_prefix("0x")
            .or_else(|| word.strip_prefix("0X"))
            .unwrap_or(word);

        if digits.len() != WORD_HEX_DIGITS {
            return Err(MalformedWordError::InvalidLength {
                index,
                length: digits.len(),
            });
        }

        let mut bytes = [0u8; WORD_BYTES];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| MalformedWordError::InvalidHex {
            index,
            value: word.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Debug for OnchainWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OnchainWord({})", self.to_hex())
    }
}

impl std::fmt::Display for OnchainWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for OnchainWord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for OnchainWord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let word = String::deserialize(deserializer)?;
        Self::from_hex(0, &word)
            .map_err(|e| serde::de::Error::custom(format!("onchain word: {}", e.reason())))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SignatureMatrix
// ═══════════════════════════════════════════════════════════════════════════

/// The exact wire value exchanged with the contract: 8 words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SignatureMatrix {
    words: [OnchainWord; MATRIX_WORDS],
}

impl SignatureMatrix {
    pub fn from_signature(signature: &Signature) -> Self {
        let bytes = signature.as_bytes();
        let mut words = [OnchainWord::default(); MATRIX_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            let mut chunk = [0u8; WORD_BYTES];
            chunk.copy_from_slice(&bytes[i * WORD_BYTES..(i + 1) * WORD_BYTES]);
            *word = OnchainWord(chunk);
        }
        Self { words }
    }

    pub fn to_signature(&self) -> Signature {
        let mut dims = [0u8; SIGNATURE_DIMS];
        for (i, word) in self.words.iter().enumerate() {
            dims[i * WORD_BYTES..(i + 1) * WORD_BYTES].copy_from_slice(&word.0);
        }
        Signature::from_array(dims)
    }

    #[inline]
    pub fn words(&self) -> &[OnchainWord; MATRIX_WORDS] {
        &self.words
    }

    pub fn to_hex_words(&self) -> Vec<String> {
        self.words.iter().map(OnchainWord::to_hex).collect()
    }

    /// Parse words read back from chain. Missing words are zero and
    /// anything past the eighth word is ignored.
    pub fn from_hex_words<S: AsRef<str>>(words: &[S]) -> Result<Self, MalformedWordError> {
        let mut parsed = [OnchainWord::default(); MATRIX_WORDS];
        for (index, (slot, word)) in parsed.iter_mut().zip(words.iter()).enumerate() {
            *slot = OnchainWord::from_hex(index, word.as_ref()).inspect_err(|e| {
                warn!(word = index, error = %e, "Rejecting malformed on-chain word");
            })?;
        }
        Ok(Self { words: parsed })
    }
}

impl Serialize for SignatureMatrix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.words.iter())
    }
}

impl<'de> Deserialize<'de> for SignatureMatrix {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let words = Vec::<String>::deserialize(deserializer)?;
        Self::from_hex_words(&words).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Codec Entry Points
// ═══════════════════════════════════════════════════════════════════════════

/// Pack up to 256 values into 8 words. Never fails: every value is clamped
/// and short input is zero-padded.
pub fn encode_signature_to_matrix(values: &[f64]) -> SignatureMatrix {
    SignatureMatrix::from_signature(&clamp_each(values))
}

/// Inverse of [`encode_signature_to_matrix`] for hex words read from chain.
pub fn decode_matrix_to_signature<S: AsRef<str>>(
    words: &[S],
) -> Result<Signature, MalformedWordError> {
    SignatureMatrix::from_hex_words(words).map(|m| m.to_signature())
}
