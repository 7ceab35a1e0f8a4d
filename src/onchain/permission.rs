//! 256-bit permission masks.
//!
//! A mask grants access to quadrants of the matrix. Bit `i` is
//! `(mask >> i) & 1`; a quadrant is granted when any bit in its 64-bit
//! range is set.
//!
//! | Quadrant  | Bits      |
//! |-----------|-----------|
//! | Physical  | 0 ..= 63  |
//! | Digital   | 64 ..= 127 |
//! | Social    | 128 ..= 191 |
//! | Spiritual | 192 ..= 255 |

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

use crate::i18n::{self, Locale, MessageKey};

pub const MASK_BITS: usize = 256;
const LIMBS: usize = MASK_BITS / 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaskParseError {
    #[error("Permission mask is empty")]
    Empty,

    #[error("Invalid digit in permission mask: '{0}'")]
    InvalidDigit(String),

    #[error("Permission mask exceeds 256 bits")]
    Overflow,
}

// ═══════════════════════════════════════════════════════════════════════════
// Quadrants
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    Physical,
    Digital,
    Social,
    Spiritual,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::Physical,
        Quadrant::Digital,
        Quadrant::Social,
        Quadrant::Spiritual,
    ];

    /// Inclusive bit range covered by this quadrant.
    pub fn bit_range(&self) -> (usize, usize) {
        let start = self.limb() * 64;
        (start, start + 63)
    }

    fn limb(&self) -> usize {
        match self {
            Quadrant::Physical => 0,
            Quadrant::Digital => 1,
            Quadrant::Social => 2,
            Quadrant::Spiritual => 3,
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        let key = match self {
            Quadrant::Physical => MessageKey::QuadrantPhysical,
            Quadrant::Digital => MessageKey::QuadrantDigital,
            Quadrant::Social => MessageKey::QuadrantSocial,
            Quadrant::Spiritual => MessageKey::QuadrantSpiritual,
        };
        i18n::text(locale, key)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PermissionMask
// ═══════════════════════════════════════════════════════════════════════════

/// Unsigned 256-bit mask; limb 0 holds bits 0..=63.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PermissionMask([u64; LIMBS]);

impl PermissionMask {
    pub fn zero() -> Self {
        Self([0; LIMBS])
    }

    pub fn from_limbs(limbs: [u64; LIMBS]) -> Self {
        Self(limbs)
    }

    /// Mask with every bit of the given quadrants set.
    pub fn from_quadrants(quadrants: &[Quadrant]) -> Self {
        let mut mask = Self::zero();
        for q in quadrants {
            mask.0[q.limb()] = u64::MAX;
        }
        mask
    }

    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        if index >= MASK_BITS {
            return false;
        }
        (self.0[index / 64] >> (index % 64)) & 1 == 1
    }

    #[inline]
    pub fn set_bit(&mut self, index: usize, value: bool) {
        if index >= MASK_BITS {
            return;
        }
        if value {
            self.0[index / 64] |= 1u64 << (index % 64);
        } else {
            self.0[index / 64] &= !(1u64 << (index % 64));
        }
    }

    pub fn count_ones(&self) -> u32 {
        self.0.iter().map(|l| l.count_ones()).sum()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|l| *l == 0)
    }

    pub fn grants(&self, quadrant: Quadrant) -> bool {
        self.0[quadrant.limb()] != 0
    }

    /// `0x` followed by 64 hex digits, most significant first.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(2 + MASK_BITS / 4);
        out.push_str("0x");
        for limb in self.0.iter().rev() {
            out.push_str(&format!("{:016x}", limb));
        }
        out
    }

    fn from_hex_digits(digits: &str) -> Result<Self, MaskParseError> {
        let digits = digits.trim_start_matches('0');
        if digits.len() > MASK_BITS / 4 {
            return Err(MaskParseError::Overflow);
        }
        let mut mask = Self::zero();
        for (pos, c) in digits.chars().rev().enumerate() {
            let nibble = c
                .to_digit(16)
                .ok_or_else(|| MaskParseError::InvalidDigit(c.to_string()))? as u64;
            let bit = pos * 4;
            mask.0[bit / 64] |= nibble << (bit % 64);
        }
        Ok(mask)
    }

    fn from_decimal_digits(digits: &str) -> Result<Self, MaskParseError> {
        let mut limbs = [0u64; LIMBS];
        for c in digits.chars() {
            let digit = c
                .to_digit(10)
                .ok_or_else(|| MaskParseError::InvalidDigit(c.to_string()))? as u128;
            // limbs = limbs * 10 + digit
            let mut carry = digit;
            for limb in limbs.iter_mut() {
                let wide = (*limb as u128) * 10 + carry;
                *limb = wide as u64;
                carry = wide >> 64;
            }
            if carry != 0 {
                return Err(MaskParseError::Overflow);
            }
        }
        Ok(Self(limbs))
    }
}

impl FromStr for PermissionMask {
    type Err = MaskParseError;

    /// Accepts `0x`-prefixed hex or a plain decimal integer, as returned by
    /// JSON-RPC clients for `uint256`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            if hex.is_empty() {
                return Err(MaskParseError::Empty);
            }
            Self::from_hex_digits(hex)
        } else if s.is_empty() {
            Err(MaskParseError::Empty)
        } else {
            Self::from_decimal_digits(s)
        }
    }
}

impl Serialize for PermissionMask {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PermissionMask {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Queries
// ═══════════════════════════════════════════════════════════════════════════

/// A granted quadrant and how many of its bits are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantedScope {
    pub quadrant: Quadrant,
    pub start_bit: usize,
    pub end_bit: usize,
    pub granted_bits: u32,
}

/// 256-character `0`/`1` string, bit 255 first.
pub fn permission_mask_to_binary256(mask: &PermissionMask) -> String {
    (0..MASK_BITS)
        .rev()
        .map(|i| if mask.bit(i) { '1' } else { '0' })
        .collect()
}

/// Granted quadrants with their bit ranges, in quadrant order.
pub fn permission_mask_to_granted_scope(mask: &PermissionMask) -> Vec<GrantedScope> {
    Quadrant::ALL
        .iter()
        .filter(|q| mask.grants(**q))
        .map(|q| {
            let (start_bit, end_bit) = q.bit_range();
            GrantedScope {
                quadrant: *q,
                start_bit,
                end_bit,
                granted_bits: mask.0[q.limb()].count_ones(),
            }
        })
        .collect()
}

pub fn permission_mask_to_granted_quadrants(mask: &PermissionMask) -> Vec<Quadrant> {
    Quadrant::ALL
        .into_iter()
        .filter(|q| mask.grants(*q))
        .collect()
}
