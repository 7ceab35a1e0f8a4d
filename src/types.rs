//! Data types matching the identity wizard's state object
//!
//! Field names serialize in camelCase so the JSON produced by the wizard
//! UI deserializes directly into [`WizardState`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::SIGNATURE_DIMS;

// ═══════════════════════════════════════════════════════════════════════════
// Wizard State
// ═══════════════════════════════════════════════════════════════════════════

/// Complete snapshot of the user's wizard answers.
///
/// Every field defaults to empty so partially filled wizards deserialize;
/// only the three sport-setup baseline fields are checked by the encoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardState {
    pub profile: Profile,
    pub sport_setup: SportSetup,
    pub sport_twin: SportTwin,
    pub soul: SoulState,
    /// Most recently generated signature, empty before the first generate step.
    pub signature: Vec<u8>,
}

/// Demographic and social answers. Each value is one entry of a fixed
/// option list; anything else is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub age_bin: String,
    pub gender: String,
    pub height_bin: String,
    pub weight_bin: String,
    pub education: String,
    pub income: String,
    pub marital_status: String,
    pub occupation: String,
    pub living_type: String,
}

/// Activity baseline. All three fields are mandatory before encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SportSetup {
    pub frequency: String,
    pub duration: String,
    pub daily_steps: String,
}

/// Sport, outfit and brand preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SportTwin {
    /// Ordered by priority, first entry is the favourite.
    pub sport_ranking: Vec<String>,
    pub outfit_style: Vec<String>,
    pub brands: Vec<String>,
}

/// The four bipolar "soul" sliders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoulState {
    pub bars: Vec<SoulBar>,
}

/// One slider. `None` means the user never touched it, which is not the
/// same thing as sitting at the midpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoulBar {
    pub id: String,
    #[serde(default)]
    pub value: Option<i32>,
}

impl SoulBar {
    pub fn new(id: impl Into<String>, value: Option<i32>) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }
}

impl SoulState {
    /// Value of the bar with the given id, if the bar exists and was touched.
    pub fn value_of(&self, id: &str) -> Option<i32> {
        self.bars
            .iter()
            .find(|bar| bar.id == id)
            .and_then(|bar| bar.value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Signature
// ═══════════════════════════════════════════════════════════════════════════

/// The 256-dimension identity vector, one byte per dimension.
///
/// Serializes as a plain JSON array of 256 integers.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_DIMS]);

impl Signature {
    /// All-zero signature.
    #[inline]
    pub fn zeros() -> Self {
        Self([0u8; SIGNATURE_DIMS])
    }

    #[inline]
    pub fn from_array(values: [u8; SIGNATURE_DIMS]) -> Self {
        Self(values)
    }

    /// Build from a slice, padding with zeros or truncating to 256 entries.
    pub fn from_slice_padded(values: &[u8]) -> Self {
        let mut dims = [0u8; SIGNATURE_DIMS];
        let n = values.len().min(SIGNATURE_DIMS);
        dims[..n].copy_from_slice(&values[..n]);
        Self(dims)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_DIMS] {
        &self.0
    }

    #[inline]
    pub fn get(&self, dim: usize) -> u8 {
        self.0.get(dim).copied().unwrap_or(0)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Indices holding a non-zero value, ascending.
    pub fn non_zero_dims(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Sum over an inclusive dimension range.
    pub fn range_sum(&self, start: usize, end: usize) -> u32 {
        if start > end || start >= SIGNATURE_DIMS {
            return 0;
        }
        let end = end.min(SIGNATURE_DIMS - 1);
        self.0[start..=end].iter().map(|v| *v as u32).sum()
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::zeros()
    }
}

impl std::ops::Index<usize> for Signature {
    type Output = u8;

    fn index(&self, dim: usize) -> &u8 {
        &self.0[dim]
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Signature(non_zero={}, sum={})",
            self.non_zero_dims().len(),
            self.range_sum(0, SIGNATURE_DIMS - 1)
        )
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<u8>::deserialize(deserializer)?;
        let dims: [u8; SIGNATURE_DIMS] = values.as_slice().try_into().map_err(|_| {
            serde::de::Error::custom(format!(
                "signature must have {} entries, got {}",
                SIGNATURE_DIMS,
                values.len()
            ))
        })?;
        Ok(Self(dims))
    }
}
