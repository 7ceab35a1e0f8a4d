//! Dimension spec registry.
//!
//! Static declaration of which of the 256 signature positions are writable,
//! which wizard field feeds each one, and which contiguous slices are
//! L1-renormalized after writing.
//!
//! Layout:
//!
//! ```text
//!   0 ..  63   physical   gender, age, height, weight, sports, outfit styles
//!  64 .. 127   digital    brands (79..88, L1 slice)
//! 128 .. 191   social     education, income, marital status, occupation, living type
//! 192 .. 255   spiritual  activity baseline (192..199, L1 slice), daily steps, soul bars
//! ```
//!
//! Every categorical option carries its own offset from the field's base
//! dimension, so reordering an option list never moves a dimension.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::types::WizardState;
use crate::SIGNATURE_DIMS;

// ═══════════════════════════════════════════════════════════════════════════
// Registry Types
// ═══════════════════════════════════════════════════════════════════════════

/// Semantic layer a dimension belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Physical,
    Digital,
    Social,
    Spiritual,
}

/// Encoding family applied to a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    OneHot,
    Ordinal,
    Continuous,
    MultiHot,
    RankWeighted,
}

/// One registry entry: a writable dimension and what fills it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimSpec {
    pub dim_id: usize,
    pub label: &'static str,
    pub layer: Layer,
    /// Dotted path of the wizard-state field this dimension reads.
    pub source: &'static str,
    pub encoding: Encoding,
}

/// Normalization rule for a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NormKind {
    L1,
}

/// A contiguous, inclusive range of dimensions renormalized as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SliceNorm {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
    pub kind: NormKind,
}

impl SliceNorm {
    pub fn dims(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }

    pub fn width(&self) -> usize {
        self.end + 1 - self.start
    }
}

/// An option value paired with its offset from the owning table's base dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDim {
    pub value: &'static str,
    pub offset: usize,
}

const fn opt(value: &'static str, offset: usize) -> OptionDim {
    OptionDim { value, offset }
}

/// A fixed option list occupying consecutive dimensions from `base_dim`.
#[derive(Debug, Clone, Copy)]
pub struct OptionTable {
    pub source: &'static str,
    pub layer: Layer,
    pub encoding: Encoding,
    pub base_dim: usize,
    pub options: &'static [OptionDim],
}

impl OptionTable {
    /// Dimension for an exact (case-sensitive) option match.
    pub fn dim_of(&self, value: &str) -> Option<usize> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| self.base_dim + o.offset)
    }

    pub fn dims(&self) -> impl Iterator<Item = (usize, &'static str)> + '_ {
        self.options
            .iter()
            .map(move |o| (self.base_dim + o.offset, o.value))
    }
}

/// A single-choice wizard field and the accessor that reads it.
#[derive(Clone, Copy)]
pub struct CategoricalField {
    pub table: OptionTable,
    pub read: fn(&WizardState) -> &str,
}

/// A soul slider and its complementary (left, right) dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoulBarSpec {
    pub id: &'static str,
    pub left_label: &'static str,
    pub right_label: &'static str,
    pub left_dim: usize,
    pub right_dim: usize,
}

// ═══════════════════════════════════════════════════════════════════════════
// Option Tables
// ═══════════════════════════════════════════════════════════════════════════

pub const GENDER: OptionTable = OptionTable {
    source: "profile.gender",
    layer: Layer::Physical,
    encoding: Encoding::OneHot,
    base_dim: 2,
    options: &[opt("Female", 0), opt("Male", 1), opt("Non-binary", 2)],
};

pub const AGE: OptionTable = OptionTable {
    source: "profile.ageBin",
    layer: Layer::Physical,
    encoding: Encoding::Ordinal,
    base_dim: 5,
    options: &[
        opt("18–24", 0),
        opt("25–34", 1),
        opt("35–44", 2),
        opt("45–54", 3),
        opt("55–64", 4),
        opt("65+", 5),
    ],
};

pub const HEIGHT: OptionTable = OptionTable {
    source: "profile.heightBin",
    layer: Layer::Physical,
    encoding: Encoding::Ordinal,
    base_dim: 11,
    options: &[
        opt("<160", 0),
        opt("160–170", 1),
        opt("170–180", 2),
        opt("180–190", 3),
        opt("190+", 4),
    ],
};

pub const WEIGHT: OptionTable = OptionTable {
    source: "profile.weightBin",
    layer: Layer::Physical,
    encoding: Encoding::Ordinal,
    base_dim: 16,
    options: &[
        opt("<50", 0),
        opt("50–65", 1),
        opt("65–80", 2),
        opt("80–95", 3),
        opt("95+", 4),
    ],
};

pub const SPORTS: OptionTable = OptionTable {
    source: "sportTwin.sportRanking",
    layer: Layer::Physical,
    encoding: Encoding::RankWeighted,
    base_dim: 32,
    options: &[
        opt("Running", 0),
        opt("Cycling", 1),
        opt("Swimming", 2),
        opt("Walking", 3),
        opt("Hiking", 4),
        opt("Yoga", 5),
        opt("Pilates", 6),
        opt("Strength Training", 7),
        opt("HIIT", 8),
        opt("Basketball", 9),
        opt("Football", 10),
        opt("Tennis", 11),
        opt("Badminton", 12),
        opt("Table Tennis", 13),
        opt("Golf", 14),
        opt("Climbing", 15),
        opt("Martial Arts", 16),
        opt("Dance", 17),
    ],
};

pub const OUTFIT_STYLES: OptionTable = OptionTable {
    source: "sportTwin.outfitStyle",
    layer: Layer::Physical,
    encoding: Encoding::MultiHot,
    base_dim: 50,
    options: &[
        opt("Minimal Functional", 0),
        opt("Streetwear", 1),
        opt("Athleisure", 2),
        opt("Outdoor Technical", 3),
        opt("Classic Sportswear", 4),
        opt("Performance Pro", 5),
        opt("Retro", 6),
        opt("Luxury Sport", 7),
    ],
};

/// Brand dims sit at offsets 15..24 of the digital block; 64..78 are reserved.
pub const BRANDS: OptionTable = OptionTable {
    source: "sportTwin.brands",
    layer: Layer::Digital,
    encoding: Encoding::MultiHot,
    base_dim: 64,
    options: &[
        opt("Nike", 15),
        opt("Adidas", 16),
        opt("Under Armour", 17),
        opt("Puma", 18),
        opt("Lululemon", 19),
        opt("New Balance", 20),
        opt("ASICS", 21),
        opt("The North Face", 22),
        opt("Patagonia", 23),
        opt("On", 24),
    ],
};

pub const EDUCATION: OptionTable = OptionTable {
    source: "profile.education",
    layer: Layer::Social,
    encoding: Encoding::Ordinal,
    base_dim: 128,
    options: &[
        opt("High school or below", 0),
        opt("Bachelor's", 1),
        opt("Master's", 2),
        opt("Doctorate", 3),
        opt("Prefer not to say", 4),
    ],
};

pub const INCOME: OptionTable = OptionTable {
    source: "profile.income",
    layer: Layer::Social,
    encoding: Encoding::Ordinal,
    base_dim: 136,
    options: &[
        opt("<30k", 0),
        opt("30k–60k", 1),
        opt("60k–100k", 2),
        opt("100k–200k", 3),
        opt("200k+", 4),
        opt("Prefer not to say", 5),
    ],
};

pub const MARITAL_STATUS: OptionTable = OptionTable {
    source: "profile.maritalStatus",
    layer: Layer::Social,
    encoding: Encoding::OneHot,
    base_dim: 144,
    options: &[
        opt("Single", 0),
        opt("In a relationship", 1),
        opt("Married", 2),
        opt("Divorced / Widowed", 3),
        opt("Prefer not to say", 4),
    ],
};

pub const OCCUPATION: OptionTable = OptionTable {
    source: "profile.occupation",
    layer: Layer::Social,
    encoding: Encoding::OneHot,
    base_dim: 152,
    options: &[
        opt("Student", 0),
        opt("Engineer / Tech", 1),
        opt("Business / Finance", 2),
        opt("Healthcare", 3),
        opt("Education", 4),
        opt("Creative / Media", 5),
        opt("Public Sector", 6),
        opt("Self-employed", 7),
        opt("Retired", 8),
        opt("Other", 9),
    ],
};

pub const LIVING_TYPE: OptionTable = OptionTable {
    source: "profile.livingType",
    layer: Layer::Social,
    encoding: Encoding::OneHot,
    base_dim: 164,
    options: &[
        opt("Living alone", 0),
        opt("With partner", 1),
        opt("With family", 2),
        opt("With roommates", 3),
        opt("Other", 4),
    ],
};

pub const FREQUENCY: OptionTable = OptionTable {
    source: "sportSetup.frequency",
    layer: Layer::Spiritual,
    encoding: Encoding::Ordinal,
    base_dim: 192,
    options: &[
        opt("Rarely", 0),
        opt("1–2x / week", 1),
        opt("3–4x / week", 2),
        opt("5x+ / week", 3),
    ],
};

pub const DURATION: OptionTable = OptionTable {
    source: "sportSetup.duration",
    layer: Layer::Spiritual,
    encoding: Encoding::Ordinal,
    base_dim: 196,
    options: &[
        opt("<30 min", 0),
        opt("30–60 min", 1),
        opt("60–90 min", 2),
        opt("90+ min", 3),
    ],
};

pub const DAILY_STEPS: OptionTable = OptionTable {
    source: "sportSetup.dailySteps",
    layer: Layer::Spiritual,
    encoding: Encoding::Ordinal,
    base_dim: 200,
    options: &[
        opt("<3,000", 0),
        opt("3,000–7,000", 1),
        opt("7,000–12,000", 2),
        opt("12,000+", 3),
    ],
};

/// Single-choice fields in write order.
pub const CATEGORICAL_FIELDS: [CategoricalField; 12] = [
    CategoricalField { table: AGE, read: |s| s.profile.age_bin.as_str() },
    CategoricalField { table: GENDER, read: |s| s.profile.gender.as_str() },
    CategoricalField { table: WEIGHT, read: |s| s.profile.weight_bin.as_str() },
    CategoricalField { table: HEIGHT, read: |s| s.profile.height_bin.as_str() },
    CategoricalField { table: FREQUENCY, read: |s| s.sport_setup.frequency.as_str() },
    CategoricalField { table: DURATION, read: |s| s.sport_setup.duration.as_str() },
    CategoricalField { table: DAILY_STEPS, read: |s| s.sport_setup.daily_steps.as_str() },
    CategoricalField { table: EDUCATION, read: |s| s.profile.education.as_str() },
    CategoricalField { table: INCOME, read: |s| s.profile.income.as_str() },
    CategoricalField { table: MARITAL_STATUS, read: |s| s.profile.marital_status.as_str() },
    CategoricalField { table: LIVING_TYPE, read: |s| s.profile.living_type.as_str() },
    CategoricalField { table: OCCUPATION, read: |s| s.profile.occupation.as_str() },
];

pub const SOUL_BARS: [SoulBarSpec; 4] = [
    SoulBarSpec {
        id: "BAR_OUTCOME_EXPERIENCE",
        left_label: "Outcome",
        right_label: "Experience",
        left_dim: 206,
        right_dim: 207,
    },
    SoulBarSpec {
        id: "BAR_SOLO_SOCIAL",
        left_label: "Solo",
        right_label: "Social",
        left_dim: 208,
        right_dim: 209,
    },
    SoulBarSpec {
        id: "BAR_DISCIPLINE_FLOW",
        left_label: "Discipline",
        right_label: "Flow",
        left_dim: 210,
        right_dim: 211,
    },
    SoulBarSpec {
        id: "BAR_COMPETE_ENJOY",
        left_label: "Compete",
        right_label: "Enjoy",
        left_dim: 212,
        right_dim: 213,
    },
];

/// Maximum number of ranked sports that carry weight.
pub const MAX_SPORT_RANKING: usize = 10;

pub const ACTIVITY_SLICE: SliceNorm = SliceNorm {
    name: "activity_baseline",
    start: 192,
    end: 199,
    kind: NormKind::L1,
};

pub const BRAND_SLICE: SliceNorm = SliceNorm {
    name: "brand_preference",
    start: 79,
    end: 88,
    kind: NormKind::L1,
};

static SLICE_NORMS: [SliceNorm; 2] = [ACTIVITY_SLICE, BRAND_SLICE];

// ═══════════════════════════════════════════════════════════════════════════
// Registry Views
// ═══════════════════════════════════════════════════════════════════════════

/// Set of dimension ids present in the registry.
#[derive(Clone, PartialEq, Eq)]
pub struct WritableDims {
    mask: [bool; SIGNATURE_DIMS],
}

impl WritableDims {
    #[inline]
    pub fn contains(&self, dim: usize) -> bool {
        dim < SIGNATURE_DIMS && self.mask[dim]
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..SIGNATURE_DIMS).filter(move |d| self.mask[*d])
    }

    pub fn len(&self) -> usize {
        self.mask.iter().filter(|w| **w).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for WritableDims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WritableDims(len={})", self.len())
    }
}

fn table_specs(table: &OptionTable, out: &mut Vec<DimSpec>) {
    for (dim, value) in table.dims() {
        out.push(DimSpec {
            dim_id: dim,
            label: value,
            layer: table.layer,
            source: table.source,
            encoding: table.encoding,
        });
    }
}

/// Every declared dimension, in table order (unsorted, duplicates kept).
fn collect_specs() -> Vec<DimSpec> {
    let mut specs = Vec::new();
    for field in &CATEGORICAL_FIELDS {
        table_specs(&field.table, &mut specs);
    }
    table_specs(&SPORTS, &mut specs);
    table_specs(&OUTFIT_STYLES, &mut specs);
    table_specs(&BRANDS, &mut specs);
    for bar in &SOUL_BARS {
        for (dim, label) in [(bar.left_dim, bar.left_label), (bar.right_dim, bar.right_label)] {
            specs.push(DimSpec {
                dim_id: dim,
                label,
                layer: Layer::Spiritual,
                source: bar.id,
                encoding: Encoding::Continuous,
            });
        }
    }
    specs
}

fn build_registry() -> Vec<DimSpec> {
    let mut specs = collect_specs();
    specs.sort_by_key(|s| s.dim_id);
    specs
}

/// Ordered list of every writable dimension.
pub fn spec_registry() -> &'static [DimSpec] {
    static REGISTRY: OnceLock<Vec<DimSpec>> = OnceLock::new();
    REGISTRY.get_or_init(build_registry)
}

/// Projection of `dim_id` over [`spec_registry`].
pub fn writable_dims() -> &'static WritableDims {
    static WRITABLE: OnceLock<WritableDims> = OnceLock::new();
    WRITABLE.get_or_init(|| {
        let mut mask = [false; SIGNATURE_DIMS];
        for spec in spec_registry() {
            if spec.dim_id < SIGNATURE_DIMS {
                mask[spec.dim_id] = true;
            }
        }
        WritableDims { mask }
    })
}

/// Slices renormalized after writing, in application order.
pub fn slice_norms() -> &'static [SliceNorm] {
    &SLICE_NORMS
}

pub fn lookup(dim: usize) -> Option<&'static DimSpec> {
    let registry = spec_registry();
    registry
        .binary_search_by_key(&dim, |s| s.dim_id)
        .ok()
        .map(|i| &registry[i])
}

// ═══════════════════════════════════════════════════════════════════════════
// Self-check
// ═══════════════════════════════════════════════════════════════════════════

/// A structural problem in the static tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryDefect {
    DuplicateDim { dim: usize, sources: (&'static str, &'static str) },
    DimOutOfRange { dim: usize, source: &'static str },
    SliceOutOfRange { slice: &'static str },
    SliceDimNotWritable { slice: &'static str, dim: usize },
}

/// Verify the registry invariants. An empty result means the tables are sound.
///
/// Slice positions absent from the registry are reported too; they would
/// stay zero and still count in the slice sum.
pub fn check_registry() -> Vec<RegistryDefect> {
    let mut defects = Vec::new();

    let all = collect_specs();

    let mut seen: Vec<Option<&'static str>> = vec![None; SIGNATURE_DIMS];
    for spec in &all {
        if spec.dim_id >= SIGNATURE_DIMS {
            defects.push(RegistryDefect::DimOutOfRange {
                dim: spec.dim_id,
                source: spec.source,
            });
            continue;
        }
        match seen[spec.dim_id] {
            Some(prev) => defects.push(RegistryDefect::DuplicateDim {
                dim: spec.dim_id,
                sources: (prev, spec.source),
            }),
            None => seen[spec.dim_id] = Some(spec.source),
        }
    }

    let writable = writable_dims();
    for slice in slice_norms() {
        if slice.start > slice.end || slice.end >= SIGNATURE_DIMS {
            defects.push(RegistryDefect::SliceOutOfRange { slice: slice.name });
            continue;
        }
        for dim in slice.dims() {
            if !writable.contains(dim) {
                defects.push(RegistryDefect::SliceDimNotWritable {
                    slice: slice.name,
                    dim,
                });
            }
        }
    }

    defects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_sound() {
        let defects = check_registry();
        assert!(defects.is_empty(), "registry defects: {:?}", defects);
    }

    #[test]
    fn test_registry_sorted_and_unique() {
        let registry = spec_registry();
        for pair in registry.windows(2) {
            assert!(pair[0].dim_id < pair[1].dim_id);
        }
        assert_eq!(writable_dims().len(), registry.len());
    }

    #[test]
    fn test_checked_specs_match_registry() {
        let mut collected = collect_specs();
        assert_eq!(collected.len(), spec_registry().len());
        collected.sort_by_key(|s| s.dim_id);
        assert_eq!(collected.as_slice(), spec_registry());
        assert!(collected.iter().any(|s| s.source == "BAR_COMPETE_ENJOY"));
    }

    #[test]
    fn test_known_dims() {
        assert_eq!(GENDER.dim_of("Male"), Some(3));
        assert_eq!(OUTFIT_STYLES.dim_of("Minimal Functional"), Some(50));
        assert_eq!(SPORTS.dim_of("Running"), Some(32));
        assert_eq!(BRANDS.dim_of("Nike"), Some(79));
        assert_eq!(BRANDS.dim_of("On"), Some(88));
        assert_eq!(FREQUENCY.dim_of("3–4x / week"), Some(194));
    }

    #[test]
    fn test_exact_match_only() {
        assert_eq!(GENDER.dim_of("male"), None);
        assert_eq!(GENDER.dim_of("Prefer not to say"), None);
        // hyphen-minus is not the en-dash used in the option list
        assert_eq!(HEIGHT.dim_of("170-180"), None);
        assert_eq!(HEIGHT.dim_of("170–180"), Some(13));
    }

    #[test]
    fn test_slices_cover_their_tables() {
        for (dim, _) in BRANDS.dims() {
            assert!(BRAND_SLICE.dims().contains(&dim));
        }
        for table in [FREQUENCY, DURATION] {
            for (dim, _) in table.dims() {
                assert!(ACTIVITY_SLICE.dims().contains(&dim));
            }
        }
        assert_eq!(ACTIVITY_SLICE.width(), 8);
        assert_eq!(BRAND_SLICE.width(), 10);
    }

    #[test]
    fn test_undeclared_dims_not_writable() {
        let writable = writable_dims();
        for dim in [0, 1, 21, 64, 78, 100, 150, 250, 255, 256] {
            assert!(!writable.contains(dim), "dim {dim} should not be writable");
        }
    }

    #[test]
    fn test_lookup() {
        let spec = lookup(3).unwrap();
        assert_eq!(spec.label, "Male");
        assert_eq!(spec.source, "profile.gender");
        assert_eq!(spec.encoding, Encoding::OneHot);

        let bar = lookup(207).unwrap();
        assert_eq!(bar.layer, Layer::Spiritual);
        assert_eq!(bar.encoding, Encoding::Continuous);

        assert!(lookup(100).is_none());
    }
}
