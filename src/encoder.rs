//! Identity vector encoder.
//!
//! Compresses a [`WizardState`] into a 256-dimension [`Signature`]:
//!
//! 1. baseline gate (`frequency`, `duration`, `dailySteps` must be set)
//! 2. one-hot writes for every single-choice field
//! 3. rank-weighted sports, multi-hot outfit styles and brands
//! 4. complementary soul-bar pairs
//! 5. slice-local L1 renormalization
//! 6. zeroing of every dimension the registry does not declare
//!
//! Writers share a scratch `f64` buffer that lives only for one call.

use std::collections::HashSet;
use tracing::debug;

use crate::error::{BaselineField, ValidationError};
use crate::registry::{
    slice_norms, writable_dims, OptionTable, SliceNorm, BRANDS, CATEGORICAL_FIELDS,
    MAX_SPORT_RANKING, OUTFIT_STYLES, SOUL_BARS, SPORTS,
};
use crate::types::{Signature, SoulState, WizardState};
use crate::SIGNATURE_DIMS;

/// Full weight of a selected dimension.
pub const MAX_WEIGHT: f64 = 255.0;

/// Values at or below this are treated as zero.
pub const EPSILON: f64 = 1e-6;

type Scratch = [f64; SIGNATURE_DIMS];

// ═══════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════

/// Check the three mandatory activity fields. Returns `None` when all are set.
pub fn validate_baseline(state: &WizardState) -> Option<ValidationError> {
    let setup = &state.sport_setup;
    let missing: Vec<BaselineField> = BaselineField::ALL
        .into_iter()
        .filter(|field| {
            let value = match field {
                BaselineField::Frequency => &setup.frequency,
                BaselineField::Duration => &setup.duration,
                BaselineField::DailySteps => &setup.daily_steps,
            };
            value.is_empty()
        })
        .collect();

    if missing.is_empty() {
        None
    } else {
        Some(ValidationError::baseline_missing(missing))
    }
}

/// Encode the wizard state into a signature.
///
/// Fails only when the activity baseline is incomplete; every other
/// missing or unrecognized answer simply contributes nothing.
pub fn encode(state: &WizardState) -> Result<Signature, ValidationError> {
    if let Some(err) = validate_baseline(state) {
        debug!(missing = ?err.missing, "Rejecting signature generation");
        return Err(err);
    }

    let mut buf: Scratch = [0.0; SIGNATURE_DIMS];

    for field in &CATEGORICAL_FIELDS {
        write_one_hot(&mut buf, &field.table, (field.read)(state));
    }
    write_rank_weighted(&mut buf, &SPORTS, &state.sport_twin.sport_ranking);
    write_multi_hot(&mut buf, &OUTFIT_STYLES, &state.sport_twin.outfit_style);
    write_multi_hot(&mut buf, &BRANDS, &state.sport_twin.brands);
    write_soul_bars(&mut buf, &state.soul);

    for slice in slice_norms() {
        normalize_l1(&mut buf, slice);
    }

    mask_unwritable(&mut buf);

    let signature = quantize(&buf);
    debug!(
        non_zero = signature.non_zero_dims().len(),
        density = compute_density(signature.as_bytes()),
        "Generated signature"
    );
    Ok(signature)
}

/// Percentage (0..=100) of the 256 dimensions holding a non-zero value.
pub fn compute_density<T>(values: &[T]) -> u32
where
    T: Copy + Into<f64>,
{
    let active = values
        .iter()
        .take(SIGNATURE_DIMS)
        .filter(|v| (**v).into() > EPSILON)
        .count();
    (active as f64 / SIGNATURE_DIMS as f64 * 100.0).round() as u32
}

/// Whether `encode` may leave a non-zero value at `dim`.
pub fn is_writable(dim: usize) -> bool {
    writable_dims().contains(dim)
}

// ═══════════════════════════════════════════════════════════════════════════
// Field Writers
// ═══════════════════════════════════════════════════════════════════════════

/// Unmatched values (including an unlisted "Prefer not to say") write nothing.
fn write_one_hot(buf: &mut Scratch, table: &OptionTable, value: &str) {
    if let Some(dim) = table.dim_of(value) {
        buf[dim] = MAX_WEIGHT;
    }
}

fn write_multi_hot(buf: &mut Scratch, table: &OptionTable, selected: &[String]) {
    for value in selected {
        write_one_hot(buf, table, value);
    }
}

/// Rank `r` of `n` gets `round((n - r) / n * 255)`, so the first entry always gets 255.
fn write_rank_weighted(buf: &mut Scratch, table: &OptionTable, ranking: &[String]) {
    let ranked = normalize_ranking(ranking);
    let n = ranked.len() as f64;
    for (rank, value) in ranked.iter().enumerate() {
        if let Some(dim) = table.dim_of(value) {
            buf[dim] = ((n - rank as f64) / n * MAX_WEIGHT).round();
        }
    }
}

/// Drop repeats (first occurrence wins) and keep at most ten entries.
fn normalize_ranking(ranking: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    ranking
        .iter()
        .map(String::as_str)
        .filter(|name| seen.insert(*name))
        .take(MAX_SPORT_RANKING)
        .collect()
}

/// Untouched bars leave both dims at zero; that is "no opinion", not 50/50.
fn write_soul_bars(buf: &mut Scratch, soul: &SoulState) {
    for bar in &SOUL_BARS {
        let Some(value) = soul.value_of(bar.id) else {
            continue;
        };
        let t = value.clamp(0, 100) as f64 / 100.0;
        buf[bar.left_dim] = (MAX_WEIGHT * (1.0 - t)).round();
        buf[bar.right_dim] = (MAX_WEIGHT * t).round();
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Post-processing
// ═══════════════════════════════════════════════════════════════════════════

/// Rescale the slice so it sums to exactly 255. An empty slice stays all zero.
///
/// Each position gets the floor of its proportional share; the leftover
/// units go to the largest remainders, lower dim first on ties. Every value
/// ends within 1 of `value / sum * 255`.
fn normalize_l1(buf: &mut Scratch, slice: &SliceNorm) {
    let dims = slice.start..=slice.end.min(SIGNATURE_DIMS - 1);
    let sum: f64 = buf[dims.clone()].iter().sum();
    if sum <= EPSILON {
        return;
    }

    let start = *dims.start();
    let mut remainders: Vec<(usize, f64)> = Vec::with_capacity(slice.width());
    let mut assigned = 0.0;
    for (offset, v) in buf[dims].iter_mut().enumerate() {
        let exact = *v / sum * MAX_WEIGHT;
        let floor = exact.floor();
        *v = floor;
        assigned += floor;
        remainders.push((start + offset, exact - floor));
    }

    remainders.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    let leftover = (MAX_WEIGHT - assigned).round().max(0.0) as usize;
    for (dim, _) in remainders.into_iter().take(leftover) {
        buf[dim] += 1.0;
    }
}

fn mask_unwritable(buf: &mut Scratch) {
    let writable = writable_dims();
    for (dim, v) in buf.iter_mut().enumerate() {
        if !writable.contains(dim) {
            *v = 0.0;
        }
    }
}

fn quantize(buf: &Scratch) -> Signature {
    let mut out = [0u8; SIGNATURE_DIMS];
    for (o, v) in out.iter_mut().zip(buf.iter()) {
        *o = if v.is_finite() {
            v.round().clamp(0.0, MAX_WEIGHT) as u8
        } else {
            0
        };
    }
    Signature::from_array(out)
}
