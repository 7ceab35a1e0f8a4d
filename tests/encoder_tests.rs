//! Tests for the identity vector encoder
//!
//! - Output range and write restriction over the registry
//! - Baseline gate (the only hard failure)
//! - One-hot, rank-weighted, multi-hot and soul-bar encodings
//! - Slice-local L1 normalization
//! - Density metric
//! - End-to-end wizard example

use twin_matrix::registry::{writable_dims, ACTIVITY_SLICE, BRANDS, BRAND_SLICE, SPORTS};
use twin_matrix::types::{Profile, SoulBar, SoulState, SportSetup, SportTwin};
use twin_matrix::{compute_density, encode, validate_baseline, Signature, WizardState};

// ═══════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn soul(values: [Option<i32>; 4]) -> SoulState {
    let ids = [
        "BAR_OUTCOME_EXPERIENCE",
        "BAR_SOLO_SOCIAL",
        "BAR_DISCIPLINE_FLOW",
        "BAR_COMPETE_ENJOY",
    ];
    SoulState {
        bars: ids
            .iter()
            .zip(values)
            .map(|(id, v)| SoulBar::new(*id, v))
            .collect(),
    }
}

fn valid_state() -> WizardState {
    WizardState {
        profile: Profile {
            age_bin: "25–34".into(),
            gender: "Male".into(),
            height_bin: "170–180".into(),
            weight_bin: "65–80".into(),
            ..Default::default()
        },
        sport_setup: SportSetup {
            frequency: "3–4x / week".into(),
            duration: "30–60 min".into(),
            daily_steps: "7,000–12,000".into(),
        },
        sport_twin: SportTwin {
            sport_ranking: strings(&["Running", "Cycling"]),
            outfit_style: strings(&["Minimal Functional"]),
            brands: strings(&["Nike", "Adidas"]),
        },
        soul: soul([Some(30), None, Some(70), None]),
        signature: Vec::new(),
    }
}

fn full_state() -> WizardState {
    let mut state = valid_state();
    state.profile.education = "Master's".into();
    state.profile.income = "Prefer not to say".into();
    state.profile.marital_status = "Married".into();
    state.profile.occupation = "Engineer / Tech".into();
    state.profile.living_type = "With family".into();
    state.sport_twin.sport_ranking = strings(&[
        "Yoga", "Running", "Hiking", "Dance", "Golf", "Tennis", "HIIT", "Walking", "Climbing",
        "Football", "Basketball",
    ]);
    state.sport_twin.outfit_style = strings(&["Streetwear", "Retro", "Luxury Sport"]);
    state.sport_twin.brands = strings(&["On", "Puma", "ASICS", "Patagonia"]);
    state.soul = soul([Some(0), Some(100), Some(55), Some(12)]);
    state
}

fn sig(state: &WizardState) -> Signature {
    encode(state).expect("baseline fields are set")
}

// ═══════════════════════════════════════════════════════════════════════════
// Output range / write restriction
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_output_length_and_range() {
    for state in [valid_state(), full_state()] {
        let signature = sig(&state);
        assert_eq!(signature.to_vec().len(), 256);
        // u8 storage bounds every value to 0..=255; JSON carries plain integers
        let json = serde_json::to_value(&signature).unwrap();
        assert!(json.as_array().unwrap().iter().all(|v| v.as_u64().unwrap() <= 255));
    }
}

#[test]
fn test_only_writable_dims_are_non_zero() {
    let writable = writable_dims();
    for state in [valid_state(), full_state()] {
        let signature = sig(&state);
        for dim in signature.non_zero_dims() {
            assert!(writable.contains(dim), "dim {dim} written but not declared");
        }
        assert_eq!(signature[100], 0);
        assert_eq!(signature[150], 0);
        assert_eq!(signature[250], 0);
    }
}

#[test]
fn test_encode_is_deterministic() {
    let state = full_state();
    assert_eq!(sig(&state), sig(&state));
}

// ═══════════════════════════════════════════════════════════════════════════
// Baseline gate
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_baseline_gate() {
    let mut state = valid_state();
    state.sport_setup = SportSetup {
        frequency: "".into(),
        duration: "30–60 min".into(),
        daily_steps: "".into(),
    };

    let err = encode(&state).unwrap_err();
    assert_eq!(err.code.as_str(), "BASELINE_MISSING_FIELDS");
    assert!(err.message.contains("frequency"));
    assert!(err.message.contains("dailySteps"));
    assert!(!err.message.contains("duration"));

    assert_eq!(validate_baseline(&state), Some(err));
}

#[test]
fn test_empty_state_fails_baseline() {
    let err = encode(&WizardState::default()).unwrap_err();
    assert_eq!(err.missing.len(), 3);
}

#[test]
fn test_only_baseline_is_mandatory() {
    let state = WizardState {
        sport_setup: valid_state().sport_setup,
        ..Default::default()
    };
    let signature = sig(&state);
    // activity slice plus the daily-steps one-hot
    assert_eq!(signature.non_zero_dims(), vec![194, 197, 202]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Categorical fields
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_one_hot_profile_fields() {
    let signature = sig(&full_state());
    assert_eq!(signature[3], 255); // Male
    assert_eq!(signature[6], 255); // 25–34
    assert_eq!(signature[13], 255); // 170–180
    assert_eq!(signature[18], 255); // 65–80
    assert_eq!(signature[130], 255); // Master's
    assert_eq!(signature[141], 255); // income: listed "Prefer not to say"
    assert_eq!(signature[146], 255); // Married
    assert_eq!(signature[153], 255); // Engineer / Tech
    assert_eq!(signature[166], 255); // With family
}

#[test]
fn test_unlisted_values_write_nothing() {
    let mut state = valid_state();
    state.profile.gender = "Prefer not to say".into();
    state.profile.age_bin = "25-34".into(); // hyphen, not en-dash
    state.profile.living_type = "Prefer not to say".into();
    let signature = sig(&state);
    assert!((2..=10).all(|d| signature[d] == 0));
    assert!((164..=168).all(|d| signature[d] == 0));
}

// ═══════════════════════════════════════════════════════════════════════════
// Rank-weighted sports
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_rank_weighted_ordering() {
    let signature = sig(&valid_state());
    let running = SPORTS.dim_of("Running").unwrap();
    let cycling = SPORTS.dim_of("Cycling").unwrap();
    let swimming = SPORTS.dim_of("Swimming").unwrap();

    assert_eq!(signature[running], 255);
    assert!(signature[running] > signature[cycling]);
    assert!(signature[cycling] > 0);
    assert_eq!(signature[swimming], 0);
}

#[test]
fn test_rank_weights_strictly_decrease() {
    let state = full_state();
    let signature = sig(&state);
    let ranked: Vec<u8> = state.sport_twin.sport_ranking[..10]
        .iter()
        .map(|s| signature[SPORTS.dim_of(s).unwrap()])
        .collect();
    assert_eq!(ranked[0], 255);
    for pair in ranked.windows(2) {
        assert!(pair[0] > pair[1], "weights {:?} not decreasing", ranked);
    }
    // the 11th entry is past the cap
    assert_eq!(signature[SPORTS.dim_of("Basketball").unwrap()], 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Multi-hot
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_outfit_multi_hot_independent() {
    let signature = sig(&full_state());
    assert_eq!(signature[51], 255); // Streetwear
    assert_eq!(signature[56], 255); // Retro
    assert_eq!(signature[57], 255); // Luxury Sport
    assert_eq!(signature[50], 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Soul bars
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_soul_bar_absence_symmetry() {
    let signature = sig(&valid_state());
    // bar 0 = 30
    assert!(signature[206] > 0 && signature[207] > 0);
    let sum = signature[206] as u32 + signature[207] as u32;
    assert!((254..=256).contains(&sum));
    // bar 1 untouched
    assert_eq!(signature[208], 0);
    assert_eq!(signature[209], 0);
    // bar 2 = 70 leans right
    assert!(signature[211] > signature[210]);
}

#[test]
fn test_soul_bar_extremes() {
    let signature = sig(&full_state());
    assert_eq!((signature[206], signature[207]), (255, 0));
    assert_eq!((signature[208], signature[209]), (0, 255));
}

#[test]
fn test_midpoint_differs_from_untouched() {
    let mut state = valid_state();
    state.soul = soul([None, Some(50), None, None]);
    let signature = sig(&state);
    assert!(signature[208] > 0 && signature[209] > 0);
    assert_eq!(signature[206], 0);
    assert_eq!(signature[207], 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Slice normalization
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_activity_slice_sums_to_255() {
    for state in [valid_state(), full_state()] {
        let sum = sig(&state).range_sum(ACTIVITY_SLICE.start, ACTIVITY_SLICE.end);
        assert!((254..=256).contains(&sum), "activity slice sum {sum}");
    }
}

#[test]
fn test_brand_slice_sums_to_255() {
    let all_brands = BRANDS.options.iter().map(|o| o.value).collect::<Vec<_>>();
    let mut state = valid_state();
    for count in 1..=all_brands.len() {
        state.sport_twin.brands = strings(&all_brands[..count]);
        let signature = sig(&state);
        let sum = signature.range_sum(BRAND_SLICE.start, BRAND_SLICE.end);
        assert_eq!(sum, 255, "brand slice sum for {count} brands");
        let (lo, hi) = (255 / count as u32, 255u32.div_ceil(count as u32));
        for dim in BRAND_SLICE.dims().take(count) {
            let v = signature[dim] as u32;
            assert!(v == lo || v == hi, "dim {dim} = {v} with {count} brands");
        }
    }
}

#[test]
fn test_single_brand_gets_full_weight() {
    let mut state = valid_state();
    state.sport_twin.brands = strings(&["Adidas"]);
    assert_eq!(sig(&state)[80], 255);
}

#[test]
fn test_empty_slices_stay_zero() {
    let mut state = valid_state();
    state.sport_twin.brands.clear();
    state.sport_setup.frequency = "Sometimes".into();
    state.sport_setup.duration = "A while".into();
    let signature = sig(&state);
    assert_eq!(signature.range_sum(BRAND_SLICE.start, BRAND_SLICE.end), 0);
    assert_eq!(signature.range_sum(ACTIVITY_SLICE.start, ACTIVITY_SLICE.end), 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Density
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_density_zero_vector() {
    assert_eq!(compute_density(&[0u8; 256]), 0);
}

#[test]
fn test_density_ten_of_256() {
    let mut values = [0u8; 256];
    for v in values.iter_mut().take(10) {
        *v = 100;
    }
    assert_eq!(compute_density(&values), 4);
}

#[test]
fn test_density_full_vector() {
    assert_eq!(compute_density(&[1u8; 256]), 100);
}

// ═══════════════════════════════════════════════════════════════════════════
// End-to-end
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_end_to_end_example() {
    let signature = sig(&valid_state());

    assert_eq!(signature[3], 255);
    assert_eq!(signature[50], 255);
    let soul_pair = signature[206] as u32 + signature[207] as u32;
    assert!((254..=256).contains(&soul_pair));
    assert_eq!(signature[208], 0);
    assert_eq!(signature[209], 0);

    // Nike + Adidas split the brand slice
    assert_eq!(signature[79] as u32 + signature[80] as u32, 255);
    assert!(signature[79].abs_diff(signature[80]) <= 1);
}

#[test]
fn test_end_to_end_from_json() {
    let state: WizardState = serde_json::from_value(serde_json::json!({
        "profile": {"ageBin": "25–34", "gender": "Male"},
        "sportSetup": {
            "frequency": "3–4x / week",
            "duration": "30–60 min",
            "dailySteps": "7,000–12,000"
        },
        "sportTwin": {
            "sportRanking": ["Running", "Cycling"],
            "outfitStyle": ["Minimal Functional"],
            "brands": ["Nike", "Adidas"]
        },
        "soul": {"bars": [
            {"id": "BAR_OUTCOME_EXPERIENCE", "value": 30},
            {"id": "BAR_SOLO_SOCIAL", "value": null},
            {"id": "BAR_DISCIPLINE_FLOW", "value": 70},
            {"id": "BAR_COMPETE_ENJOY", "value": null}
        ]},
        "signature": []
    }))
    .unwrap();

    let signature = sig(&state);
    assert_eq!(signature[3], 255);
    assert_eq!(signature[50], 255);
    assert_eq!(signature[208], 0);
    assert_eq!(signature[209], 0);
}
