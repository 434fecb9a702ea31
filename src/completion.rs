//! The three "is this profile complete enough" gate heuristics.
//!
//! These evolved independently in the shipped product and are kept as three
//! separate predicates on purpose: they use different field lists, different
//! thresholds, and disagree in edge cases that current navigation behavior
//! depends on. Do not unify them without a product decision.

use crate::models::{CompletionCheck, CompletionStatus, DraftRecord, ProfileRecord};
use crate::progress::{self, has_any_photo};
use serde_json::Value;

/// The 11 fields the API-level short-circuit gate looks at.
const CRITICAL_FIELDS: &[&str] = &[
    "bio",
    "date_of_birth",
    "nationality_id",
    "religion_id",
    "country_id",
    "city_id",
    "educational_level_id",
    "marital_status_id",
    "height",
    "weight",
    "employment_status",
];

/// The 10 fields the emptiness heuristic looks at.
const EMPTINESS_FIELDS: &[&str] = &[
    "bio",
    "nationality_id",
    "religion_id",
    "country_id",
    "city_id",
    "date_of_birth",
    "educational_level_id",
    "marital_status_id",
    "height",
    "weight",
];

/// The 12 scalar fields the navigation-gate check requires, on top of the
/// photos list.
const CHECK_REQUIRED_FIELDS: &[&str] = &[
    "bio",
    "nationality_id",
    "religion_id",
    "country_id",
    "city_id",
    "date_of_birth",
    "educational_level_id",
    "marital_status_id",
    "employment_status",
    "marriage_budget_id",
    "height",
    "weight",
];

fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// Whether the server-side record alone is complete enough to skip the
/// multi-step gate entirely: at least 80% of the critical fields filled and
/// at least one photo.
pub fn is_api_profile_complete(profile: &ProfileRecord) -> bool {
    let filled = CRITICAL_FIELDS
        .iter()
        .filter(|key| is_filled(profile.get(key)))
        .count();

    let ratio = filled as f64 / CRITICAL_FIELDS.len() as f64;
    ratio >= 0.8 && has_any_photo(profile.fields())
}

/// Whether the server-side record is mostly empty: more than 70% of the
/// required list unset. Callers use this to decide whether locally-resumed
/// progress can be trusted or fresh progress should be computed from the
/// (empty) server record.
pub fn is_profile_empty(profile: &ProfileRecord) -> bool {
    let empty = EMPTINESS_FIELDS
        .iter()
        .filter(|key| !is_filled(profile.get(key)))
        .count();

    empty as f64 / EMPTINESS_FIELDS.len() as f64 > 0.7
}

/// Computes the navigation-gate missing-fields list.
///
/// `employment_status == 0` counts as missing here even though the progress
/// engine's own rule treats some zero-adjacent states differently; the
/// disagreement is long-standing shipped behavior.
pub fn check_profile_completion(profile: &ProfileRecord) -> CompletionCheck {
    let mut missing_fields = Vec::new();

    for key in CHECK_REQUIRED_FIELDS {
        let value = profile.get(key);
        let employment_zero =
            *key == "employment_status" && value.and_then(Value::as_f64) == Some(0.0);

        if !is_filled(value) || employment_zero {
            missing_fields.push(key.to_string());
        }
    }

    if !has_any_photo(profile.fields()) {
        missing_fields.push("photos".to_string());
    }

    CompletionCheck {
        is_profile_complete: missing_fields.is_empty(),
        missing_fields,
    }
}

/// Route-guard resolution over all three gates plus the local-draft
/// allowance.
///
/// A profile passes when the API-level gate passes, or the navigation check
/// finds nothing missing, or a locally-saved draft lifts merged progress to
/// 80% or more. The draft allowance is ignored while the server record is
/// mostly empty, since a draft layered on nothing is not trusted as resumed
/// progress.
pub fn resolve_completion_status(
    profile: &ProfileRecord,
    draft: Option<&DraftRecord>,
) -> CompletionStatus {
    let api_profile_complete = is_api_profile_complete(profile);
    let profile_empty = is_profile_empty(profile);
    let check = check_profile_completion(profile);

    let draft_progress = if profile_empty {
        None
    } else {
        draft.map(|d| progress::compute_progress(Some(profile), Some(d)).progress)
    };

    let is_profile_complete = api_profile_complete
        || check.is_profile_complete
        || draft_progress.map(|p| p >= 80).unwrap_or(false);

    CompletionStatus {
        api_profile_complete,
        profile_empty,
        check,
        is_profile_complete,
    }
}
