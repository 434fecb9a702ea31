//! The profile-completion progress engine.
//!
//! Pure and synchronous: merge a canonical [`ProfileRecord`] with an optional
//! [`DraftRecord`], classify every tracked field as complete or incomplete,
//! and fold the results into per-step and overall statistics. Same inputs
//! always produce the same [`ProgressReport`]; no I/O, no mutation of inputs,
//! and no error path — absent or malformed data degrades to a zero-valued
//! report.
//!
//! The per-field rules in [`classify_field`] encode live product policy
//! (for example, unemployed users do not need a job title). They are not a
//! generic "is the value set" check and must not be simplified into one.

use crate::fields::{self, STEPS};
use crate::models::{DraftRecord, MissingField, ProfileRecord, ProgressReport, StepProgress};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Whether a raw value counts as "present" for lookup purposes.
///
/// Null is absent; strings are absent when empty after trimming. Everything
/// else (including `false`, `0`, and empty arrays) is present — several field
/// rules need to distinguish those from truly missing data.
fn value_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

fn num_eq(value: &Value, expected: f64) -> bool {
    value.as_f64().map(|n| n == expected).unwrap_or(false)
}

/// Builds the combined field mapping from server data plus draft overlay.
///
/// Draft keys are translated from form names to server names; draft values
/// win over server values for the same logical field because the draft holds
/// more recent unsaved edits. Draft keys with no known translation are kept
/// under their original name rather than dropped.
pub fn combined_data(
    profile: Option<&ProfileRecord>,
    draft: Option<&DraftRecord>,
) -> Map<String, Value> {
    let mut combined = profile.map(|p| p.fields().clone()).unwrap_or_default();

    if let Some(draft) = draft {
        for (form_key, value) in &draft.form_data {
            let key = fields::server_key_for(form_key).unwrap_or(form_key.as_str());
            combined.insert(key.to_string(), value.clone());
        }
    }

    combined
}

/// Looks up a tracked field in combined data.
///
/// Tries the field's own key first, then its mapped alias (in either
/// direction), accepting whichever resolves to a present value. The lookup
/// order is deterministic so classification never depends on map iteration
/// order.
fn resolve<'a>(combined: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(value) = combined.get(key).filter(|v| value_present(v)) {
        return Some(value);
    }

    let alias = fields::form_key_for(key).or_else(|| fields::server_key_for(key))?;
    combined.get(alias).filter(|v| value_present(v))
}

/// Whether combined data carries at least one usable photo.
///
/// Checks the flat `photos` list, the nested `profile.photos` list, and both
/// `avatar_url` locations; any one of them satisfies the photo requirement.
pub fn has_any_photo(combined: &Map<String, Value>) -> bool {
    let photo_list_filled = |v: Option<&Value>| {
        v.and_then(Value::as_array)
            .map(|list| !list.is_empty())
            .unwrap_or(false)
    };
    let avatar_set = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    };

    let nested = combined.get("profile");
    photo_list_filled(combined.get("photos"))
        || photo_list_filled(nested.and_then(|p| p.get("photos")))
        || avatar_set(combined.get("avatar_url"))
        || avatar_set(nested.and_then(|p| p.get("avatar_url")))
}

/// Whether `employment_status` resolves to an employed state.
///
/// `false`, `0`, and unset all mean "not employed" here; anything else
/// present means employed. Job title and position level become optional for
/// not-employed users.
fn resolves_employed(combined: &Map<String, Value>) -> bool {
    match resolve(combined, "employment_status") {
        None => false,
        Some(v) => !(v == &Value::Bool(false) || num_eq(v, 0.0)),
    }
}

/// Classifies one tracked field as complete or incomplete.
///
/// The per-field asymmetries are deliberate product behavior carried over
/// from the shipped wizard, quirks included:
///
/// - `employment_status`: literal `false` and `0` are incomplete even though
///   the generic rule treats booleans as always complete. The specific rule
///   wins.
/// - `job_title_id` / `position_level_id`: auto-complete for not-employed
///   users; otherwise require a non-null, non-zero value.
/// - `car_ownership`: only `true`, `1`, or `"1"` count.
/// - `smoking_status`: strict tri-state presence check — exactly `true`,
///   `false`, `1`, or `0`.
/// - `hobbies`, `pets`, `guardian_contact`: never block progress.
/// - `profile_image`: a direct value, any photo in the list, or an avatar URL
///   all satisfy it.
pub fn classify_field(key: &str, combined: &Map<String, Value>) -> bool {
    let resolved = resolve(combined, key);

    match key {
        "employment_status" => match resolved {
            None => false,
            Some(v) if v == &Value::Bool(true) || num_eq(v, 1.0) => true,
            Some(v) if v == &Value::Bool(false) || num_eq(v, 0.0) => false,
            Some(_) => true,
        },
        "job_title_id" | "position_level_id" => {
            if !resolves_employed(combined) {
                return true;
            }
            matches!(resolved, Some(v) if !num_eq(v, 0.0))
        }
        "car_ownership" => matches!(
            resolved,
            Some(v) if v == &Value::Bool(true) || num_eq(v, 1.0) || v.as_str() == Some("1")
        ),
        "hobbies" | "pets" | "guardian_contact" => true,
        "profile_image" => resolved.is_some() || has_any_photo(combined),
        "bio" | "bio_en" => {
            matches!(resolved, Some(Value::String(s)) if !s.trim().is_empty())
        }
        "date_of_birth" | "height" | "weight" => resolved.is_some(),
        "smoking_status" => matches!(
            resolved,
            Some(v) if matches!(v, Value::Bool(_)) || num_eq(v, 0.0) || num_eq(v, 1.0)
        ),
        // Generic fallback: arrays and booleans always complete, numbers
        // complete when present (zero counts), strings complete when
        // non-empty after trim, everything else when present at all.
        _ => match resolved {
            None => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        },
    }
}

/// Fully-formed report for "no data at all": every step present with zero
/// completion, every tracked field listed as missing.
fn zero_report() -> ProgressReport {
    let mut step_progress = BTreeMap::new();
    let mut missing_fields = Vec::new();

    for step in STEPS {
        for field in step.fields {
            missing_fields.push(MissingField {
                label: field.label.to_string(),
                step: step.number,
            });
        }
        step_progress.insert(
            step.number,
            StepProgress {
                completed: 0,
                total: step.fields.len(),
                percentage: 0,
            },
        );
    }

    ProgressReport {
        progress: 0,
        step_progress,
        missing_fields,
        completed_fields: 0,
        total_fields: fields::total_tracked_fields(),
    }
}

fn round_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u8
}

/// Computes the full progress report for a profile plus optional draft.
///
/// Steps are processed in ascending order and fields in declared order, so
/// the missing-fields list is deterministic and already grouped by step.
/// Callers are responsible for discarding drafts owned by a different user
/// before calling this.
pub fn compute_progress(
    profile: Option<&ProfileRecord>,
    draft: Option<&DraftRecord>,
) -> ProgressReport {
    let combined = combined_data(profile, draft);

    // No data at all short-circuits to an all-zero report. This must bypass
    // classification: the always-complete fields and the employment carve-out
    // would otherwise credit a blank profile with several fields.
    if combined.is_empty() {
        return zero_report();
    }

    let mut step_progress = BTreeMap::new();
    let mut missing_fields = Vec::new();
    let mut completed_fields = 0;
    let mut total_fields = 0;

    for step in STEPS {
        let mut completed = 0;
        for field in step.fields {
            if classify_field(field.key, &combined) {
                completed += 1;
            } else {
                missing_fields.push(MissingField {
                    label: field.label.to_string(),
                    step: step.number,
                });
            }
        }

        // Legacy carve-out: users who only ever wrote a bio still get credit
        // for one step-1 field. Preserved verbatim from the shipped wizard.
        if step.number == 1 && completed == 0 {
            if let Some(Value::String(bio)) = combined.get("bio") {
                if !bio.trim().is_empty() {
                    completed = 1;
                }
            }
        }

        let total = step.fields.len();
        step_progress.insert(
            step.number,
            StepProgress {
                completed,
                total,
                percentage: round_percentage(completed, total),
            },
        );
        completed_fields += completed;
        total_fields += total;
    }

    // Stable sort keeps declaration order within a step.
    missing_fields.sort_by_key(|m| m.step);

    let mut progress = round_percentage(completed_fields, total_fields);

    // Legacy carve-out: profiles that picked an app language never show 0%.
    if progress < 10
        && combined
            .get("language")
            .map(value_present)
            .unwrap_or(false)
    {
        progress = 10;
    }

    ProgressReport {
        progress,
        step_progress,
        missing_fields,
        completed_fields,
        total_fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> ProfileRecord {
        ProfileRecord::from_value(&value)
    }

    fn combined_of(value: serde_json::Value) -> Map<String, Value> {
        combined_data(Some(&record(value)), None)
    }

    #[test]
    fn test_value_present_rules() {
        assert!(!value_present(&Value::Null));
        assert!(!value_present(&json!("")));
        assert!(!value_present(&json!("   ")));
        assert!(value_present(&json!(0)));
        assert!(value_present(&json!(false)));
        assert!(value_present(&json!([])));
        assert!(value_present(&json!("x")));
    }

    #[test]
    fn test_resolve_prefers_own_key() {
        let combined = combined_of(json!({"nationality_id": 3, "nationality": 9}));
        assert_eq!(resolve(&combined, "nationality_id"), Some(&json!(3)));
    }

    #[test]
    fn test_resolve_falls_back_to_alias() {
        // Server key absent, form-named key present (unmapped draft leftover).
        let combined = combined_of(json!({"nationality": 9}));
        assert_eq!(resolve(&combined, "nationality_id"), Some(&json!(9)));
    }

    #[test]
    fn test_resolve_skips_empty_own_key() {
        let combined = combined_of(json!({"bio": "", "date_of_birth": null}));
        assert_eq!(resolve(&combined, "bio"), None);
        assert_eq!(resolve(&combined, "date_of_birth"), None);
    }

    #[test]
    fn test_employment_status_rule() {
        assert!(classify_field(
            "employment_status",
            &combined_of(json!({"employment_status": true}))
        ));
        assert!(classify_field(
            "employment_status",
            &combined_of(json!({"employment_status": 1}))
        ));
        // Literal false and 0 are incomplete under the specific rule.
        assert!(!classify_field(
            "employment_status",
            &combined_of(json!({"employment_status": false}))
        ));
        assert!(!classify_field(
            "employment_status",
            &combined_of(json!({"employment_status": 0}))
        ));
        assert!(!classify_field("employment_status", &combined_of(json!({}))));
        // Any other present value passes.
        assert!(classify_field(
            "employment_status",
            &combined_of(json!({"employment_status": "self_employed"}))
        ));
    }

    #[test]
    fn test_job_title_optional_when_not_employed() {
        for emp in [json!(false), json!(0), json!(null)] {
            let combined = combined_of(json!({"employment_status": emp}));
            assert!(classify_field("job_title_id", &combined));
            assert!(classify_field("position_level_id", &combined));
        }
    }

    #[test]
    fn test_job_title_required_when_employed() {
        let combined = combined_of(json!({"employment_status": true}));
        assert!(!classify_field("job_title_id", &combined));
        assert!(!classify_field("position_level_id", &combined));

        let combined = combined_of(json!({"employment_status": true, "job_title_id": 0}));
        assert!(!classify_field("job_title_id", &combined));

        let combined = combined_of(json!({"employment_status": true, "job_title_id": 4}));
        assert!(classify_field("job_title_id", &combined));
    }

    #[test]
    fn test_car_ownership_strict_truthy_set() {
        assert!(classify_field(
            "car_ownership",
            &combined_of(json!({"car_ownership": true}))
        ));
        assert!(classify_field(
            "car_ownership",
            &combined_of(json!({"car_ownership": 1}))
        ));
        assert!(classify_field(
            "car_ownership",
            &combined_of(json!({"car_ownership": "1"}))
        ));
        assert!(!classify_field(
            "car_ownership",
            &combined_of(json!({"car_ownership": false}))
        ));
        assert!(!classify_field(
            "car_ownership",
            &combined_of(json!({"car_ownership": "yes"}))
        ));
        assert!(!classify_field("car_ownership", &combined_of(json!({}))));
    }

    #[test]
    fn test_list_fields_never_block() {
        let combined = combined_of(json!({}));
        assert!(classify_field("hobbies", &combined));
        assert!(classify_field("pets", &combined));
        assert!(classify_field("guardian_contact", &combined));
    }

    #[test]
    fn test_smoking_status_tri_state() {
        for present in [json!(true), json!(false), json!(1), json!(0)] {
            assert!(classify_field(
                "smoking_status",
                &combined_of(json!({"smoking_status": present}))
            ));
        }
        assert!(!classify_field("smoking_status", &combined_of(json!({}))));
        assert!(!classify_field(
            "smoking_status",
            &combined_of(json!({"smoking_status": "sometimes"}))
        ));
        assert!(!classify_field(
            "smoking_status",
            &combined_of(json!({"smoking_status": 2}))
        ));
    }

    #[test]
    fn test_profile_image_photo_fallbacks() {
        assert!(classify_field(
            "profile_image",
            &combined_of(json!({"profile_image": "me.jpg"}))
        ));
        assert!(classify_field(
            "profile_image",
            &combined_of(json!({"photos": ["a.jpg"]}))
        ));
        assert!(classify_field(
            "profile_image",
            &combined_of(json!({"profile": {"photos": ["a.jpg"]}}))
        ));
        assert!(classify_field(
            "profile_image",
            &combined_of(json!({"profile": {"avatar_url": "x"}}))
        ));
        assert!(!classify_field(
            "profile_image",
            &combined_of(json!({"photos": []}))
        ));
        assert!(!classify_field("profile_image", &combined_of(json!({}))));
    }

    #[test]
    fn test_bio_requires_non_blank_string() {
        assert!(classify_field("bio", &combined_of(json!({"bio": "hi"}))));
        assert!(!classify_field("bio", &combined_of(json!({"bio": "  "}))));
        assert!(!classify_field("bio", &combined_of(json!({"bio": 7}))));
        assert!(!classify_field("bio_en", &combined_of(json!({}))));
    }

    #[test]
    fn test_height_weight_zero_counts() {
        assert!(classify_field("height", &combined_of(json!({"height": 0}))));
        assert!(classify_field("weight", &combined_of(json!({"weight": 0}))));
        assert!(!classify_field("height", &combined_of(json!({"height": ""}))));
        assert!(!classify_field("weight", &combined_of(json!({}))));
    }

    #[test]
    fn test_generic_fallback() {
        assert!(classify_field(
            "smoking_tools",
            &combined_of(json!({"smoking_tools": []}))
        ));
        assert!(classify_field(
            "children_count",
            &combined_of(json!({"children_count": 0}))
        ));
        assert!(classify_field(
            "hijab_status",
            &combined_of(json!({"hijab_status": false}))
        ));
        assert!(!classify_field("marriage_budget_id", &combined_of(json!({}))));
    }

    #[test]
    fn test_draft_overlay_wins_and_translates() {
        let profile = record(json!({"nationality_id": 1, "height": 160}));
        let draft = DraftRecord {
            user_id: "u1".to_string(),
            step: 1,
            last_updated: chrono::Utc::now(),
            form_data: serde_json::from_value(json!({"nationality": 5, "quiz_answer": "x"}))
                .unwrap(),
        };

        let combined = combined_data(Some(&profile), Some(&draft));
        // Draft value wins under the translated server key.
        assert_eq!(combined.get("nationality_id"), Some(&json!(5)));
        // Server-only field untouched.
        assert_eq!(combined.get("height"), Some(&json!(160)));
        // Unknown draft key preserved as-is.
        assert_eq!(combined.get("quiz_answer"), Some(&json!("x")));
    }

    #[test]
    fn test_step1_bio_carve_out() {
        // A record whose only step-1 content is a non-empty bio must get
        // credit for exactly one step-1 field.
        let profile = record(json!({"bio": "just a bio"}));
        let report = compute_progress(Some(&profile), None);
        assert_eq!(report.step_progress[&1].completed, 1);

        // With no step-1 data at all, no credit.
        let report = compute_progress(None, None);
        assert_eq!(report.step_progress[&1].completed, 0);
    }

    #[test]
    fn test_language_floor() {
        // With the current step table the natural minimum for any non-empty
        // record sits above 10%, so the floor only guards against future
        // table growth; verify the bound holds and that truly empty input
        // stays at zero.
        let profile = record(json!({"language": "ar"}));
        let report = compute_progress(Some(&profile), None);
        assert!(report.progress >= 10);

        let report = compute_progress(None, None);
        assert_eq!(report.progress, 0);
    }

    #[test]
    fn test_missing_fields_sorted_by_step() {
        let profile = record(json!({"bio": "hello", "country_id": 2}));
        let report = compute_progress(Some(&profile), None);

        let steps: Vec<u32> = report.missing_fields.iter().map(|m| m.step).collect();
        let mut sorted = steps.clone();
        sorted.sort();
        assert_eq!(steps, sorted);
    }
}
