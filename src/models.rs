use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Canonical, server-sourced user profile.
///
/// The upstream API delivers profiles wrapped in up to two envelope levels,
/// depending on which endpoint (and which backend version) produced them:
///
/// - `{"data": {"profile": {...}}}`
/// - `{"profile": {...}}`
/// - the bare field object
///
/// `from_value` unwraps whichever shape arrives to the innermost field
/// mapping, so nothing downstream ever needs envelope awareness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl ProfileRecord {
    /// Normalizes a raw upstream payload into a canonical record.
    ///
    /// Non-object payloads (null, arrays, scalars) normalize to an empty
    /// record rather than an error.
    pub fn from_value(raw: &Value) -> Self {
        let unwrapped = raw
            .get("data")
            .and_then(|d| d.get("profile"))
            .and_then(Value::as_object)
            .or_else(|| raw.get("profile").and_then(Value::as_object))
            .or_else(|| raw.as_object());

        match unwrapped {
            Some(fields) => Self {
                fields: fields.clone(),
            },
            None => {
                if !raw.is_null() {
                    tracing::warn!("Unexpected profile payload shape, treating as empty profile");
                }
                Self::default()
            }
        }
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Locally stored, unsaved multi-step form progress, scoped to one user.
///
/// `form_data` keys use the *form* field names, which differ from the server
/// field names; the merge step translates them through the field mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRecord {
    /// Owner of the draft. A draft whose owner differs from the requesting
    /// user must be discarded, never merged.
    pub user_id: String,
    /// Wizard step the user was last on (1-based).
    pub step: u32,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub form_data: Map<String, Value>,
}

/// Per-step completion statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
}

/// A tracked field that did not classify as complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingField {
    pub label: String,
    pub step: u32,
}

/// Output of the progress engine. A pure derived value: recomputed on every
/// call, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Overall completion, 0-100.
    pub progress: u8,
    /// Keyed by step number, ascending.
    pub step_progress: BTreeMap<u32, StepProgress>,
    /// Sorted ascending by step number, stable within a step.
    pub missing_fields: Vec<MissingField>,
    pub completed_fields: usize,
    pub total_fields: usize,
}

/// Result of the `check_profile_completion` gate heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCheck {
    pub is_profile_complete: bool,
    /// Server-side keys of the required fields found missing.
    pub missing_fields: Vec<String>,
}

/// Combined route-guard view over all three gate heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionStatus {
    pub api_profile_complete: bool,
    pub profile_empty: bool,
    pub check: CompletionCheck,
    /// Final gating decision consumed by navigation.
    pub is_profile_complete: bool,
}
