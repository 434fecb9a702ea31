//! Static configuration for the profile wizard: which fields are tracked per
//! step, their human-facing labels, and the correspondence between form field
//! names (used in drafts) and server field names (used in profile records).
//!
//! This table is product policy, not derived data. It defines what "100%
//! complete" means, so changes here change user-visible gating.

/// One tracked field within a wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedField {
    /// Server-side field name.
    pub key: &'static str,
    /// Human-facing label shown in missing-field alerts.
    pub label: &'static str,
}

/// One wizard step and its tracked fields, in display order.
#[derive(Debug, Clone, Copy)]
pub struct StepDefinition {
    pub number: u32,
    pub title: &'static str,
    pub fields: &'static [TrackedField],
}

const fn field(key: &'static str, label: &'static str) -> TrackedField {
    TrackedField { key, label }
}

/// Ordered step table. Steps must stay in ascending order: the aggregator
/// iterates this table directly and the missing-fields sort stability depends
/// on it.
pub const STEPS: &[StepDefinition] = &[
    StepDefinition {
        number: 1,
        title: "About You",
        fields: &[
            field("bio", "Bio"),
            field("date_of_birth", "Date of Birth"),
            field("nationality_id", "Nationality"),
            field("origin_id", "Origin"),
            field("religion_id", "Religion"),
        ],
    },
    StepDefinition {
        number: 2,
        title: "Location",
        fields: &[
            field("country_id", "Country of Residence"),
            field("city_id", "City"),
        ],
    },
    StepDefinition {
        number: 3,
        title: "Education & Work",
        fields: &[
            field("educational_level_id", "Educational Level"),
            field("specialization_id", "Specialization"),
            field("employment_status", "Employment Status"),
            field("job_title_id", "Job Title"),
            field("position_level_id", "Position Level"),
            field("financial_status_id", "Financial Status"),
        ],
    },
    StepDefinition {
        number: 4,
        title: "Lifestyle",
        fields: &[
            field("marital_status_id", "Marital Status"),
            field("housing_status_id", "Housing Status"),
            field("marriage_budget_id", "Marriage Budget"),
            field("religiosity_level_id", "Religiosity Level"),
            field("sleep_habit_id", "Sleep Habit"),
            field("social_media_presence_id", "Social Media Presence"),
            field("smoking_status", "Smoking Status"),
            field("smoking_tools", "Smoking Tools"),
            field("car_ownership", "Car Ownership"),
            field("hobbies", "Hobbies"),
            field("pets", "Pets"),
        ],
    },
    StepDefinition {
        number: 5,
        title: "Appearance",
        fields: &[
            field("height", "Height"),
            field("weight", "Weight"),
            field("eye_color_id", "Eye Color"),
            field("hair_color_id", "Hair Color"),
            field("skin_color_id", "Skin Color"),
            field("hijab_status", "Hijab"),
            field("children_count", "Number of Children"),
        ],
    },
    StepDefinition {
        number: 6,
        title: "Photos & Contact",
        fields: &[
            field("profile_image", "Profile Photo"),
            field("guardian_contact", "Guardian Contact"),
        ],
    },
];

/// Correspondence between form field names (drafts) and server field names
/// (profile records). Identity mappings are omitted: a form key with no entry
/// here already uses the server name.
pub const FIELD_MAPPING: &[(&str, &str)] = &[
    ("nationality", "nationality_id"),
    ("origin", "origin_id"),
    ("religion", "religion_id"),
    ("country", "country_id"),
    ("city", "city_id"),
    ("education", "educational_level_id"),
    ("specialization", "specialization_id"),
    ("job_title", "job_title_id"),
    ("position_level", "position_level_id"),
    ("financial_status", "financial_status_id"),
    ("marital_status", "marital_status_id"),
    ("housing_status", "housing_status_id"),
    ("marriage_budget", "marriage_budget_id"),
    ("religiosity", "religiosity_level_id"),
    ("sleep_habit", "sleep_habit_id"),
    ("social_media", "social_media_presence_id"),
    ("smoking", "smoking_status"),
    ("car", "car_ownership"),
    ("hijab", "hijab_status"),
    ("employment", "employment_status"),
    ("eye_color", "eye_color_id"),
    ("hair_color", "hair_color_id"),
    ("skin_color", "skin_color_id"),
    ("children", "children_count"),
    ("birth_date", "date_of_birth"),
    ("avatar", "profile_image"),
];

/// Translates a form field name to its server field name, if mapped.
pub fn server_key_for(form_key: &str) -> Option<&'static str> {
    FIELD_MAPPING
        .iter()
        .find(|(form, _)| *form == form_key)
        .map(|(_, server)| *server)
}

/// Translates a server field name back to its form field name, if mapped.
pub fn form_key_for(server_key: &str) -> Option<&'static str> {
    FIELD_MAPPING
        .iter()
        .find(|(_, server)| *server == server_key)
        .map(|(form, _)| *form)
}

/// Total number of tracked fields across all steps.
pub fn total_tracked_fields() -> usize {
    STEPS.iter().map(|s| s.fields.len()).sum()
}
