//! User profile collected by the health questionnaire.

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// Sentinel answer for "no conditions" / "no family history".
pub const NONE: &str = "None";

pub const AGE_GROUPS: &[&str] = &["18-25", "26-35", "36-45", "46-60", "60+"];

pub const GENDERS: &[&str] = &["Male", "Female", "Other", "Prefer not to say"];

pub const ACTIVITY_LEVELS: &[&str] = &[
    "Sedentary (Mostly sitting)",
    "Lightly active (1-2 times/week exercise)",
    "Moderately active (3-5 times/week)",
    "Very active (Daily workouts or physical work)",
];

pub const DIETS: &[&str] = &["Vegetarian", "Non-Vegetarian", "Vegan", "Eggetarian", "Other"];

/// Glasses of water per day.
pub const WATER_INTAKE: &[&str] = &["< 4", "4-6", "7-9", "10+"];

pub const SLEEP_HOURS: &[&str] = &["< 5 hours", "5-6 hours", "7-8 hours", "9+ hours"];

/// Answers for the smoking and alcohol questions.
pub const HABIT_FREQUENCIES: &[&str] = &["Yes, regularly", "Occasionally", "No"];

pub const CONDITIONS: &[&str] = &[
    "Diabetes",
    "Hypertension",
    "Thyroid Disorder",
    "Heart Disease",
    "PCOS / PCOD",
    NONE,
];

pub const FAMILY_HISTORY: &[&str] = &["Diabetes", "Heart Disease", "Cancer", "Hypertension", NONE];

pub const CHECKUP_FREQUENCIES: &[&str] =
    &["Every 6 months", "Once a year", "Only when needed", "Rarely / Never"];

pub const GOALS: &[&str] = &[
    "Lose weight",
    "Gain muscle",
    "Maintain general wellness",
    "Improve sleep",
    "Manage stress",
    "Track chronic conditions",
];

/// Questionnaire answers for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub full_name: String,
    pub age_group: String,
    pub gender: String,
    /// Free text, e.g. "175 cm" or "5' 9inch".
    pub height: String,
    /// Free text, e.g. "70 kg".
    pub weight: String,
    pub activity_level: String,
    pub diet: String,
    pub water_intake: String,
    pub smoke: String,
    pub alcohol: String,
    pub sleep_hours: String,
    pub conditions: Vec<String>,
    pub medications: String,
    pub family_history: Vec<String>,
    pub checkup_frequency: String,
    pub goals: Vec<String>,
    pub consent: bool,
}

impl Default for UserProfile {
    /// Initial questionnaire answers.
    fn default() -> Self {
        Self {
            full_name: String::new(),
            age_group: "18-25".to_string(),
            gender: "Male".to_string(),
            height: String::new(),
            weight: String::new(),
            activity_level: ACTIVITY_LEVELS[0].to_string(),
            diet: "Vegetarian".to_string(),
            water_intake: "4-6".to_string(),
            smoke: "No".to_string(),
            alcohol: "No".to_string(),
            sleep_hours: "7-8 hours".to_string(),
            conditions: vec![NONE.to_string()],
            medications: String::new(),
            family_history: vec![NONE.to_string()],
            checkup_frequency: "Once a year".to_string(),
            goals: Vec::new(),
            consent: false,
        }
    }
}

impl UserProfile {
    /// Check that the profile can be saved.
    ///
    /// Consent is mandatory. Select answers must come from their option
    /// lists; an empty select answer counts as unanswered and is accepted.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !self.consent {
            return Err(ProfileError::ConsentRequired);
        }

        let selects: [(&str, &str, &[&str]); 8] = [
            ("ageGroup", self.age_group.as_str(), AGE_GROUPS),
            ("gender", self.gender.as_str(), GENDERS),
            ("activityLevel", self.activity_level.as_str(), ACTIVITY_LEVELS),
            ("diet", self.diet.as_str(), DIETS),
            ("waterIntake", self.water_intake.as_str(), WATER_INTAKE),
            ("sleepHours", self.sleep_hours.as_str(), SLEEP_HOURS),
            ("smoke", self.smoke.as_str(), HABIT_FREQUENCIES),
            ("alcohol", self.alcohol.as_str(), HABIT_FREQUENCIES),
        ];
        for (field, value, options) in selects {
            check_option(field, value, options)?;
        }
        check_option("checkupFrequency", &self.checkup_frequency, CHECKUP_FREQUENCIES)?;

        for value in &self.conditions {
            check_option("conditions", value, CONDITIONS)?;
        }
        for value in &self.family_history {
            check_option("familyHistory", value, FAMILY_HISTORY)?;
        }
        for value in &self.goals {
            check_option("goals", value, GOALS)?;
        }

        Ok(())
    }

    /// Conditions and goals for prompt context.
    pub fn context(&self) -> UserContext {
        UserContext::new(self.conditions.clone(), self.goals.clone())
    }
}

fn check_option(field: &str, value: &str, options: &[&str]) -> Result<(), ProfileError> {
    if value.is_empty() || options.contains(&value) {
        Ok(())
    } else {
        Err(ProfileError::InvalidOption {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

/// Check or uncheck `value` in a list where [`NONE`] excludes every other answer.
///
/// Checking `None` leaves only `None`; checking anything else drops `None`;
/// unchecking the last answer falls back to `None`.
pub fn toggle_exclusive(list: &mut Vec<String>, value: &str, checked: bool) {
    if checked {
        if value == NONE {
            list.clear();
        } else {
            list.retain(|v| v != NONE);
        }
        list.push(value.to_string());
    } else {
        list.retain(|v| v != value);
        if list.is_empty() {
            list.push(NONE.to_string());
        }
    }
    dedup_keep_order(list);
}

/// Check or uncheck `value` in a plain multi-select list.
pub fn toggle(list: &mut Vec<String>, value: &str, checked: bool) {
    if checked {
        list.push(value.to_string());
        dedup_keep_order(list);
    } else {
        list.retain(|v| v != value);
    }
}

fn dedup_keep_order(list: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    list.retain(|v| seen.insert(v.clone()));
}

/// Health context attached to assistant prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserContext {
    pub conditions: Vec<String>,
    pub goals: Vec<String>,
}

impl UserContext {
    /// Build a context; blank entries and the `None` sentinel are dropped.
    pub fn new(conditions: Vec<String>, goals: Vec<String>) -> Self {
        let keep = |v: &String| {
            let v = v.trim();
            !v.is_empty() && v != NONE
        };
        Self {
            conditions: conditions.into_iter().filter(keep).collect(),
            goals: goals.into_iter().filter(keep).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.goals.is_empty()
    }
}
