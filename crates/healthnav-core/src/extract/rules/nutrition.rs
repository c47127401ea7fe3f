//! Nutrition facts label fields.

use lazy_static::lazy_static;

use super::{FieldRule, RuleTable};
use crate::models::report::DocumentKind;

lazy_static! {
    /// Nutrition label rule table, in label order.
    pub static ref NUTRITION_LABEL_RULES: RuleTable = RuleTable::new(
        DocumentKind::NutritionLabel,
        vec![
            FieldRule::numeric("calories", "Amount per serving").or_keyword("Calories"),
            FieldRule::measured("totalFat", "Total Fat", "g"),
            FieldRule::measured("saturatedFat", "Saturated Fat", "g"),
            FieldRule::measured("transFat", "Trans Fat", "g"),
            FieldRule::measured("cholesterol", "Cholesterol", "mg"),
            FieldRule::measured("sodium", "Sodium", "mg"),
            FieldRule::measured("totalCarbohydrate", "Total Carbohydrate", "g"),
            FieldRule::measured("dietaryFiber", "Dietary Fiber", "g"),
            FieldRule::measured("sugar", "Sugars", "g").or_keyword("Sugar"),
            FieldRule::measured("protein", "Protein", "g"),
        ],
    );
}
