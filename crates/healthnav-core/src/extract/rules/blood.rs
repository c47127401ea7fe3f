//! Complete blood count report fields.
//!
//! Several anchors are OCR misreadings observed on printed reports rather
//! than the printed label itself. They are kept as-is because they are what
//! the recognizer actually produces for those rows. The printed label follows
//! as a fallback for cleanly recognized reports:
//!
//! | field               | alias keyword | printed label        |
//! |---------------------|---------------|----------------------|
//! | `Basophils`         | `Basophis`    | Basophils            |
//! | `AbsoluteMonocytes` | `oss`         | Absolute Monocytes   |
//! | `Hematocrit`        | `Hematoct`    | Hematocrit           |
//! | `MCV`               | `mov`         | MCV                  |
//! | `MCH`               | `MeH`         | MCH                  |
//! | `MCHC`              | `MeHe`        | MCHC                 |
//! | `RDWCv`             | `ROW-CV`      | RDW-CV               |
//! | `MPV`               | `wey`         | MPV                  |

use lazy_static::lazy_static;

use super::{FieldRule, RuleTable};
use crate::models::report::DocumentKind;

lazy_static! {
    /// Blood report rule table, in report order.
    pub static ref BLOOD_REPORT_RULES: RuleTable = RuleTable::new(
        DocumentKind::BloodReport,
        vec![
            FieldRule::numeric("Haemoglobin", "Haemoglobin"),
            FieldRule::numeric("TotalLeucocyteCount", "Total Leukocyte Count"),
            FieldRule::numeric("Neutrophils", "Neutrophils"),
            FieldRule::numeric("Lymphocytes", "Lymphocytes"),
            FieldRule::numeric("Eosinophils", "Eosinophils"),
            FieldRule::numeric("Monocytes", "Monocytes"),
            FieldRule::numeric("Basophils", "Basophis").or_keyword("Basophils"),
            FieldRule::numeric("AbsoluteNeutrophils", "Absolute Neutrophils"),
            FieldRule::numeric("AbsoluteLymphocytes", "Absolute Lymphocytes"),
            FieldRule::numeric("AbsoluteEosinophils", "Absolute Eosinophils"),
            FieldRule::numeric("AbsoluteMonocytes", "oss").or_keyword("Absolute Monocytes"),
            FieldRule::numeric("AbsoluteBasophils", "Absolute Basophils"),
            FieldRule::numeric("TotalRedBloodCount", "Total Red Blood Count"),
            FieldRule::numeric("Hematocrit", "Hematoct").or_keyword("Hematocrit"),
            FieldRule::numeric("MCV", "mov").or_keyword("MCV"),
            FieldRule::numeric("MCH", "MeH").or_keyword("MCH"),
            FieldRule::numeric("Platelet", "Platelet"),
            FieldRule::numeric("MCHC", "MeHe").or_keyword("MCHC"),
            FieldRule::numeric("RDWCv", "ROW-CV").or_keyword("RDW-CV"),
            FieldRule::numeric("MPV", "wey").or_keyword("MPV"),
        ],
    );
}
