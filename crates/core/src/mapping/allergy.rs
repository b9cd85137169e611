use super::non_empty;
use crate::records::{Allergen, AllergyCategory, AllergyRecord, Criticality, ReactionSeverity};
use hl7::Segment;

const AL1: &str = "AL1";
const ALLERGY_TYPE: usize = 2;
const ALLERGEN: usize = 3;
const SEVERITY: usize = 4;
const REACTION: usize = 5;

/// Source severity code for a severe reaction.
const SEVERE: &str = "SV";

/// Map every allergy segment, in message order.
pub fn map_allergies(segments: &[Segment], subject: &str) -> Vec<AllergyRecord> {
    segments
        .iter()
        .filter(|s| s.is(AL1))
        .map(|al1| {
            let severe = al1.field(SEVERITY).trim() == SEVERE;
            let allergen = non_empty(al1.component(ALLERGEN, 0)).map(|code| Allergen {
                code,
                display: al1.component(ALLERGEN, 1).trim().to_owned(),
            });

            AllergyRecord {
                subject: subject.to_owned(),
                allergen,
                category: AllergyCategory::from_type_code(al1.field(ALLERGY_TYPE).trim()),
                criticality: if severe {
                    Criticality::High
                } else {
                    Criticality::Low
                },
                severity: if severe {
                    ReactionSeverity::Severe
                } else {
                    ReactionSeverity::Moderate
                },
                reaction: al1.field(REACTION).trim().to_owned(),
            }
        })
        .collect()
}
