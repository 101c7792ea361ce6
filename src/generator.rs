// ✨ Heuristic Companion Generator
// Form -> validated record -> sky snapshot -> match -> opening chat.
// Pure apart from logging: same record and seed, same session.

use crate::birth::{BirthForm, BirthRecord};
use crate::catalog::CATALOG;
use crate::celestial::CelestialApprox;
use crate::chat::{open_chat, ChatState};
use crate::error::ValidationResult;
use crate::matching::{match_companion, MatchResult};
use serde::Serialize;
use tracing::info;

/// Everything derived from one birth record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub record: BirthRecord,
    pub sky: CelestialApprox,
    pub matched: MatchResult,
}

/// Sky snapshot plus companion match; no chat, no randomness
pub fn read_birth(record: &BirthRecord) -> Reading {
    let sky = CelestialApprox::from_record(record);
    let matched = match_companion(&CATALOG, record, &sky);

    Reading {
        record: record.clone(),
        sky,
        matched,
    }
}

/// A fresh interactive session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub reading: Reading,
    pub chat: ChatState,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompanionGenerator {
    /// Overrides the per-record flavor seed when set
    pub flavor_seed: Option<u64>,
}

impl CompanionGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        CompanionGenerator {
            flavor_seed: Some(seed),
        }
    }

    pub fn seed_for(&self, record: &BirthRecord) -> u64 {
        self.flavor_seed
            .unwrap_or_else(|| record.default_flavor_seed())
    }

    pub fn generate(&self, record: &BirthRecord) -> Session {
        let reading = read_birth(record);
        let chat = open_chat(&reading, self.seed_for(record));

        info!(
            companion = reading.matched.archetype.id,
            harmony = reading.matched.harmony,
            sun = %reading.sky.sun_sign,
            moon = %reading.sky.moon_sign,
            "reading generated"
        );

        Session { reading, chat }
    }

    /// Validate then generate; validation errors come back per field
    pub fn generate_from_form(&self, form: &BirthForm) -> ValidationResult<Session> {
        let record = form.validate()?;
        Ok(self.generate(&record))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputValidationError;
    use chrono::{NaiveDate, NaiveTime};

    fn ada() -> BirthRecord {
        BirthRecord::new(
            "Ada",
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            51.5,
            -0.12,
        )
        .unwrap()
    }

    #[test]
    fn test_ada_example() {
        let session = CompanionGenerator::new().generate(&ada());

        assert!(session.reading.matched.harmony <= 100);
        assert!(!session.chat.log.is_empty());
        assert_eq!(session.chat.seed, 1992);
        assert_eq!(session, CompanionGenerator::new().generate(&ada()));
    }

    #[test]
    fn test_invariants_hold_across_inputs() {
        let names = ["Ada", "Mahan H R Gowda", "Li", "Zephyrine Q."];
        let coords = [(0.0, 0.0), (90.0, 180.0), (-90.0, -180.0), (13.32, 75.77), (-33.9, 151.2)];

        for year in (1900..=2100).step_by(13) {
            for (month, hour) in [(1, 0), (4, 6), (7, 12), (10, 23)] {
                let date = NaiveDate::from_ymd_opt(year, month, 28).unwrap();
                let time = NaiveTime::from_hms_opt(hour, 59, 0).unwrap();
                for name in names {
                    for (lat, lon) in coords {
                        let record = BirthRecord::new(name, date, time, lat, lon).unwrap();
                        let reading = read_birth(&record);

                        assert!((0.0..360.0).contains(&reading.sky.sun_longitude));
                        assert!((0.0..360.0).contains(&reading.sky.moon_longitude));
                        assert!((0.0..=1.0).contains(&reading.sky.moon_illumination));
                        assert!(reading.matched.harmony <= 100);
                        assert_eq!(reading, read_birth(&record));
                    }
                }
            }
        }
    }

    #[test]
    fn test_seed_override() {
        let record = ada();
        let session = CompanionGenerator::with_seed(42).generate(&record);
        assert_eq!(session.chat.seed, 42);
        // The match itself does not depend on the seed
        assert_eq!(session.reading, CompanionGenerator::new().generate(&record).reading);
    }

    #[test]
    fn test_generate_from_form_rejects_bad_year() {
        let form = BirthForm {
            birth_date: "1850-06-01".to_string(),
            ..BirthForm::default()
        };
        let errors = CompanionGenerator::new().generate_from_form(&form).unwrap_err();
        assert!(matches!(errors[0], InputValidationError::YearOutOfRange { .. }));
    }
}
