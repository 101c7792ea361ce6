// 🔮 Companion Matching - score every archetype, pick the best
// Signals: Sun/Moon sign elements, name vibration, climate band, birth tone.
// Ties go to the archetype listed first in the catalog.

use crate::birth::BirthRecord;
use crate::catalog::{Catalog, CompanionArchetype, Tone};
use crate::celestial::{CelestialApprox, Element, MoonPhase};
use crate::heuristics::{birth_tone, phonetic_vibration, BioregionTag, ClimateBand, Vibration};
use serde::Serialize;
use tracing::debug;

// ============================================================================
// SCORING
// ============================================================================

pub const SUN_ELEMENT_WEIGHT: u8 = 4;
pub const MOON_ELEMENT_WEIGHT: u8 = 2;
pub const VIBRATION_WEIGHT: u8 = 3;
pub const CLIMATE_WEIGHT: u8 = 1;
pub const TONE_WEIGHT: u8 = 1;

/// Inputs the matcher reads, already bucketed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchSignals {
    pub sun_element: Element,
    pub moon_element: Element,
    pub vibration: u8,
    pub climate: ClimateBand,
    pub tone: Tone,
}

pub fn archetype_score(archetype: &CompanionArchetype, signals: &MatchSignals) -> u8 {
    let mut score = 0;
    if archetype.element == signals.sun_element {
        score += SUN_ELEMENT_WEIGHT;
    }
    if archetype.element == signals.moon_element {
        score += MOON_ELEMENT_WEIGHT;
    }
    if archetype.resonates_with(signals.vibration) {
        score += VIBRATION_WEIGHT;
    }
    if archetype.at_home_in(signals.climate) {
        score += CLIMATE_WEIGHT;
    }
    if archetype.voice == signals.tone {
        score += TONE_WEIGHT;
    }
    score
}

/// Index and score of the best archetype among `candidates`, or None when empty.
/// Strictly-greater comparison keeps the earliest catalog entry on ties.
fn best_of<'a, I>(candidates: I, signals: &MatchSignals) -> Option<(usize, u8)>
where
    I: Iterator<Item = (usize, &'a CompanionArchetype)>,
{
    let mut best: Option<(usize, u8)> = None;
    for (index, archetype) in candidates {
        let score = archetype_score(archetype, signals);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best
}

/// Selection index over the whole catalog
pub fn select_archetype(catalog: &Catalog, signals: &MatchSignals) -> (usize, u8) {
    best_of(catalog.archetypes.iter().enumerate(), signals).unwrap_or((0, 0))
}

// ============================================================================
// HARMONY METER
// ============================================================================

/// How much each phase lifts the meter, 0.0-1.0
pub fn phase_weight(phase: MoonPhase) -> f64 {
    match phase {
        MoonPhase::NewMoon => 0.30,
        MoonPhase::WaxingCrescent => 0.55,
        MoonPhase::FirstQuarter => 0.70,
        MoonPhase::WaxingGibbous => 0.85,
        MoonPhase::FullMoon => 1.0,
        MoonPhase::WaningGibbous => 0.80,
        MoonPhase::LastQuarter => 0.60,
        MoonPhase::WaningCrescent => 0.45,
    }
}

/// 0-100: mostly illumination, nudged by phase
pub fn harmony_score(illumination: f64, phase: MoonPhase) -> u8 {
    let illumination = if illumination.is_finite() {
        illumination.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let raw = 70.0 * illumination + 30.0 * phase_weight(phase);
    raw.round().clamp(0.0, 100.0) as u8
}

// ============================================================================
// MATCH RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompanionRole {
    #[serde(rename = "Primary Familiar")]
    PrimaryFamiliar,
    Guardian,
    Whisperer,
}

impl CompanionRole {
    pub fn title(&self) -> &'static str {
        match self {
            CompanionRole::PrimaryFamiliar => "Primary Familiar",
            CompanionRole::Guardian => "Guardian",
            CompanionRole::Whisperer => "Whisperer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanionPick {
    pub role: CompanionRole,
    pub archetype: &'static CompanionArchetype,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub archetype: &'static CompanionArchetype,
    pub selection_index: usize,
    pub match_score: u8,
    /// 0..=100
    pub harmony: u8,
    pub folklore_tag: String,
    pub bioregion: BioregionTag,
    pub vibration: Vibration,
    pub tone: Tone,
    pub signals: MatchSignals,
    /// Primary Familiar, Guardian, Whisperer - always three distinct companions
    pub gallery: Vec<CompanionPick>,
}

impl MatchResult {
    pub fn companion(&self, role: CompanionRole) -> Option<&CompanionPick> {
        self.gallery.iter().find(|p| p.role == role)
    }
}

pub fn match_companion(
    catalog: &'static Catalog,
    record: &BirthRecord,
    sky: &CelestialApprox,
) -> MatchResult {
    let vibration = phonetic_vibration(record.name());
    let bioregion = BioregionTag::from_coordinates(record.latitude(), record.longitude());
    let tone = birth_tone(record.birth_date());

    let signals = MatchSignals {
        sun_element: sky.sun_sign.element(),
        moon_element: sky.moon_sign.element(),
        vibration: vibration.score,
        climate: bioregion.climate,
        tone,
    };

    let (selection_index, match_score) = select_archetype(catalog, &signals);
    let primary = &catalog.archetypes[selection_index];

    let guardian_index = best_of(
        catalog
            .by_element(signals.moon_element)
            .filter(|(i, _)| *i != selection_index),
        &signals,
    )
    .map(|(i, _)| i)
    .unwrap_or((selection_index + 1) % catalog.len());

    let whisperer_index = whisperer_index(catalog.len(), vibration.score, &[selection_index, guardian_index]);

    let gallery = vec![
        CompanionPick {
            role: CompanionRole::PrimaryFamiliar,
            archetype: primary,
            reason: format!(
                "Born under {} ({})",
                sky.sun_sign,
                signals.sun_element.as_str()
            ),
        },
        CompanionPick {
            role: CompanionRole::Guardian,
            archetype: &catalog.archetypes[guardian_index],
            reason: format!(
                "Moon in {} ({})",
                sky.moon_sign,
                signals.moon_element.as_str()
            ),
        },
        CompanionPick {
            role: CompanionRole::Whisperer,
            archetype: &catalog.archetypes[whisperer_index],
            reason: format!(
                "Phonetic vibe: {} ({}), bioregion: {}",
                vibration.realm.as_str(),
                vibration.score,
                bioregion
            ),
        },
    ];

    let harmony = harmony_score(sky.moon_illumination, sky.moon_phase);

    debug!(
        archetype = primary.id,
        score = match_score,
        harmony,
        "companion matched"
    );

    MatchResult {
        archetype: primary,
        selection_index,
        match_score,
        harmony,
        folklore_tag: bioregion.to_string(),
        bioregion,
        vibration,
        tone,
        signals,
        gallery,
    }
}

/// Vibration-indexed pick, stepping forward past companions already shown
fn whisperer_index(len: usize, vibration: u8, taken: &[usize]) -> usize {
    let mut index = vibration as usize % len;
    for _ in 0..len {
        if !taken.contains(&index) {
            break;
        }
        index = (index + 1) % len;
    }
    index
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CATALOG;
    use chrono::{NaiveDate, NaiveTime};

    fn signals(sun: Element, moon: Element, vibration: u8) -> MatchSignals {
        MatchSignals {
            sun_element: sun,
            moon_element: moon,
            vibration,
            climate: ClimateBand::Temperate,
            tone: Tone::Fiery,
        }
    }

    fn record(name: &str, y: i32, m: u32, d: u32, lat: f64, lon: f64) -> BirthRecord {
        BirthRecord::new(
            name,
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            lat,
            lon,
        )
        .unwrap()
    }

    #[test]
    fn test_score_weights() {
        let phoenix = CATALOG.get("phoenix").unwrap();
        // fire sun + fire moon + vibration 10 in range + temperate + fiery voice
        assert_eq!(archetype_score(phoenix, &signals(Element::Fire, Element::Fire, 10)), 11);
        // nothing lines up except climate
        let mut s = signals(Element::Water, Element::Air, 80);
        s.tone = Tone::Airy;
        assert_eq!(archetype_score(phoenix, &s), CLIMATE_WEIGHT);
    }

    #[test]
    fn test_sun_element_dominates() {
        let (index, _) = select_archetype(&CATALOG, &signals(Element::Water, Element::Earth, 50));
        assert_eq!(CATALOG.archetypes[index].element, Element::Water);
    }

    #[test]
    fn test_ties_break_by_catalog_order() {
        // Earth sun, vibration 35 sits in both Tortoise (0-39) and Stag (30-69);
        // both are at home in temperate lands. Stag comes first.
        let s = MatchSignals {
            sun_element: Element::Earth,
            moon_element: Element::Fire,
            vibration: 35,
            climate: ClimateBand::Temperate,
            tone: Tone::Fiery,
        };
        let (index, score) = select_archetype(&CATALOG, &s);
        assert_eq!(CATALOG.archetypes[index].id, "stag");
        assert_eq!(score, SUN_ELEMENT_WEIGHT + VIBRATION_WEIGHT + CLIMATE_WEIGHT);
    }

    #[test]
    fn test_harmony_bounds() {
        for phase in MoonPhase::ALL {
            for step in 0..=20 {
                let h = harmony_score(step as f64 / 20.0, phase);
                assert!(h <= 100);
            }
        }
        assert_eq!(harmony_score(1.0, MoonPhase::FullMoon), 100);
        assert_eq!(harmony_score(0.0, MoonPhase::NewMoon), 9);
        assert_eq!(harmony_score(f64::NAN, MoonPhase::NewMoon), 9);
        assert_eq!(harmony_score(7.0, MoonPhase::FullMoon), 100);
    }

    #[test]
    fn test_gallery_is_three_distinct_companions() {
        for (name, lat, lon) in [("Ada", 51.5, -0.12), ("Mahan H R Gowda", 13.32, 75.77), ("Ō", -78.0, 166.0)] {
            for month in 1..=12 {
                let r = record(name, 1990, month, 15, lat, lon);
                let sky = CelestialApprox::from_record(&r);
                let result = match_companion(&CATALOG, &r, &sky);

                assert_eq!(result.gallery.len(), 3);
                let ids: Vec<&str> = result.gallery.iter().map(|p| p.archetype.id).collect();
                assert!(ids[0] != ids[1] && ids[1] != ids[2] && ids[0] != ids[2], "{:?}", ids);

                let guardian = result.companion(CompanionRole::Guardian).unwrap();
                assert_eq!(guardian.archetype.element, sky.moon_sign.element());
                assert_eq!(result.archetype.id, ids[0]);
            }
        }
    }

    #[test]
    fn test_match_is_deterministic() {
        let r = record("Ada", 1990, 1, 1, 51.5, -0.12);
        let sky = CelestialApprox::from_record(&r);

        let first = match_companion(&CATALOG, &r, &sky);
        let second = match_companion(&CATALOG, &r, &sky);
        assert_eq!(first, second);
        assert_eq!(first.folklore_tag, "boreal · hearth-and-hedgerow lore");
    }

    #[test]
    fn test_whisperer_skips_taken() {
        assert_eq!(whisperer_index(12, 14, &[2, 3]), 4);
        assert_eq!(whisperer_index(12, 11, &[11, 0]), 1);
        assert_eq!(whisperer_index(12, 5, &[0, 1]), 5);
    }

    #[test]
    fn test_roles_serialize_as_titles() {
        for role in [CompanionRole::PrimaryFamiliar, CompanionRole::Guardian, CompanionRole::Whisperer] {
            assert_eq!(serde_json::to_value(role).unwrap(), role.title());
        }
    }
}
