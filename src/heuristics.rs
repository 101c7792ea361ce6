// 🧭 Playful Heuristics - bioregion, name vibration, birth tone
// Deliberately arbitrary mappings. The only contract is that each is a
// pure, total function of its inputs.

use crate::catalog::Tone;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ============================================================================
// BIOREGIONAL FOLKLORE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClimateBand {
    Tropical,
    Temperate,
    Boreal,
    Polar,
}

impl ClimateBand {
    pub fn from_latitude(latitude: f64) -> Self {
        let lat = latitude.abs();
        if lat < 15.0 {
            ClimateBand::Tropical
        } else if lat < 45.0 {
            ClimateBand::Temperate
        } else if lat < 66.5 {
            ClimateBand::Boreal
        } else {
            ClimateBand::Polar
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClimateBand::Tropical => "tropical",
            ClimateBand::Temperate => "temperate",
            ClimateBand::Boreal => "boreal",
            ClimateBand::Polar => "polar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FolkloreSector {
    /// -170° .. -30°
    Americas,
    /// -30° .. 60°
    OldWorld,
    /// 60° .. 150°
    Eastern,
    /// Everything across the date line
    Pacific,
}

impl FolkloreSector {
    pub fn from_longitude(longitude: f64) -> Self {
        if (-170.0..-30.0).contains(&longitude) {
            FolkloreSector::Americas
        } else if (-30.0..60.0).contains(&longitude) {
            FolkloreSector::OldWorld
        } else if (60.0..150.0).contains(&longitude) {
            FolkloreSector::Eastern
        } else {
            FolkloreSector::Pacific
        }
    }

    pub fn lore(&self) -> &'static str {
        match self {
            FolkloreSector::Americas => "trickster-trail lore",
            FolkloreSector::OldWorld => "hearth-and-hedgerow lore",
            FolkloreSector::Eastern => "river-and-mountain lore",
            FolkloreSector::Pacific => "tide-and-star-path lore",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BioregionTag {
    pub climate: ClimateBand,
    pub sector: FolkloreSector,
}

impl BioregionTag {
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        BioregionTag {
            climate: ClimateBand::from_latitude(latitude),
            sector: FolkloreSector::from_longitude(longitude),
        }
    }
}

impl std::fmt::Display for BioregionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} · {}", self.climate.as_str(), self.sector.lore())
    }
}

// ============================================================================
// PHONETIC VIBRATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Realm {
    Angelic,
    Animal,
    Spirit,
    Elemental,
}

impl Realm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Realm::Angelic => "angelic",
            Realm::Animal => "animal",
            Realm::Spirit => "spirit",
            Realm::Elemental => "elemental",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Vibration {
    /// 0..=99
    pub score: u8,
    pub vowels: usize,
    pub realm: Realm,
}

/// Pythagorean value of a letter: a=1 .. i=9, j=1 .. and so on
fn letter_value(ch: char) -> u64 {
    ((ch as u64 - 'a' as u64) % 9) + 1
}

/// Name "vibration": letters only, case-insensitive, position-weighted
pub fn phonetic_vibration(name: &str) -> Vibration {
    let mut acc: u64 = 0;
    let mut vowels = 0;

    for (position, ch) in name
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase())
        .enumerate()
    {
        if matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u') {
            vowels += 1;
        }
        acc = (acc * 31 + letter_value(ch) * (position as u64 + 1)) % 10_007;
    }

    let realm = [Realm::Angelic, Realm::Animal, Realm::Spirit, Realm::Elemental][vowels % 4];

    Vibration {
        score: (acc % 100) as u8,
        vowels,
        realm,
    }
}

// ============================================================================
// BIRTH TONE
// ============================================================================

pub fn birth_tone(date: NaiveDate) -> Tone {
    Tone::ALL[((date.day() + date.month()) % 4) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_climate_bands() {
        assert_eq!(ClimateBand::from_latitude(0.0), ClimateBand::Tropical);
        assert_eq!(ClimateBand::from_latitude(-14.9), ClimateBand::Tropical);
        assert_eq!(ClimateBand::from_latitude(15.0), ClimateBand::Temperate);
        assert_eq!(ClimateBand::from_latitude(51.5), ClimateBand::Boreal);
        assert_eq!(ClimateBand::from_latitude(-90.0), ClimateBand::Polar);
    }

    #[test]
    fn test_folklore_sectors() {
        assert_eq!(FolkloreSector::from_longitude(-0.12), FolkloreSector::OldWorld);
        assert_eq!(FolkloreSector::from_longitude(-74.0), FolkloreSector::Americas);
        assert_eq!(FolkloreSector::from_longitude(75.77), FolkloreSector::Eastern);
        assert_eq!(FolkloreSector::from_longitude(180.0), FolkloreSector::Pacific);
        assert_eq!(FolkloreSector::from_longitude(-180.0), FolkloreSector::Pacific);
    }

    #[test]
    fn test_bioregion_tag_text() {
        let tag = BioregionTag::from_coordinates(51.5, -0.12);
        assert_eq!(tag.to_string(), "boreal · hearth-and-hedgerow lore");
    }

    #[test]
    fn test_vibration_bounded_and_stable() {
        for name in ["Ada", "Mahan H R Gowda", "Zoë", "X Æ A-12", "", "🦊🦊"] {
            let first = phonetic_vibration(name);
            assert!(first.score <= 99);
            assert_eq!(first, phonetic_vibration(name));
        }
    }

    #[test]
    fn test_vibration_ignores_case_and_punctuation() {
        assert_eq!(phonetic_vibration("ada"), phonetic_vibration("A.D.A"));
    }

    #[test]
    fn test_vibration_realm_from_vowels() {
        // a, a -> two vowels
        let ada = phonetic_vibration("Ada");
        assert_eq!(ada.vowels, 2);
        assert_eq!(ada.realm, Realm::Spirit);

        let empty = phonetic_vibration("");
        assert_eq!(empty.score, 0);
        assert_eq!(empty.realm, Realm::Angelic);
    }

    #[test]
    fn test_birth_tone_cycles() {
        let date = NaiveDate::from_ymd_opt(1993, 7, 12).unwrap();
        // (12 + 7) % 4 = 3
        assert_eq!(birth_tone(date), Tone::Watery);

        let date = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        assert_eq!(birth_tone(date), Tone::Earthy);
    }
}
