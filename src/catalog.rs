// 📚 Companion Catalog - Archetypes as Data
// Static, versioned tables: the twelve companions, and the phrase pools
// each voice speaks from. Logic never inlines these literals.

use crate::celestial::Element;
use crate::heuristics::ClimateBand;
use crate::heuristics::ClimateBand::{Boreal, Polar, Temperate, Tropical};
use serde::{Deserialize, Serialize};

/// Bump whenever an archetype, range or phrase changes
pub const CATALOG_VERSION: &str = "2024.1";

// ============================================================================
// VOICE TONE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    Fiery,
    Airy,
    Earthy,
    Watery,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Fiery, Tone::Airy, Tone::Earthy, Tone::Watery];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Fiery => "fiery",
            Tone::Airy => "airy",
            Tone::Earthy => "earthy",
            Tone::Watery => "watery",
        }
    }
}

// ============================================================================
// ARCHETYPE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanionArchetype {
    /// Stable identifier, never reused
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    /// Persona line shown on the companion card
    pub description: &'static str,
    pub element: Element,
    /// Which phrase pool the companion speaks from
    pub voice: Tone,
    /// Inclusive vibration range this companion resonates with (0-99)
    pub vibration_min: u8,
    pub vibration_max: u8,
    /// Climate bands whose folklore features this companion
    pub climates: &'static [ClimateBand],
    /// Inline SVG placeholder portrait
    pub illustration: &'static str,
}

impl CompanionArchetype {
    /// "Phoenix 🔥" - how the companion signs its chat lines
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.emoji)
    }

    pub fn resonates_with(&self, vibration: u8) -> bool {
        (self.vibration_min..=self.vibration_max).contains(&vibration)
    }

    pub fn at_home_in(&self, climate: ClimateBand) -> bool {
        self.climates.contains(&climate)
    }
}

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug, Serialize)]
pub struct Catalog {
    pub version: &'static str,
    pub archetypes: &'static [CompanionArchetype],
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&'static CompanionArchetype> {
        self.archetypes.iter().find(|a| a.id == id)
    }

    /// Archetypes of one element, in catalog order
    pub fn by_element(&self, element: Element) -> impl Iterator<Item = (usize, &'static CompanionArchetype)> {
        let archetypes: &'static [CompanionArchetype] = self.archetypes;
        archetypes
            .iter()
            .enumerate()
            .filter(move |(_, a)| a.element == element)
    }

    pub fn phrases(&self, tone: Tone) -> &'static [&'static str] {
        match tone {
            Tone::Fiery => FIERY_PHRASES,
            Tone::Airy => AIRY_PHRASES,
            Tone::Earthy => EARTHY_PHRASES,
            Tone::Watery => WATERY_PHRASES,
        }
    }
}

pub static CATALOG: Catalog = Catalog {
    version: CATALOG_VERSION,
    archetypes: ARCHETYPES,
};

const ARCHETYPES: &[CompanionArchetype] = &[
    // Fire
    CompanionArchetype {
        id: "phoenix",
        name: "Phoenix",
        emoji: "🔥",
        description: "Wise and reborn, offering guidance on transformation.",
        element: Element::Fire,
        voice: Tone::Fiery,
        vibration_min: 0,
        vibration_max: 39,
        climates: &[Tropical, Temperate],
        illustration: r#"<svg width="100" height="100" viewBox="0 0 100 100"><path d="M50 10 L70 40 L90 30 L70 60 L80 90 L50 70 L20 90 L30 60 L10 30 L30 40 Z" fill="orange" stroke="red"/><circle cx="50" cy="20" r="5" fill="yellow"/></svg>"#,
    },
    CompanionArchetype {
        id: "dragon",
        name: "Dragon",
        emoji: "🐉",
        description: "Fierce protector, sharing secrets of power.",
        element: Element::Fire,
        voice: Tone::Fiery,
        vibration_min: 30,
        vibration_max: 69,
        climates: &[Temperate, Boreal],
        illustration: r#"<svg width="100" height="100" viewBox="0 0 100 100"><path d="M20 50 Q40 20 60 50 Q80 80 100 50" fill="none" stroke="green" stroke-width="5"/><polygon points="100,50 90,40 90,60" fill="green"/><circle cx="20" cy="50" r="10" fill="red"/></svg>"#,
    },
    CompanionArchetype {
        id: "salamander",
        name: "Salamander",
        emoji: "🦎",
        description: "Playful fire spirit, igniting creativity.",
        element: Element::Fire,
        voice: Tone::Fiery,
        vibration_min: 60,
        vibration_max: 99,
        climates: &[Tropical],
        illustration: r#"<svg width="100" height="100" viewBox="0 0 100 100"><rect x="20" y="40" width="60" height="20" rx="10" fill="orange"/><circle cx="20" cy="50" r="10" fill="orange"/><line x1="80" y1="50" x2="100" y2="50" stroke="orange" stroke-width="5"/></svg>"#,
    },
    // Earth
    CompanionArchetype {
        id: "wolf",
        name: "Wolf",
        emoji: "🐺",
        description: "Loyal pack leader, teaching unity and instinct.",
        element: Element::Earth,
        voice: Tone::Earthy,
        vibration_min: 60,
        vibration_max: 99,
        climates: &[Boreal, Polar],
        illustration: r#"<svg width="100" height="100" viewBox="0 0 100 100"><polygon points="50,20 30,40 20,60 30,80 50,100 70,80 80,60 70,40" fill="gray"/><circle cx="40" cy="30" r="3" fill="black"/><circle cx="60" cy="30" r="3" fill="black"/></svg>"#,
    },
    CompanionArchetype {
        id: "stag",
        name: "Stag",
        emoji: "🦌",
        description: "Graceful wanderer, guiding through forests of life.",
        element: Element::Earth,
        voice: Tone::Earthy,
        vibration_min: 30,
        vibration_max: 69,
        climates: &[Temperate, Boreal],
        illustration: r#"<svg width="100" height="100" viewBox="0 0 100 100"><rect x="40" y="40" width="20" height="40" fill="brown"/><circle cx="50" cy="30" r="10" fill="brown"/><path d="M40 20 L30 0 L20 10 M60 20 L70 0 L80 10" fill="none" stroke="brown" stroke-width="5"/></svg>"#,
    },
    CompanionArchetype {
        id: "tortoise",
        name: "Tortoise",
        emoji: "🐢",
        description: "Patient sage, emphasizing endurance.",
        element: Element::Earth,
        voice: Tone::Earthy,
        vibration_min: 0,
        vibration_max: 39,
        climates: &[Tropical, Temperate],
        illustration: r#"<svg width="100" height="100" viewBox="0 0 100 100"><ellipse cx="50" cy="50" rx="40" ry="30" fill="green"/><circle cx="20" cy="50" r="10" fill="green"/></svg>"#,
    },
    // Air
    CompanionArchetype {
        id: "raven",
        name: "Raven",
        emoji: "🪶",
        description: "Mysterious messenger, revealing hidden truths.",
        element: Element::Air,
        voice: Tone::Airy,
        vibration_min: 0,
        vibration_max: 39,
        climates: &[Boreal, Polar],
        illustration: r#"<svg width="100" height="100" viewBox="0 0 100 100"><polygon points="50,20 20,50 50,80 80,50" fill="black"/><circle cx="50" cy="30" r="5" fill="white"/></svg>"#,
    },
    CompanionArchetype {
        id: "hawk",
        name: "Hawk",
        emoji: "🦅",
        description: "Sharp visionary, helping focus on goals.",
        element: Element::Air,
        voice: Tone::Airy,
        vibration_min: 60,
        vibration_max: 99,
        climates: &[Temperate],
        illustration: r#"<svg width="100" height="100" viewBox="0 0 100 100"><path d="M20 50 L50 20 L80 50" fill="brown"/><path d="M10 60 L50 80 L90 60" fill="brown"/><circle cx="50" cy="40" r="5" fill="yellow"/></svg>"#,
    },
    CompanionArchetype {
        id: "sphinx",
        name: "Sphinx",
        emoji: "🦁",
        description: "Enigmatic riddle-master, sparking intellect.",
        element: Element::Air,
        voice: Tone::Airy,
        vibration_min: 30,
        vibration_max: 69,
        climates: &[Tropical],
        illustration: r#"<svg width="100" height="100" viewBox="0 0 100 100"><rect x="20" y="50" width="60" height="30" fill="gold"/><circle cx="20" cy="40" r="10" fill="gold"/></svg>"#,
    },
    // Water
    CompanionArchetype {
        id: "otter",
        name: "Otter",
        emoji: "🦦",
        description: "Joyful swimmer, promoting play and adaptability.",
        element: Element::Water,
        voice: Tone::Watery,
        vibration_min: 30,
        vibration_max: 69,
        climates: &[Temperate, Boreal],
        illustration: r#"<svg width="100" height="100" viewBox="0 0 100 100"><ellipse cx="50" cy="50" rx="30" ry="15" fill="brown"/><circle cx="80" cy="50" r="10" fill="brown"/></svg>"#,
    },
    CompanionArchetype {
        id: "koi",
        name: "Koi",
        emoji: "🐟",
        description: "Resilient fish, symbolizing perseverance.",
        element: Element::Water,
        voice: Tone::Watery,
        vibration_min: 0,
        vibration_max: 39,
        climates: &[Tropical, Temperate],
        illustration: r#"<svg width="100" height="100" viewBox="0 0 100 100"><path d="M20 50 Q50 30 80 50 Q50 70 20 50" fill="orange"/><circle cx="80" cy="50" r="5" fill="black"/></svg>"#,
    },
    CompanionArchetype {
        id: "selkie",
        name: "Selkie",
        emoji: "🦭",
        description: "Shape-shifting seal, exploring emotions.",
        element: Element::Water,
        voice: Tone::Watery,
        vibration_min: 60,
        vibration_max: 99,
        climates: &[Boreal, Polar],
        illustration: r#"<svg width="100" height="100" viewBox="0 0 100 100"><circle cx="50" cy="30" r="10" fill="blue"/><path d="M40 40 L50 100 L60 40" fill="blue"/></svg>"#,
    },
];

// ============================================================================
// PHRASE POOLS
// ============================================================================

const FIERY_PHRASES: &[&str] = &[
    "Rise and blaze: start that streak you've been thinking of. 🔥",
    "Spark, don't scorch. Channel your heat into clean action. 🔥",
    "A bold first step wins more than a perfect plan. 🚀",
    "Ignite your passion and let it guide you through the day. 🌟",
    "Embrace the fire within; it's your greatest ally. 🛡️",
];

const AIRY_PHRASES: &[&str] = &[
    "Playful curiosity will find you better doors today. 🌬️",
    "Breeze through clutter; ideas thrive in open spaces. 💨",
    "Share one story and you'll find the thread you need. 🧵",
    "Let your thoughts soar like the wind. 🕊️",
    "Connect the dots with a light-hearted approach. 🔗",
];

const EARTHY_PHRASES: &[&str] = &[
    "Small steady work adds up. Plant one seed today. 🌱",
    "Organize a single corner of your life and watch momentum grow. 🪴",
    "Trust the slow, quiet progress underfoot. 🪨",
    "Ground yourself in nature's rhythm. 🌳",
    "Build foundations that last a lifetime. 🏰",
];

const WATERY_PHRASES: &[&str] = &[
    "Feel before you speak; your subtlety is your strength. 🌊",
    "Let intuition polish the edges of a choice tonight. 🌕",
    "A humane touch heals where logic cannot. 🤲",
    "Flow with the currents of emotion. 🌀",
    "Dive deep into your inner wisdom. 🐚",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_shape() {
        assert_eq!(CATALOG.len(), 12);
        assert_eq!(CATALOG.version, CATALOG_VERSION);

        let ids: HashSet<&str> = CATALOG.archetypes.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), CATALOG.len(), "archetype ids must be unique");

        for element in [Element::Fire, Element::Earth, Element::Air, Element::Water] {
            assert_eq!(CATALOG.by_element(element).count(), 3);
        }
    }

    #[test]
    fn test_every_vibration_has_a_companion_per_element() {
        for element in [Element::Fire, Element::Earth, Element::Air, Element::Water] {
            for vibration in 0..=99u8 {
                assert!(
                    CATALOG.by_element(element).any(|(_, a)| a.resonates_with(vibration)),
                    "{:?} has no companion for vibration {}",
                    element,
                    vibration
                );
            }
        }
    }

    #[test]
    fn test_ranges_and_assets_well_formed() {
        for archetype in CATALOG.archetypes {
            assert!(archetype.vibration_min <= archetype.vibration_max);
            assert!(archetype.vibration_max <= 99);
            assert!(!archetype.climates.is_empty());
            assert!(archetype.illustration.starts_with("<svg"));
        }
    }

    #[test]
    fn test_phrase_pools_non_empty() {
        for tone in Tone::ALL {
            assert!(!CATALOG.phrases(tone).is_empty());
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let koi = CATALOG.get("koi").unwrap();
        assert_eq!(koi.display_name(), "Koi 🐟");
        assert!(CATALOG.get("unicorn").is_none());
    }
}
