// Mystic Companion - Core Library
// Exposes the generator for the CLI, terminal UI, web server and tests

pub mod birth;
pub mod catalog;
pub mod celestial;
pub mod chat;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod heuristics;
pub mod logging;
pub mod matching;

// Re-export commonly used types
pub use birth::{BirthForm, BirthRecord, MAX_BIRTH_YEAR, MIN_BIRTH_YEAR};
pub use catalog::{Catalog, CompanionArchetype, Tone, CATALOG, CATALOG_VERSION};
pub use celestial::{CelestialApprox, Element, MoonPhase, ZodiacSign};
pub use chat::{
    open_chat, reset_chat, simulate_turn,
    ChatLine, ChatLog, ChatState, Speaker,
};
pub use config::AppConfig;
pub use error::{FieldError, FormField, InputValidationError, ValidationResult};
pub use export::{data_url, export_text, write_export};
pub use generator::{read_birth, CompanionGenerator, Reading, Session};
pub use heuristics::{BioregionTag, ClimateBand, Realm, Vibration};
pub use matching::{CompanionPick, CompanionRole, MatchResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
