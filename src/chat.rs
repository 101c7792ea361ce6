// 💬 Chat Simulation - templated companion replies
// Session state is an explicit value: every operation takes a ChatState and
// returns the next one. Flavor choices come from a ChaCha RNG derived from
// (seed, turn), so the same seed always replays the same conversation.

use crate::catalog::{CompanionArchetype, CATALOG};
use crate::generator::Reading;
use crate::matching::CompanionRole;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// CHAT LOG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Speaker {
    You,
    Companion(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLine {
    pub speaker: Speaker,
    pub text: String,
}

impl ChatLine {
    pub fn is_user(&self) -> bool {
        self.speaker == Speaker::You
    }
}

impl std::fmt::Display for ChatLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.speaker {
            Speaker::You => write!(f, "You: {}", self.text),
            Speaker::Companion(name) => write!(f, "{}: {}", name, self.text),
        }
    }
}

/// Ordered narrative lines for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLog {
    lines: Vec<ChatLine>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: ChatLine) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[ChatLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Each line as displayed: "Speaker: text"
    pub fn rendered(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.to_string()).collect()
    }
}

// ============================================================================
// SESSION STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatState {
    pub seed: u64,
    /// Completed user turns
    pub turns: u32,
    pub log: ChatLog,
}

const GREETINGS: &[&str] = &["Hello {name}!", "Greetings, {name}.", "{name}, I hear you."];

const QUESTION_NODS: &[&str] = &[
    "You ask, and the sky leans closer.",
    "A fair question under this moon.",
    "Questions are lanterns. Keep carrying yours.",
];

/// RNG for one turn; distinct turns get unrelated streams
fn turn_rng(seed: u64, turn: u32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed ^ (turn as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn speaker_for(archetype: &CompanionArchetype) -> Speaker {
    Speaker::Companion(archetype.display_name())
}

/// Opening line from the Primary Familiar; no randomness involved
pub fn opening_line(reading: &Reading) -> ChatLine {
    let primary = reading.matched.archetype;
    ChatLine {
        speaker: speaker_for(primary),
        text: format!(
            "I am your {}, {}. {} Our harmony stands at {}% beneath a {} {}",
            CompanionRole::PrimaryFamiliar.title(),
            reading.record.first_name(),
            primary.description,
            reading.matched.harmony,
            reading.sky.moon_phase.label(),
            reading.sky.moon_phase.emoji(),
        ),
    }
}

/// Start a session: a log holding just the opening line
pub fn open_chat(reading: &Reading, seed: u64) -> ChatState {
    let mut log = ChatLog::new();
    log.push(opening_line(reading));
    ChatState { seed, turns: 0, log }
}

/// Drop every turn, keeping the seed
pub fn reset_chat(state: ChatState, reading: &Reading) -> ChatState {
    debug!(turns = state.turns, "chat reset");
    open_chat(reading, state.seed)
}

/// Build a companion reply for turn `turn`
pub fn companion_reply(reading: &Reading, seed: u64, turn: u32, message: &str) -> ChatLine {
    let mut rng = turn_rng(seed, turn);

    let companions: Vec<&'static CompanionArchetype> =
        reading.matched.gallery.iter().map(|p| p.archetype).collect();
    let spirit = companions
        .choose(&mut rng)
        .copied()
        .unwrap_or(reading.matched.archetype);

    // Two throwaway draws keep phrase choice decorrelated from the companion pick
    let _: u32 = rng.gen();
    let _: u32 = rng.gen();

    let phrase = CATALOG
        .phrases(spirit.voice)
        .choose(&mut rng)
        .copied()
        .unwrap_or_default();
    let greeting = GREETINGS
        .choose(&mut rng)
        .copied()
        .unwrap_or("Hello {name}!")
        .replace("{name}", reading.record.first_name());

    let mut text = format!(
        "{} With Sun in {} and Moon in {}, {}",
        greeting, reading.sky.sun_sign, reading.sky.moon_sign, phrase
    );
    if message.trim_end().ends_with('?') {
        if let Some(nod) = QUESTION_NODS.choose(&mut rng) {
            text.push(' ');
            text.push_str(nod);
        }
    }
    text.push_str(&format!(" ({})", spirit.description));

    ChatLine {
        speaker: speaker_for(spirit),
        text,
    }
}

/// One simulated exchange: the user's line, then a companion reply.
/// Blank messages leave the state untouched.
pub fn simulate_turn(state: ChatState, reading: &Reading, message: &str) -> ChatState {
    let message = message.trim();
    if message.is_empty() {
        return state;
    }

    let ChatState { seed, turns, mut log } = state;

    log.push(ChatLine {
        speaker: Speaker::You,
        text: message.to_string(),
    });
    log.push(companion_reply(reading, seed, turns, message));

    // Client-supplied state may already sit at the ceiling
    let turns = turns.saturating_add(1);
    debug!(turn = turns, lines = log.len(), "chat turn simulated");

    ChatState { seed, turns, log }
}

// ============================================================================
// TESTS
// ============================================================================
