//! Voice command channel
//!
//! Consumes finalized transcripts from the speech recognition source. Numeric
//! selections are matched before keywords so "select 2" never also fires a
//! keyword. Anything unrecognized is dropped.

use std::sync::LazyLock;

use regex::Regex;

use super::IntentSource;
use crate::error::RecognitionError;
use crate::settings::SettingName;
use crate::sim::resolver::{Channel, SelectionIntent};

const NUMBER: &str = r"(\d+|one|two|three|four|five|six|seven|eight|nine|ten)";

static SELECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:select|choose|pick|number|option)\s+{NUMBER}\b"))
        .expect("select pattern is valid")
});

static BARE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{NUMBER}$")).expect("number pattern is valid"));

/// Keyword groups, checked in order
const KEYWORDS: &[(&[&str], SelectionIntent)] = &[
    (&["repeat", "again"], SelectionIntent::Repeat),
    (&["help", "instructions"], SelectionIntent::Help),
    (&["next", "skip"], SelectionIntent::NextRound),
    (&["pause", "stop"], SelectionIntent::Pause),
    (&["start", "begin"], SelectionIntent::Resume),
    (&["contrast"], SelectionIntent::ToggleSetting(SettingName::HighContrast)),
    (&["audio", "sound"], SelectionIntent::ToggleSetting(SettingName::AudioEnabled)),
];

fn number_value(token: &str) -> Option<usize> {
    let n = match token {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        digits => digits.parse().ok()?,
    };
    Some(n)
}

/// 1-based spoken number to a 0-based select; zero is malformed
fn select_from(token: &str) -> Option<SelectionIntent> {
    number_value(token)?.checked_sub(1).map(SelectionIntent::Select)
}

/// Map a transcript to an intent
pub fn parse_transcript(transcript: &str) -> Option<SelectionIntent> {
    let text = transcript.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = SELECT_RE.captures(&text) {
        return select_from(&caps[1]);
    }
    if let Some(caps) = BARE_NUMBER_RE.captures(&text) {
        return select_from(&caps[1]);
    }

    KEYWORDS
        .iter()
        .find(|(words, _)| words.iter().any(|w| text.contains(w)))
        .map(|(_, intent)| *intent)
}

/// Recognition channel state
#[derive(Debug, Clone)]
pub struct VoiceChannel {
    /// Mirrors the voice-commands setting
    enabled: bool,
    /// Set after a permission denial, cleared when voice is re-enabled
    denied: bool,
}

impl Default for VoiceChannel {
    fn default() -> Self {
        Self {
            enabled: true,
            denied: false,
        }
    }
}

impl VoiceChannel {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            denied: false,
        }
    }

    /// Follow the voice-commands setting. Returns true when the channel
    /// just went from off to on.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let turned_on = enabled && !self.enabled;
        if turned_on {
            self.denied = false;
        }
        self.enabled = enabled;
        turned_on
    }

    pub fn is_denied(&self) -> bool {
        self.denied
    }

    /// Handle a recognition error. Returns true when the user must be told
    /// (first permission denial only).
    pub fn on_error(&mut self, error: &RecognitionError) -> bool {
        if error.is_fatal_for_channel() {
            let first = !self.denied;
            self.denied = true;
            log::warn!("Voice channel disabled: {}", error);
            first
        } else {
            log::warn!("Speech recognition: {}", error);
            false
        }
    }
}

impl IntentSource for VoiceChannel {
    type Input = str;

    fn channel(&self) -> Channel {
        Channel::Voice
    }

    fn is_enabled(&self) -> bool {
        self.enabled && !self.denied
    }

    fn on_input(&mut self, transcript: &str) -> Option<SelectionIntent> {
        let intent = parse_transcript(transcript);
        if intent.is_none() {
            log::debug!("Unmatched voice transcript {:?}", transcript);
        }
        intent
    }
}
