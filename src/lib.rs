//! Inclusive Play - an accessible shape and color matching game
//!
//! Core modules:
//! - `sim`: Deterministic game core (rounds, command resolution, scoring, timers)
//! - `input`: Pointer/keyboard, voice, switch-scan and auto-advance channels
//! - `feedback`: What gets spoken, vibrated and toasted for each transition
//! - `settings`: Accessibility settings snapshot and patches
//! - `platform`: Native and browser sinks for speech, vibration and toasts

pub mod error;
pub mod feedback;
pub mod input;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{RecognitionError, SettingsError};
pub use settings::{
    AccessibilitySettings, ColorBlindMode, SettingName, SettingsOwner, SettingsPatch,
};
pub use sim::{Effect, GameState, InputEvent, Piece, Round, SelectionIntent, Session};

/// Game configuration constants
pub mod consts {
    /// Points awarded per correct answer are `level * SCORE_PER_LEVEL`
    pub const SCORE_PER_LEVEL: u64 = 10;
    /// Level goes up whenever the score lands exactly on a multiple of this
    pub const LEVEL_UP_EVERY: u64 = 50;
    pub const MIN_LEVEL: u32 = 1;
    pub const MAX_LEVEL: u32 = 5;

    /// Option set bounds (target included)
    pub const MIN_OPTIONS: usize = 3;
    pub const MAX_OPTIONS: usize = 6;

    /// Cooldown between a correct answer and the next round
    pub const CELEBRATION_MS: u64 = 2000;
    pub const EXTENDED_CELEBRATION_MS: u64 = 3000;

    /// Delay before the target is announced for a fresh round
    pub const TARGET_ANNOUNCE_DELAY_MS: u64 = 500;

    /// Switch scanning interval (ms per option)
    pub const SCAN_INTERVAL_MIN_MS: u64 = 300;
    pub const SCAN_INTERVAL_MAX_MS: u64 = 3000;
    pub const SCAN_INTERVAL_STEP_MS: u64 = 100;
    pub const SCAN_INTERVAL_DEFAULT_MS: u64 = 1000;

    /// Auto-advance duration bounds (seconds)
    pub const AUTO_ADVANCE_MIN_SECS: u32 = 3;
    pub const AUTO_ADVANCE_MAX_SECS: u32 = 30;

    /// Recommended gamepad poll rate for switch hardware
    pub const GAMEPAD_POLL_HZ: u32 = 20;

    /// Vibration feedback (ms on/off pattern)
    pub const CORRECT_VIBRATION: &[u32] = &[100, 50, 100, 50, 200];
    pub const INCORRECT_VIBRATION_MS: u32 = 200;

    /// Speech parameters
    pub const SPEECH_RATE: f32 = 0.8;
    pub const SCREEN_READER_SPEECH_RATE: f32 = 0.6;
    pub const SPEECH_PITCH: f32 = 1.2;
    pub const SPEECH_VOLUME: f32 = 0.8;
}

/// Number of options shown at a given level (target included)
#[inline]
pub fn option_count_for_level(level: u32) -> usize {
    (consts::MIN_OPTIONS + level as usize).clamp(consts::MIN_OPTIONS, consts::MAX_OPTIONS)
}
