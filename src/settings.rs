//! Accessibility settings and preferences
//!
//! The host page owns and persists these. The game core only ever holds an
//! immutable snapshot, and asks for changes through [`SettingsPatch`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;

/// Color vision filter applied by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorBlindMode {
    #[default]
    None,
    Protanopia,
    Deuteranopia,
    Tritanopia,
}

/// Boolean settings that can be toggled from an input channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingName {
    AudioEnabled,
    VoiceCommands,
    HighContrast,
    AutoAdvance,
    SwitchInput,
    ScreenReaderMode,
    SimplifiedUi,
    ExtendedTimeout,
    Vibration,
}

impl SettingName {
    pub const ALL: [SettingName; 9] = [
        SettingName::AudioEnabled,
        SettingName::VoiceCommands,
        SettingName::HighContrast,
        SettingName::AutoAdvance,
        SettingName::SwitchInput,
        SettingName::ScreenReaderMode,
        SettingName::SimplifiedUi,
        SettingName::ExtendedTimeout,
        SettingName::Vibration,
    ];

    /// JSON key used by the host page
    pub fn key(&self) -> &'static str {
        match self {
            SettingName::AudioEnabled => "audioEnabled",
            SettingName::VoiceCommands => "voiceCommands",
            SettingName::HighContrast => "isHighContrast",
            SettingName::AutoAdvance => "autoAdvance",
            SettingName::SwitchInput => "switchInput",
            SettingName::ScreenReaderMode => "screenReaderMode",
            SettingName::SimplifiedUi => "simplifiedUI",
            SettingName::ExtendedTimeout => "extendedTimeout",
            SettingName::Vibration => "vibration",
        }
    }

    pub fn from_key(key: &str) -> Result<Self, SettingsError> {
        Self::ALL
            .into_iter()
            .find(|name| name.key() == key)
            .ok_or_else(|| SettingsError::UnknownSetting(key.to_string()))
    }

    /// Human-readable label for toasts and speech
    pub fn label(&self) -> &'static str {
        match self {
            SettingName::AudioEnabled => "Audio",
            SettingName::VoiceCommands => "Voice commands",
            SettingName::HighContrast => "High contrast",
            SettingName::AutoAdvance => "Auto advance",
            SettingName::SwitchInput => "Switch input",
            SettingName::ScreenReaderMode => "Screen reader mode",
            SettingName::SimplifiedUi => "Simplified interface",
            SettingName::ExtendedTimeout => "Extended timeouts",
            SettingName::Vibration => "Vibration",
        }
    }
}

/// A requested change to one boolean setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub name: SettingName,
    pub value: bool,
}

/// Accessibility settings snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessibilitySettings {
    // === Audio ===
    /// Spoken feedback
    pub audio_enabled: bool,
    /// Speech recognition commands
    pub voice_commands: bool,

    // === Visual ===
    #[serde(rename = "isHighContrast")]
    pub high_contrast: bool,
    /// Font scale percent (75 - 200)
    pub font_size: u16,
    /// Animation speed multiplier (0.25 - 2.0)
    pub animation_speed: f32,
    pub color_blind_mode: ColorBlindMode,
    #[serde(rename = "simplifiedUI")]
    pub simplified_ui: bool,

    // === Motor & input ===
    pub auto_advance: bool,
    /// Seconds before an unanswered round advances (3 - 30)
    pub auto_advance_time: u32,
    pub switch_input: bool,
    pub extended_timeout: bool,
    pub vibration: bool,

    // === Cognitive ===
    /// Verbose spoken phrasing
    pub screen_reader_mode: bool,
}

impl Default for AccessibilitySettings {
    fn default() -> Self {
        Self {
            audio_enabled: true,
            voice_commands: true,

            high_contrast: false,
            font_size: 100,
            animation_speed: 1.0,
            color_blind_mode: ColorBlindMode::None,
            simplified_ui: false,

            auto_advance: false,
            auto_advance_time: 10,
            switch_input: false,
            extended_timeout: false,
            vibration: true,

            screen_reader_mode: false,
        }
    }
}

impl AccessibilitySettings {
    /// Parse a host snapshot; missing keys take defaults, ranges are clamped
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    pub fn to_json(&self) -> String {
        // Plain struct of scalars, serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Clamp numeric settings into their supported ranges
    pub fn sanitized(mut self) -> Self {
        self.font_size = self.font_size.clamp(75, 200);
        self.animation_speed = if self.animation_speed.is_finite() {
            self.animation_speed.clamp(0.25, 2.0)
        } else {
            1.0
        };
        self.auto_advance_time = self
            .auto_advance_time
            .clamp(AUTO_ADVANCE_MIN_SECS, AUTO_ADVANCE_MAX_SECS);
        self
    }

    /// Read a boolean setting by name
    pub fn flag(&self, name: SettingName) -> bool {
        match name {
            SettingName::AudioEnabled => self.audio_enabled,
            SettingName::VoiceCommands => self.voice_commands,
            SettingName::HighContrast => self.high_contrast,
            SettingName::AutoAdvance => self.auto_advance,
            SettingName::SwitchInput => self.switch_input,
            SettingName::ScreenReaderMode => self.screen_reader_mode,
            SettingName::SimplifiedUi => self.simplified_ui,
            SettingName::ExtendedTimeout => self.extended_timeout,
            SettingName::Vibration => self.vibration,
        }
    }

    fn flag_mut(&mut self, name: SettingName) -> &mut bool {
        match name {
            SettingName::AudioEnabled => &mut self.audio_enabled,
            SettingName::VoiceCommands => &mut self.voice_commands,
            SettingName::HighContrast => &mut self.high_contrast,
            SettingName::AutoAdvance => &mut self.auto_advance,
            SettingName::SwitchInput => &mut self.switch_input,
            SettingName::ScreenReaderMode => &mut self.screen_reader_mode,
            SettingName::SimplifiedUi => &mut self.simplified_ui,
            SettingName::ExtendedTimeout => &mut self.extended_timeout,
            SettingName::Vibration => &mut self.vibration,
        }
    }

    /// Patch that flips `name`
    pub fn toggle_patch(&self, name: SettingName) -> SettingsPatch {
        SettingsPatch {
            name,
            value: !self.flag(name),
        }
    }

    /// Cooldown after a correct answer
    pub fn celebration_cooldown_ms(&self) -> u64 {
        if self.extended_timeout {
            EXTENDED_CELEBRATION_MS
        } else {
            CELEBRATION_MS
        }
    }

    /// Auto-advance timer duration, `None` when disabled
    pub fn auto_advance_ms(&self) -> Option<u64> {
        self.auto_advance.then(|| {
            let secs = self
                .auto_advance_time
                .clamp(AUTO_ADVANCE_MIN_SECS, AUTO_ADVANCE_MAX_SECS);
            u64::from(secs) * 1000
        })
    }

    pub fn speech_rate(&self) -> f32 {
        if self.screen_reader_mode {
            SCREEN_READER_SPEECH_RATE
        } else {
            SPEECH_RATE
        }
    }
}

/// Single owner of the live settings
///
/// Applies patches and redistributes fresh snapshots; nothing else mutates
/// settings.
#[derive(Debug, Clone, Default)]
pub struct SettingsOwner {
    current: AccessibilitySettings,
}

impl SettingsOwner {
    pub fn new(settings: AccessibilitySettings) -> Self {
        Self {
            current: settings.sanitized(),
        }
    }

    pub fn snapshot(&self) -> AccessibilitySettings {
        self.current.clone()
    }

    /// Apply a patch, returning the new snapshot
    pub fn apply(&mut self, patch: SettingsPatch) -> AccessibilitySettings {
        *self.current.flag_mut(patch.name) = patch.value;
        log::info!("Setting {} -> {}", patch.name.key(), patch.value);
        self.snapshot()
    }

    /// Apply a `{ "<key>": bool }` patch object from the host
    pub fn apply_json(&mut self, json: &str) -> Result<AccessibilitySettings, SettingsError> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut patches = Vec::with_capacity(map.len());
        for (key, value) in map {
            let name = SettingName::from_key(&key)?;
            let value = value
                .as_bool()
                .ok_or_else(|| SettingsError::UnknownSetting(key.clone()))?;
            patches.push(SettingsPatch { name, value });
        }
        for patch in patches {
            self.apply(patch);
        }
        Ok(self.snapshot())
    }

    pub fn replace(&mut self, settings: AccessibilitySettings) -> AccessibilitySettings {
        self.current = settings.sanitized();
        self.snapshot()
    }
}
