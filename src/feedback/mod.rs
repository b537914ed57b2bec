//! Spoken, haptic and toast feedback
//!
//! The policy decides *what* to emit for a transition. Actually speaking or
//! vibrating is left to [`crate::platform::Presenter`], which knows which
//! capabilities the host has.

pub mod policy;

pub use policy::AnnouncementPolicy;

use serde::{Deserialize, Serialize};

/// Speech priority; anything above `Low` cuts off pending speech
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechPriority {
    /// Scan/highlight narration, queued behind whatever is playing
    Low,
    Medium,
    High,
}

impl SpeechPriority {
    pub fn interrupts(&self) -> bool {
        *self != SpeechPriority::Low
    }
}

/// A request for the speech synthesis sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub priority: SpeechPriority,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vibration {
    Pulse(u32),
    Pattern(Vec<u32>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToastKind {
    Correct,
    Incorrect,
    LevelUp,
    TimeUp,
    ScanStarted,
    ScanSelected,
    ScanActivated,
    ScanSpeed,
    ScanStopped,
    SettingChanged,
    VoiceActive,
    MicrophoneDenied,
    Paused,
    Resumed,
}

/// Transient on-screen message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: String,
    /// Rendered as an error/warning
    pub destructive: bool,
}

impl Toast {
    pub fn new(kind: ToastKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            destructive: false,
        }
    }

    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }
}

/// Everything that accompanies one transition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feedback {
    pub speech: Option<Utterance>,
    pub vibration: Option<Vibration>,
    pub toasts: Vec<Toast>,
}

impl Feedback {
    pub fn with_toast(mut self, toast: Toast) -> Self {
        self.toasts.push(toast);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_priority_never_interrupts() {
        assert!(!SpeechPriority::Low.interrupts());
        assert!(SpeechPriority::Medium.interrupts());
        assert!(SpeechPriority::High.interrupts());
    }

    #[test]
    fn test_feedback_with_toast_appends() {
        let fb = Feedback::default()
            .with_toast(Toast::new(ToastKind::Paused, "Paused", ""))
            .with_toast(Toast::new(ToastKind::Resumed, "Resumed", ""));
        let titles: Vec<&str> = fb.toasts.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Paused", "Resumed"]);
        assert!(fb.speech.is_none());
    }
}
