//! Phrasing and modality selection for each game transition

use super::{Feedback, SpeechPriority, Toast, ToastKind, Utterance, Vibration};
use crate::consts::*;
use crate::settings::{AccessibilitySettings, SettingsPatch};
use crate::sim::piece::Piece;
use crate::sim::resolver::Channel;
use crate::sim::round::Round;

/// Announcement rules for one settings snapshot
#[derive(Debug, Clone, Copy)]
pub struct AnnouncementPolicy<'a> {
    settings: &'a AccessibilitySettings,
}

impl<'a> AnnouncementPolicy<'a> {
    pub fn new(settings: &'a AccessibilitySettings) -> Self {
        Self { settings }
    }

    fn verbose(&self) -> bool {
        self.settings.screen_reader_mode
    }

    /// Speech request, or `None` when audio is off
    fn speak(&self, text: impl Into<String>, priority: SpeechPriority) -> Option<Utterance> {
        if !self.settings.audio_enabled {
            return None;
        }
        Some(Utterance {
            text: text.into(),
            priority,
            rate: self.settings.speech_rate(),
            pitch: SPEECH_PITCH,
            volume: SPEECH_VOLUME,
        })
    }

    fn vibrate(&self, vibration: Vibration) -> Option<Vibration> {
        self.settings.vibration.then_some(vibration)
    }

    pub fn welcome(&self) -> Feedback {
        let text = if self.verbose() {
            "Welcome to Inclusive Play, an accessible shape and color matching game. \
             Listen carefully and find the matching shape and color from the available options. \
             You can use voice commands by saying numbers like \"1\" or \"2\", or saying \"help\" for instructions."
        } else {
            "Welcome to Inclusive Play! Find the matching shape and color. Use voice commands or click to play."
        };
        Feedback {
            speech: self.speak(text, SpeechPriority::High),
            ..Default::default()
        }
    }

    /// Target description, used at round start and on repeat
    pub fn target(&self, round: &Round) -> Feedback {
        let target = &round.target;
        let text = if self.verbose() {
            format!(
                "Find the {target}. This is a {} colored {} shape. There are {} options to choose from.",
                target.color.as_str(),
                target.shape.as_str(),
                round.option_count()
            )
        } else {
            format!("Find the {target}")
        };
        Feedback {
            speech: self.speak(text, SpeechPriority::High),
            ..Default::default()
        }
    }

    pub fn help(&self, round: &Round, level: u32, score: u64, channel: Channel) -> Feedback {
        let target = &round.target;
        let n = round.option_count();
        let text = match channel {
            Channel::Voice => format!(
                "You are playing level {level} with a score of {score}. Find the {target}. \
                 There are {n} options numbered 1 through {n}. \
                 Say a number to select, or say \"repeat\" to hear the target again."
            ),
            _ => format!(
                "Level {level}. Score {score}. Find the {target}. \
                 Press numbers 1 through {n} to select pieces."
            ),
        };
        Feedback {
            speech: self.speak(text, SpeechPriority::High),
            ..Default::default()
        }
    }

    pub fn correct(&self, target: &Piece, score: u64, level_up: Option<u32>) -> Feedback {
        let mut text = if self.verbose() {
            format!(
                "Excellent work! You correctly identified the {target}. Your score is now {score} points."
            )
        } else {
            "Great job! That's correct!".to_string()
        };
        let mut toasts = vec![Toast::new(
            ToastKind::Correct,
            "🎉 Excellent!",
            format!("You found the {target}!"),
        )];
        if let Some(level) = level_up {
            // One utterance so the level-up is not cut off by its own praise
            text.push_str(&format!(
                " Amazing! Level up! Now level {level}. The game will get more challenging."
            ));
            toasts.push(Toast::new(
                ToastKind::LevelUp,
                "⭐ Level Up!",
                format!("Now playing level {level}"),
            ));
        }
        Feedback {
            speech: self.speak(text, SpeechPriority::High),
            vibration: self.vibrate(Vibration::Pattern(CORRECT_VIBRATION.to_vec())),
            toasts,
        }
    }

    pub fn incorrect(&self, selected: &Piece, target: &Piece) -> Feedback {
        let text = if self.verbose() {
            format!(
                "That's not quite right. You selected the {selected}, but we're looking for the {target}. Try again!"
            )
        } else {
            format!("That's the {selected}. Try again! Look for the {target}")
        };
        Feedback {
            speech: self.speak(text, SpeechPriority::High),
            vibration: self.vibrate(Vibration::Pulse(INCORRECT_VIBRATION_MS)),
            toasts: vec![
                Toast::new(
                    ToastKind::Incorrect,
                    "Try again!",
                    format!("That's a {selected}. Look for the {target}"),
                )
                .destructive(),
            ],
        }
    }

    pub fn time_up(&self) -> Feedback {
        Feedback {
            speech: self.speak("Time's up! Moving to next round.", SpeechPriority::High),
            toasts: vec![Toast::new(
                ToastKind::TimeUp,
                "⏰ Time's up!",
                "Moving to the next round",
            )],
            ..Default::default()
        }
    }

    /// External highlight moved (digit key in switch mode)
    pub fn highlighted(&self, index: usize, piece: &Piece) -> Feedback {
        Feedback {
            speech: self.speak(
                format!("Highlighted option {}: {piece}", index + 1),
                SpeechPriority::Low,
            ),
            ..Default::default()
        }
    }

    /// Scan highlight advanced; the slot past the last option is "activate"
    pub fn scan_tick(&self, index: usize, round: &Round) -> Feedback {
        let text = match round.option(index) {
            Some(piece) => format!("Option {}: {piece}", index + 1),
            None => "Activate".to_string(),
        };
        Feedback {
            speech: self.speak(text, SpeechPriority::Low),
            ..Default::default()
        }
    }

    pub fn scan_started(&self) -> Feedback {
        Feedback::default().with_toast(Toast::new(
            ToastKind::ScanStarted,
            "🔄 Switch Scanning Started",
            "Press switch again to select highlighted option",
        ))
    }

    pub fn scan_selected(&self, index: usize) -> Feedback {
        Feedback::default().with_toast(Toast::new(
            ToastKind::ScanSelected,
            "✅ Option Selected",
            format!("Selected option {}", index + 1),
        ))
    }

    pub fn scan_activated(&self) -> Feedback {
        Feedback::default().with_toast(Toast::new(
            ToastKind::ScanActivated,
            "🎯 Activated",
            "Action confirmed",
        ))
    }

    pub fn scan_speed(&self, interval_ms: u64, faster: bool) -> Feedback {
        let title = if faster {
            "⚡ Scan Speed Increased"
        } else {
            "🐌 Scan Speed Decreased"
        };
        Feedback::default().with_toast(Toast::new(
            ToastKind::ScanSpeed,
            title,
            format!("Now {interval_ms}ms per option"),
        ))
    }

    pub fn scan_stopped(&self) -> Feedback {
        Feedback::default().with_toast(Toast::new(
            ToastKind::ScanStopped,
            "⏹️ Scanning Stopped",
            "Press space to restart scanning",
        ))
    }

    pub fn setting_changed(&self, patch: &SettingsPatch) -> Feedback {
        let state = if patch.value { "on" } else { "off" };
        let text = format!("{} {state}", patch.name.label());
        Feedback {
            speech: self.speak(text.clone(), SpeechPriority::Medium),
            toasts: vec![Toast::new(ToastKind::SettingChanged, "⚙️ Setting Changed", text)],
            ..Default::default()
        }
    }

    pub fn voice_active(&self) -> Feedback {
        Feedback::default().with_toast(Toast::new(
            ToastKind::VoiceActive,
            "🎤 Voice Commands Active",
            "Say 'select 1', 'repeat', or 'help'",
        ))
    }

    pub fn microphone_denied(&self) -> Feedback {
        Feedback::default().with_toast(
            Toast::new(
                ToastKind::MicrophoneDenied,
                "Microphone Access Required",
                "Please allow microphone access to use voice commands.",
            )
            .destructive(),
        )
    }

    pub fn paused(&self) -> Feedback {
        Feedback {
            speech: self.speak("Game paused. Say start to continue.", SpeechPriority::Medium),
            toasts: vec![Toast::new(ToastKind::Paused, "⏸️ Paused", "Say 'start' to continue")],
            ..Default::default()
        }
    }

    pub fn resumed(&self) -> Feedback {
        Feedback {
            speech: self.speak("Game resumed.", SpeechPriority::Medium),
            toasts: vec![Toast::new(ToastKind::Resumed, "▶️ Resumed", "Let's keep playing")],
            ..Default::default()
        }
    }
}
