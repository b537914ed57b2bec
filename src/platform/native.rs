//! Console sinks for the native driver

use super::{NotificationSink, Presenter, SpeechSink, VibrationSink};
use crate::feedback::{SpeechPriority, Toast, Utterance, Vibration};

/// Prints utterances instead of speaking them
#[derive(Debug, Default)]
pub struct ConsoleSpeech {
    /// Low-priority lines printed since the last interrupting utterance
    queued: usize,
}

impl SpeechSink for ConsoleSpeech {
    fn speak(&mut self, utterance: &Utterance) {
        let marker = match utterance.priority {
            SpeechPriority::Low => {
                self.queued += 1;
                "🔈"
            }
            SpeechPriority::Medium | SpeechPriority::High => "🔊",
        };
        println!("{marker} {}", utterance.text);
    }

    fn cancel_all(&mut self) {
        if self.queued > 0 {
            log::debug!("Cancelled {} queued utterances", self.queued);
            self.queued = 0;
        }
    }
}

#[derive(Debug, Default)]
pub struct ConsoleVibration;

impl VibrationSink for ConsoleVibration {
    fn vibrate(&mut self, vibration: &Vibration) {
        match vibration {
            Vibration::Pulse(ms) => println!("📳 {ms}ms"),
            Vibration::Pattern(pattern) => {
                let steps: Vec<String> = pattern.iter().map(u32::to_string).collect();
                println!("📳 [{}]", steps.join(", "));
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ConsoleToasts;

impl NotificationSink for ConsoleToasts {
    fn show(&mut self, toast: &Toast) {
        let bang = if toast.destructive { "!" } else { "" };
        println!("  [{}{bang}] {}", toast.title, toast.description);
    }
}

/// Presenter wired to stdout, optionally without vibration
pub fn console_presenter(vibration: bool) -> Presenter {
    let presenter = Presenter::new()
        .with_speech(ConsoleSpeech::default())
        .with_notifications(ConsoleToasts);
    if vibration {
        presenter.with_vibration(ConsoleVibration)
    } else {
        presenter
    }
}
