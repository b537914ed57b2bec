//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Speech synthesis
//! - Vibration
//! - Toast notifications
//!
//! Every capability is optional. A missing or unavailable sink turns the
//! matching effect into a no-op, warned about once.

pub mod host;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use host::GameHost;

use crate::feedback::{Toast, Utterance, Vibration};
use crate::sim::Effect;

pub trait SpeechSink {
    fn is_available(&self) -> bool {
        true
    }
    fn speak(&mut self, utterance: &Utterance);
    /// Drop anything queued or playing
    fn cancel_all(&mut self);
}

pub trait VibrationSink {
    fn is_available(&self) -> bool {
        true
    }
    fn vibrate(&mut self, vibration: &Vibration);
}

pub trait NotificationSink {
    fn is_available(&self) -> bool {
        true
    }
    fn show(&mut self, toast: &Toast);
}

/// Which capability warnings have already been logged
#[derive(Debug, Default)]
struct Warned {
    speech: bool,
    vibration: bool,
    notifications: bool,
}

/// Dispatches feedback effects to whatever sinks the host provides
#[derive(Default)]
pub struct Presenter {
    speech: Option<Box<dyn SpeechSink>>,
    vibration: Option<Box<dyn VibrationSink>>,
    notifications: Option<Box<dyn NotificationSink>>,
    warned: Warned,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_speech(mut self, sink: impl SpeechSink + 'static) -> Self {
        self.speech = Some(Box::new(sink));
        self
    }

    pub fn with_vibration(mut self, sink: impl VibrationSink + 'static) -> Self {
        self.vibration = Some(Box::new(sink));
        self
    }

    pub fn with_notifications(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.notifications = Some(Box::new(sink));
        self
    }

    /// Carry out feedback effects. Effects that are not feedback
    /// (settings patches, render snapshots) are handed back in order.
    pub fn present(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut rest = Vec::new();
        for effect in effects {
            match effect {
                Effect::Speak(utterance) => self.speak(&utterance),
                Effect::Vibrate(vibration) => self.vibrate(&vibration),
                Effect::Toast(toast) => self.show(&toast),
                other => rest.push(other),
            }
        }
        rest
    }

    pub fn speak(&mut self, utterance: &Utterance) {
        match self.speech.as_mut().filter(|s| s.is_available()) {
            Some(sink) => {
                if utterance.priority.interrupts() {
                    sink.cancel_all();
                }
                sink.speak(utterance);
            }
            None => {
                if !self.warned.speech {
                    self.warned.speech = true;
                    log::warn!("Speech synthesis unavailable - spoken feedback disabled");
                }
            }
        }
    }

    pub fn vibrate(&mut self, vibration: &Vibration) {
        match self.vibration.as_mut().filter(|s| s.is_available()) {
            Some(sink) => sink.vibrate(vibration),
            None => {
                if !self.warned.vibration {
                    self.warned.vibration = true;
                    log::warn!("Vibration unavailable - haptic feedback disabled");
                }
            }
        }
    }

    pub fn show(&mut self, toast: &Toast) {
        match self.notifications.as_mut().filter(|s| s.is_available()) {
            Some(sink) => sink.show(toast),
            None => {
                if !self.warned.notifications {
                    self.warned.notifications = true;
                    log::warn!("No notification sink - toasts disabled");
                }
            }
        }
    }
}
