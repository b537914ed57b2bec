//! Browser sinks and the JS-facing session wrapper

use wasm_bindgen::prelude::*;
use web_sys::{Navigator, SpeechSynthesis, SpeechSynthesisUtterance};

use super::{GameHost, NotificationSink, Presenter, SpeechSink, VibrationSink};
use crate::consts::GAMEPAD_POLL_HZ;
use crate::error::RecognitionError;
use crate::feedback::{Toast, Utterance, Vibration};
use crate::input::KeyPress;
use crate::settings::{AccessibilitySettings, SettingsOwner};
use crate::sim::InputEvent;

// Toasts are rendered by the page; hand them over as a DOM event
#[wasm_bindgen(inline_js = "
    export function dispatch_toast(kind, title, description, destructive) {
        window.dispatchEvent(new CustomEvent('inclusive-play-toast', {
            detail: { kind, title, description, destructive },
        }));
    }
")]
extern "C" {
    fn dispatch_toast(kind: &str, title: &str, description: &str, destructive: bool);
}

/// Install the panic hook and route `log` to the browser console
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
}

/// Whether `target[name]` exists. web-sys getters hand back an object even
/// when the browser lacks the API.
fn has_property(target: &JsValue, name: &str) -> bool {
    js_sys::Reflect::get(target, &JsValue::from_str(name))
        .map(|value| !value.is_undefined() && !value.is_null())
        .unwrap_or(false)
}

/// Web Speech API synthesis
pub struct WebSpeech {
    synth: Option<SpeechSynthesis>,
}

impl WebSpeech {
    pub fn new() -> Self {
        let synth = web_sys::window()
            .filter(|w| has_property(w, "speechSynthesis"))
            .and_then(|w| w.speech_synthesis().ok());
        if synth.is_none() {
            log::warn!("speechSynthesis not supported - speech disabled");
        }
        Self { synth }
    }
}

impl Default for WebSpeech {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechSink for WebSpeech {
    fn is_available(&self) -> bool {
        self.synth.is_some()
    }

    fn speak(&mut self, utterance: &Utterance) {
        let Some(synth) = &self.synth else { return };
        match SpeechSynthesisUtterance::new_with_text(&utterance.text) {
            Ok(u) => {
                u.set_rate(utterance.rate);
                u.set_pitch(utterance.pitch);
                u.set_volume(utterance.volume);
                synth.speak(&u);
            }
            Err(e) => log::warn!("Failed to create utterance: {:?}", e),
        }
    }

    fn cancel_all(&mut self) {
        if let Some(synth) = &self.synth {
            synth.cancel();
        }
    }
}

/// `navigator.vibrate`, absent on most desktop browsers
#[derive(Debug)]
pub struct WebVibration {
    navigator: Option<Navigator>,
}

impl WebVibration {
    pub fn new() -> Self {
        let navigator = web_sys::window()
            .map(|w| w.navigator())
            .filter(|n| has_property(n, "vibrate"));
        if navigator.is_none() {
            log::info!("navigator.vibrate not supported - vibration disabled");
        }
        Self { navigator }
    }
}

impl Default for WebVibration {
    fn default() -> Self {
        Self::new()
    }
}

impl VibrationSink for WebVibration {
    fn is_available(&self) -> bool {
        self.navigator.is_some()
    }

    fn vibrate(&mut self, vibration: &Vibration) {
        let Some(navigator) = &self.navigator else { return };
        let accepted = match vibration {
            Vibration::Pulse(ms) => navigator.vibrate_with_duration(*ms),
            Vibration::Pattern(pattern) => {
                let steps: js_sys::Array = pattern.iter().map(|&ms| JsValue::from(ms)).collect();
                navigator.vibrate_with_pattern(&steps)
            }
        };
        if !accepted {
            log::debug!("Vibration request rejected");
        }
    }
}

#[derive(Debug, Default)]
pub struct DomToasts;

impl NotificationSink for DomToasts {
    fn show(&mut self, toast: &Toast) {
        let kind = format!("{:?}", toast.kind);
        dispatch_toast(&kind, &toast.title, &toast.description, toast.destructive);
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn random_seed() -> u64 {
    (js_sys::Math::random() * u32::MAX as f64) as u64
}

fn clock_ms(now_ms: f64) -> u64 {
    now_ms.max(0.0) as u64
}

/// Session handle for the page script
///
/// Every entry point processes the input, plays feedback through the browser
/// sinks and applies settings changes. The page reads state back with
/// [`WebSession::snapshot_json`] and [`WebSession::settings_json`].
///
/// Input that may arrive late (a click queued behind an animation frame, a
/// transcript finalized after the round moved on) should go through the
/// `*_for_round` variants with the [`WebSession::generation`] that was
/// showing when it was captured.
#[wasm_bindgen]
pub struct WebSession {
    host: GameHost,
}

#[wasm_bindgen]
impl WebSession {
    /// `settings_json` is the page's stored settings object, if any
    #[wasm_bindgen(constructor)]
    pub fn new(now_ms: f64, settings_json: Option<String>) -> Result<WebSession, JsValue> {
        let settings = match settings_json {
            Some(json) => AccessibilitySettings::from_json(&json).map_err(to_js)?,
            None => AccessibilitySettings::default(),
        };
        let presenter = Presenter::new()
            .with_speech(WebSpeech::new())
            .with_vibration(WebVibration::new())
            .with_notifications(DomToasts);
        let owner = SettingsOwner::new(settings);
        let host = GameHost::new(random_seed(), owner, presenter, clock_ms(now_ms));
        Ok(WebSession { host })
    }

    /// Suggested interval for `gamepad_poll` calls
    pub fn gamepad_poll_ms() -> u32 {
        1000 / GAMEPAD_POLL_HZ
    }

    /// Round currently showing; stamp captured input with it
    pub fn generation(&self) -> f64 {
        self.host.session().generation() as f64
    }

    pub fn pointer_select(&mut self, index: usize) {
        self.host.handle(InputEvent::Pointer(index));
    }

    pub fn pointer_select_for_round(&mut self, index: usize, generation: f64) {
        self.host.handle_for_round(InputEvent::Pointer(index), generation as u64);
    }

    /// Forward a `keydown` event (`event.key`, `event.code`, `event.ctrlKey`)
    pub fn key_down(&mut self, key: &str, code: &str, ctrl: bool) {
        self.host.handle(InputEvent::Key(KeyPress::from_dom(key, code, ctrl)));
    }

    pub fn key_down_for_round(&mut self, key: &str, code: &str, ctrl: bool, generation: f64) {
        let event = InputEvent::Key(KeyPress::from_dom(key, code, ctrl));
        self.host.handle_for_round(event, generation as u64);
    }

    pub fn voice_transcript(&mut self, transcript: &str) {
        self.host.handle(InputEvent::Transcript(transcript.to_string()));
    }

    pub fn voice_transcript_for_round(&mut self, transcript: &str, generation: f64) {
        let event = InputEvent::Transcript(transcript.to_string());
        self.host.handle_for_round(event, generation as u64);
    }

    /// Forward `SpeechRecognitionErrorEvent.error`
    pub fn voice_error(&mut self, code: &str) {
        self.host.handle(InputEvent::RecognitionError(RecognitionError::from_code(code)));
    }

    pub fn voice_denied(&self) -> bool {
        self.host.session().voice_denied()
    }

    pub fn switch_press(&mut self) {
        self.host.handle(InputEvent::SwitchPress);
    }

    /// One gamepad poll; nonzero bytes are pressed buttons
    pub fn gamepad_poll(&mut self, slot: usize, buttons: &[u8]) {
        let buttons = buttons.iter().map(|&b| b != 0).collect();
        self.host.handle(InputEvent::GamepadPoll { slot, buttons });
    }

    /// Forward `gamepaddisconnected` (`event.gamepad.index`)
    pub fn gamepad_disconnected(&mut self, slot: usize) {
        self.host.handle(InputEvent::GamepadDisconnected(slot));
    }

    /// Advance the session clock (e.g. from `requestAnimationFrame`)
    pub fn advance(&mut self, now_ms: f64) {
        self.host.advance(clock_ms(now_ms));
    }

    /// When `advance` next has work to do
    pub fn next_due_ms(&self) -> Option<f64> {
        self.host.session().next_timer_due().map(|ms| ms as f64)
    }

    /// Replace all settings from the settings panel
    pub fn update_settings(&mut self, json: &str) -> Result<(), JsValue> {
        let settings = AccessibilitySettings::from_json(json).map_err(to_js)?;
        self.host.replace_settings(settings);
        Ok(())
    }

    /// Apply `{ "<settingKey>": bool, ... }`
    pub fn patch_settings(&mut self, json: &str) -> Result<(), JsValue> {
        self.host.patch_settings(json).map_err(to_js)
    }

    pub fn settings_json(&self) -> String {
        self.host.settings().to_json()
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.host.snapshot()).map_err(to_js)
    }

    pub fn restart(&mut self) {
        self.host.restart(random_seed());
    }
}
