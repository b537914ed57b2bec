//! Session driver shared by the browser and console front ends

use super::Presenter;
use crate::error::SettingsError;
use crate::settings::{AccessibilitySettings, SettingsOwner};
use crate::sim::{Effect, InputEvent, Session, Snapshot};

/// A session wired to its settings owner and feedback sinks
///
/// Every entry point processes the input, plays the resulting feedback and
/// routes settings patches through the owner until the session is quiet.
pub struct GameHost {
    session: Session,
    owner: SettingsOwner,
    presenter: Presenter,
    /// Last rendered snapshot
    snapshot: Option<Snapshot>,
}

impl GameHost {
    pub fn new(seed: u64, owner: SettingsOwner, presenter: Presenter, now_ms: u64) -> Self {
        let session = Session::new(seed, owner.snapshot(), now_ms);
        let mut host = Self {
            session,
            owner,
            presenter,
            snapshot: None,
        };
        host.flush();
        host
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> AccessibilitySettings {
        self.owner.snapshot()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone().unwrap_or_else(|| self.session.snapshot())
    }

    /// Input for the round currently showing
    pub fn handle(&mut self, event: InputEvent) {
        self.session.handle(event);
        self.flush();
    }

    /// Input captured while round `generation` was showing. Selections for a
    /// round that has since been replaced are dropped.
    pub fn handle_for_round(&mut self, event: InputEvent, generation: u64) {
        self.session.post_for_round(event, generation);
        self.session.pump();
        self.flush();
    }

    pub fn advance(&mut self, now_ms: u64) {
        self.session.advance_to(now_ms);
        self.flush();
    }

    pub fn restart(&mut self, seed: u64) {
        self.session.restart(seed);
        self.flush();
    }

    /// Replace every setting, e.g. from a settings panel
    pub fn replace_settings(&mut self, settings: AccessibilitySettings) {
        let snapshot = self.owner.replace(settings);
        self.session.update_settings(snapshot);
        self.flush();
    }

    /// Apply a `{ "<settingKey>": bool, ... }` object
    pub fn patch_settings(&mut self, json: &str) -> Result<(), SettingsError> {
        let snapshot = self.owner.apply_json(json)?;
        self.session.update_settings(snapshot);
        self.flush();
        Ok(())
    }

    fn flush(&mut self) {
        // Settings changes produce more effects; loop until quiet
        loop {
            let effects = self.session.take_effects();
            if effects.is_empty() {
                break;
            }
            for effect in self.presenter.present(effects) {
                match effect {
                    Effect::ApplySettings(patch) => {
                        let snapshot = self.owner.apply(patch);
                        self.session.update_settings(snapshot);
                    }
                    Effect::Render(snapshot) => self.snapshot = Some(snapshot),
                    _ => {}
                }
            }
        }
    }
}
