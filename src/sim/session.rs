//! Game session: one event queue for every input channel and timer
//!
//! All inputs and due timers are queued and processed one at a time, in
//! arrival order. Intents and timers carry the round generation they were
//! issued for; anything from a superseded round is dropped. Generating a
//! round cancels every pending timer and resets switch scanning.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::resolver::{Action, Channel, Prompt, ResolveContext, SelectionIntent, resolve};
use super::round::{Round, generate_round};
use super::schedule::{Scheduler, Timer, TimerKind};
use super::scoring::{GameState, RoundOutcome, ScoringEngine};
use crate::consts::TARGET_ANNOUNCE_DELAY_MS;
use crate::error::RecognitionError;
use crate::feedback::{AnnouncementPolicy, Feedback, Toast, Utterance, Vibration};
use crate::input::{
    self, AutoAdvanceTimer, GamepadEdges, IntentSource, KeyPress, PointerInput, PointerKeyboard,
    ScanState, SwitchCommand, SwitchOutput, SwitchScan, VoiceChannel,
};
use crate::settings::{AccessibilitySettings, SettingsPatch};

/// Raw input delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Click/tap on option `index`
    Pointer(usize),
    Key(KeyPress),
    /// Finalized speech recognition result
    Transcript(String),
    RecognitionError(RecognitionError),
    /// External switch pressed
    SwitchPress,
    /// Button snapshot from one gamepad poll
    GamepadPoll { slot: usize, buttons: Vec<bool> },
    /// Gamepad in `slot` went away
    GamepadDisconnected(usize),
}

/// Output for the host to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Speak(Utterance),
    Vibrate(Vibration),
    Toast(Toast),
    /// Ask the settings owner to apply a change, then call
    /// [`Session::update_settings`] with the new snapshot
    ApplySettings(SettingsPatch),
    Render(Snapshot),
}

/// Read-only view for the renderer and stats display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub state: GameState,
    pub round: Round,
    pub highlight: Option<usize>,
    pub scan: ScanState,
    pub paused: bool,
}

#[derive(Debug, Clone)]
enum Queued {
    Input { event: InputEvent, generation: u64 },
    Timer(Timer),
}

pub struct Session {
    seed: u64,
    rng: Pcg32,
    /// Session clock (ms), advanced by the host
    now_ms: u64,
    settings: AccessibilitySettings,
    scoring: ScoringEngine,
    round: Round,
    /// Externally highlighted option (switch mode digit keys)
    highlight: Option<usize>,
    paused: bool,
    scheduler: Scheduler,
    keyboard: PointerKeyboard,
    voice: VoiceChannel,
    switch: SwitchScan,
    auto_advance: AutoAdvanceTimer,
    gamepad: GamepadEdges,
    queue: VecDeque<Queued>,
    effects: Vec<Effect>,
    dirty: bool,
}

impl Session {
    /// Start a session and its first round
    pub fn new(seed: u64, settings: AccessibilitySettings, now_ms: u64) -> Self {
        let settings = settings.sanitized();
        let mut rng = Pcg32::seed_from_u64(seed);
        let scoring = ScoringEngine::new();
        // Placeholder generation 0, replaced immediately below
        let round = generate_round(&mut rng, scoring.state().level, 0, now_ms);

        let mut keyboard = PointerKeyboard::new();
        keyboard.set_switch_mode(settings.switch_input);

        let mut session = Self {
            seed,
            rng,
            now_ms,
            scoring,
            highlight: None,
            paused: false,
            scheduler: Scheduler::new(),
            keyboard,
            voice: VoiceChannel::new(settings.voice_commands),
            switch: SwitchScan::new(settings.switch_input, round.option_count()),
            auto_advance: AutoAdvanceTimer::new(&settings),
            gamepad: GamepadEdges::new(),
            queue: VecDeque::new(),
            effects: Vec::new(),
            dirty: false,
            round,
            settings,
        };

        log::info!("Session started (seed {})", seed);
        let policy = AnnouncementPolicy::new(&session.settings);
        let mut greeting = policy.welcome();
        if session.settings.voice_commands {
            greeting.toasts.extend(policy.voice_active().toasts);
        }
        session.emit(greeting);
        session.next_round();
        session.flush_render();
        session
    }

    /// Start over with a fresh seed, keeping settings and channel state
    pub fn restart(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.scoring = ScoringEngine::new();
        self.paused = false;
        self.queue.clear();
        log::info!("Session restarted (seed {})", seed);
        self.next_round();
        self.flush_render();
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn generation(&self) -> u64 {
        self.round.generation
    }

    pub fn state(&self) -> &GameState {
        self.scoring.state()
    }

    pub fn settings(&self) -> &AccessibilitySettings {
        &self.settings
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn scan_state(&self) -> ScanState {
        self.switch.state()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn voice_denied(&self) -> bool {
        self.voice.is_denied()
    }

    /// When the host should next call [`Session::advance_to`]
    pub fn next_timer_due(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    #[cfg(test)]
    pub(crate) fn is_timer_armed(&self, kind: TimerKind) -> bool {
        self.scheduler.is_armed(kind)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.scoring.state().clone(),
            round: self.round.clone(),
            highlight: self.highlight,
            scan: self.switch.state(),
            paused: self.paused,
        }
    }

    /// Drain pending effects
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // === Event intake ===

    /// Queue an input for the current round
    pub fn post(&mut self, event: InputEvent) {
        let generation = self.round.generation;
        self.post_for_round(event, generation);
    }

    /// Queue an input captured while round `generation` was showing
    pub fn post_for_round(&mut self, event: InputEvent, generation: u64) {
        self.queue.push_back(Queued::Input { event, generation });
    }

    /// Queue and process immediately
    pub fn handle(&mut self, event: InputEvent) {
        self.post(event);
        self.pump();
    }

    /// Process everything queued
    pub fn pump(&mut self) {
        while let Some(item) = self.queue.pop_front() {
            match item {
                Queued::Input { event, generation } => self.process_input(event, generation),
                Queued::Timer(timer) => self.process_timer(timer),
            }
            self.flush_render();
        }
    }

    /// Move the clock forward, firing due timers in order
    pub fn advance_to(&mut self, now_ms: u64) {
        self.pump();
        while let Some(timer) = self.scheduler.pop_due(now_ms) {
            self.now_ms = self.now_ms.max(timer.due_ms);
            self.queue.push_back(Queued::Timer(timer));
            self.pump();
        }
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Install a new settings snapshot from the settings owner
    pub fn update_settings(&mut self, settings: AccessibilitySettings) {
        self.settings = settings.sanitized();

        self.keyboard.set_switch_mode(self.settings.switch_input);
        if !self.settings.switch_input && self.switch.is_enabled() {
            self.scheduler.cancel_kind(TimerKind::ScanTick);
            self.highlight = None;
        }
        self.switch.set_enabled(self.settings.switch_input);

        if self.voice.set_enabled(self.settings.voice_commands) {
            let feedback = AnnouncementPolicy::new(&self.settings).voice_active();
            self.emit(feedback);
        }

        if self.auto_advance.configure(&self.settings) {
            if self.auto_advance.is_enabled() && !self.paused && !self.scoring.is_celebrating() {
                let generation = self.round.generation;
                self.auto_advance.arm(&mut self.scheduler, self.now_ms, generation);
            } else {
                self.auto_advance.disarm(&mut self.scheduler);
            }
        }

        self.dirty = true;
        self.flush_render();
    }

    // === Processing ===

    fn process_input(&mut self, event: InputEvent, generation: u64) {
        match event {
            InputEvent::Pointer(index) => {
                let polled = input::poll(&mut self.keyboard, &PointerInput::Pointer(index));
                self.dispatch_polled(polled, generation);
            }
            InputEvent::Key(press) => {
                if let Some(command) = self.switch.command_for(&press) {
                    self.switch_command(command, generation);
                } else {
                    let polled = input::poll(&mut self.keyboard, &PointerInput::Key(press));
                    self.dispatch_polled(polled, generation);
                }
            }
            InputEvent::Transcript(text) => {
                let polled = input::poll(&mut self.voice, text.as_str());
                self.dispatch_polled(polled, generation);
            }
            InputEvent::RecognitionError(error) => {
                if self.voice.on_error(&error) {
                    let feedback = AnnouncementPolicy::new(&self.settings).microphone_denied();
                    self.emit(feedback);
                    self.dirty = true;
                }
            }
            InputEvent::SwitchPress => self.switch_command(SwitchCommand::Press, generation),
            InputEvent::GamepadPoll { slot, buttons } => {
                // Track edges even when switch input is off so enabling it
                // mid-hold does not count a held button as a press
                let presses = self.gamepad.poll(slot, &buttons);
                if self.switch.is_enabled() {
                    for _ in 0..presses {
                        self.switch_command(SwitchCommand::Press, generation);
                    }
                }
            }
            InputEvent::GamepadDisconnected(slot) => {
                log::info!("Gamepad {} disconnected", slot);
                self.gamepad.forget(slot);
            }
        }
    }

    fn switch_command(&mut self, command: SwitchCommand, generation: u64) {
        let polled = input::poll(&mut self.switch, &command);
        let Some(output) = self.switch.take_output() else {
            return;
        };
        self.dirty = true;
        match output {
            SwitchOutput::Started => {
                self.schedule_scan_tick();
                let policy = AnnouncementPolicy::new(&self.settings);
                let mut feedback = policy.scan_started();
                feedback.speech = policy.scan_tick(0, &self.round).speech;
                self.emit(feedback);
            }
            SwitchOutput::Intent(picked) => {
                self.scheduler.cancel_kind(TimerKind::ScanTick);
                let policy = AnnouncementPolicy::new(&self.settings);
                let feedback = match picked {
                    SelectionIntent::Select(index) => policy.scan_selected(index),
                    _ => policy.scan_activated(),
                };
                self.emit(feedback);
                self.dispatch_polled(polled, generation);
            }
            SwitchOutput::Stopped => {
                self.scheduler.cancel_kind(TimerKind::ScanTick);
                let feedback = AnnouncementPolicy::new(&self.settings).scan_stopped();
                self.emit(feedback);
            }
            SwitchOutput::SpeedChanged { interval_ms, faster } => {
                if self.switch.is_scanning() {
                    self.schedule_scan_tick();
                }
                let policy = AnnouncementPolicy::new(&self.settings);
                let feedback = policy.scan_speed(interval_ms, faster);
                self.emit(feedback);
            }
        }
    }

    fn schedule_scan_tick(&mut self) {
        self.scheduler.cancel_kind(TimerKind::ScanTick);
        self.scheduler.schedule(
            TimerKind::ScanTick,
            self.now_ms + self.switch.interval_ms(),
            self.round.generation,
        );
    }

    fn dispatch_polled(&mut self, polled: Option<(Channel, SelectionIntent)>, generation: u64) {
        if let Some((source, intent)) = polled {
            self.dispatch(intent, source, generation);
        }
    }

    fn dispatch(&mut self, intent: SelectionIntent, source: Channel, generation: u64) {
        if intent.is_round_bound() && generation != self.round.generation {
            log::debug!(
                "Dropping stale {:?} from {:?} (round {} is now {})",
                intent,
                source,
                generation,
                self.round.generation
            );
            return;
        }
        if self.paused && intent.is_selection() {
            log::debug!("Paused, ignoring {:?}", intent);
            return;
        }

        let ctx = ResolveContext {
            round: &self.round,
            state: self.scoring.state(),
            settings: &self.settings,
            highlight: self.highlight,
            source,
        };
        if let Some(action) = resolve(&intent, &ctx) {
            self.apply(action);
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Correct(_) | Action::Incorrect(_) => {
                match self.scoring.apply(&action, &self.settings) {
                    Some(RoundOutcome::Correct {
                        score,
                        level_up,
                        cooldown_ms,
                        ..
                    }) => {
                        // Nothing but the cooldown may advance this round now
                        self.auto_advance.disarm(&mut self.scheduler);
                        self.scheduler.schedule(
                            TimerKind::CelebrationCooldown,
                            self.now_ms + cooldown_ms,
                            self.round.generation,
                        );
                        let policy = AnnouncementPolicy::new(&self.settings);
                        let feedback = policy.correct(&self.round.target, score, level_up);
                        self.emit(feedback);
                        self.dirty = true;
                    }
                    Some(RoundOutcome::Incorrect { piece }) => {
                        let policy = AnnouncementPolicy::new(&self.settings);
                        let feedback = policy.incorrect(&piece, &self.round.target);
                        self.emit(feedback);
                        self.dirty = true;
                    }
                    None => {}
                }
            }
            Action::Highlight { index, piece } => {
                self.highlight = Some(index);
                let feedback = AnnouncementPolicy::new(&self.settings).highlighted(index, &piece);
                self.emit(feedback);
                self.dirty = true;
            }
            Action::Announce(Prompt::Target) => {
                let feedback = AnnouncementPolicy::new(&self.settings).target(&self.round);
                self.emit(feedback);
            }
            Action::Announce(Prompt::Help {
                level,
                score,
                channel,
                ..
            }) => {
                let policy = AnnouncementPolicy::new(&self.settings);
                let feedback = policy.help(&self.round, level, score, channel);
                self.emit(feedback);
            }
            Action::ForceAdvance => {
                self.scoring.force_advance();
                self.next_round();
            }
            Action::SettingsPatch(patch) => {
                let feedback = AnnouncementPolicy::new(&self.settings).setting_changed(&patch);
                self.effects.push(Effect::ApplySettings(patch));
                self.emit(feedback);
            }
            Action::Pause => {
                if self.paused {
                    return;
                }
                self.paused = true;
                self.auto_advance.disarm(&mut self.scheduler);
                if self.switch.stop().is_some() {
                    self.scheduler.cancel_kind(TimerKind::ScanTick);
                }
                log::info!("Paused");
                let feedback = AnnouncementPolicy::new(&self.settings).paused();
                self.emit(feedback);
                self.dirty = true;
            }
            Action::Resume => {
                if !self.paused {
                    return;
                }
                self.paused = false;
                if !self.scoring.is_celebrating() {
                    let generation = self.round.generation;
                    self.auto_advance.arm(&mut self.scheduler, self.now_ms, generation);
                }
                log::info!("Resumed");
                let feedback = AnnouncementPolicy::new(&self.settings).resumed();
                self.emit(feedback);
                self.dirty = true;
            }
        }
    }

    fn process_timer(&mut self, timer: Timer) {
        if timer.generation != self.round.generation {
            log::debug!(
                "Dropping stale {:?} timer (round {} is now {})",
                timer.kind,
                timer.generation,
                self.round.generation
            );
            return;
        }
        match timer.kind {
            TimerKind::AnnounceTarget => {
                let feedback = AnnouncementPolicy::new(&self.settings).target(&self.round);
                self.emit(feedback);
            }
            TimerKind::AutoAdvance => {
                if self.paused || self.scoring.is_celebrating() {
                    return;
                }
                let polled = input::poll(&mut self.auto_advance, &timer);
                if polled.is_some() {
                    log::info!("Auto-advance expired on round {}", timer.generation);
                    let feedback = AnnouncementPolicy::new(&self.settings).time_up();
                    self.emit(feedback);
                    self.dispatch_polled(polled, timer.generation);
                }
            }
            TimerKind::CelebrationCooldown => {
                self.scoring.finish_celebration();
                self.next_round();
            }
            TimerKind::ScanTick => {
                if let Some(index) = self.switch.tick() {
                    let policy = AnnouncementPolicy::new(&self.settings);
                    let feedback = policy.scan_tick(index, &self.round);
                    self.emit(feedback);
                    self.schedule_scan_tick();
                    self.dirty = true;
                }
            }
        }
    }

    /// Replace the round. Every pending timer belongs to the old round.
    fn next_round(&mut self) {
        self.scheduler.cancel_all();
        let generation = self.round.generation + 1;
        let level = self.scoring.state().level;
        self.round = generate_round(&mut self.rng, level, generation, self.now_ms);
        self.highlight = None;

        let round = &self.round;
        self.keyboard.reset_for_round(round);
        self.voice.reset_for_round(round);
        self.switch.reset_for_round(round);
        self.auto_advance.reset_for_round(round);

        self.scheduler.schedule(
            TimerKind::AnnounceTarget,
            self.now_ms + TARGET_ANNOUNCE_DELAY_MS,
            generation,
        );
        if !self.paused {
            self.auto_advance.arm(&mut self.scheduler, self.now_ms, generation);
        }
        log::info!(
            "Round {} at level {}: find the {}",
            generation,
            self.scoring.state().level,
            self.round.target
        );
        self.dirty = true;
    }

    fn emit(&mut self, feedback: Feedback) {
        if let Some(speech) = feedback.speech {
            self.effects.push(Effect::Speak(speech));
        }
        if let Some(vibration) = feedback.vibration {
            self.effects.push(Effect::Vibrate(vibration));
        }
        self.effects.extend(feedback.toasts.into_iter().map(Effect::Toast));
    }

    fn flush_render(&mut self) {
        if self.dirty {
            self.dirty = false;
            let snapshot = self.snapshot();
            self.effects.push(Effect::Render(snapshot));
        }
    }

    #[cfg(test)]
    pub(crate) fn replace_round(
        &mut self,
        target: super::piece::Piece,
        options: Vec<super::piece::Piece>,
    ) {
        self.round.target = target;
        self.round.options = options;
        self.switch.reset_for_round(&self.round);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::input::Key;
    use crate::settings::{SettingName, SettingsOwner};
    use crate::sim::piece::{Color, Piece, Shape};

    fn spoken(effects: &[Effect]) -> Vec<String> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Speak(u) => Some(u.text.clone()),
                _ => None,
            })
            .collect()
    }

    fn wrong_index(session: &Session) -> usize {
        let target = session.round().target_index().unwrap();
        (target + 1) % session.round().option_count()
    }

    fn auto_advance(secs: u32) -> AccessibilitySettings {
        AccessibilitySettings {
            auto_advance: true,
            auto_advance_time: secs,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_session_welcomes_and_announces() {
        let mut session = Session::new(1, AccessibilitySettings::default(), 0);
        assert_eq!(session.generation(), 1);
        assert!(session.round().is_well_formed());
        assert_eq!(session.round().option_count(), 4);

        let effects = session.take_effects();
        assert!(spoken(&effects)[0].starts_with("Welcome to Inclusive Play!"));
        assert!(effects.iter().any(|e| matches!(e, Effect::Render(_))));

        session.advance_to(499);
        assert!(spoken(&session.take_effects()).is_empty());
        session.advance_to(500);
        let expected = format!("Find the {}", session.round().target);
        assert_eq!(spoken(&session.take_effects()), vec![expected]);
    }

    #[test]
    fn test_end_to_end_correct_answer() {
        let mut session = Session::new(5, AccessibilitySettings::default(), 0);
        session.replace_round(
            Piece::target(Shape::Square, Color::Blue),
            vec![
                Piece::target(Shape::Square, Color::Blue),
                Piece::new("option-1", Shape::Circle, Color::Red),
                Piece::new("option-2", Shape::Triangle, Color::Green),
            ],
        );
        session.advance_to(1000);
        session.take_effects();

        session.handle(InputEvent::Pointer(0));
        let state = session.state();
        assert_eq!((state.score, state.streak), (10, 1));
        assert!(state.celebrating);

        let effects = session.take_effects();
        let pattern = Vibration::Pattern(vec![100, 50, 100, 50, 200]);
        assert!(effects.contains(&Effect::Vibrate(pattern)));
        assert!(spoken(&effects).contains(&"Great job! That's correct!".to_string()));

        // Regeneration exactly CELEBRATION_MS later
        session.advance_to(1000 + CELEBRATION_MS - 1);
        assert_eq!(session.generation(), 1);
        session.advance_to(1000 + CELEBRATION_MS);
        assert_eq!(session.generation(), 2);
        assert!(!session.state().celebrating);
    }

    #[test]
    fn test_extended_timeout_cooldown() {
        let settings = AccessibilitySettings {
            extended_timeout: true,
            ..Default::default()
        };
        let mut session = Session::new(5, settings, 0);
        let target = session.round().target_index().unwrap();
        session.handle(InputEvent::Pointer(target));
        session.advance_to(CELEBRATION_MS);
        assert_eq!(session.generation(), 1);
        session.advance_to(EXTENDED_CELEBRATION_MS);
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn test_selections_ignored_while_celebrating() {
        let mut session = Session::new(9, AccessibilitySettings::default(), 0);
        let target = session.round().target_index().unwrap();
        session.handle(InputEvent::Pointer(target));
        session.handle(InputEvent::Pointer(target));
        session.handle(InputEvent::Pointer(wrong_index(&session)));
        assert_eq!(session.state().score, 10);
        assert_eq!(session.state().total_incorrect, 0);
    }

    #[test]
    fn test_incorrect_keeps_round_and_streak() {
        let mut session = Session::new(3, AccessibilitySettings::default(), 0);
        let target = session.round().target_index().unwrap();
        session.handle(InputEvent::Pointer(target));
        session.advance_to(CELEBRATION_MS);
        session.take_effects();

        let generation = session.generation();
        session.handle(InputEvent::Pointer(wrong_index(&session)));
        assert_eq!(session.generation(), generation);
        // Streak is not reset by a wrong answer
        assert_eq!(session.state().streak, 1);
        assert_eq!(session.state().total_incorrect, 1);
        assert!(session
            .take_effects()
            .contains(&Effect::Vibrate(Vibration::Pulse(INCORRECT_VIBRATION_MS))));
    }

    #[test]
    fn test_out_of_range_select_is_dropped() {
        let mut session = Session::new(3, AccessibilitySettings::default(), 0);
        session.take_effects();
        session.handle(InputEvent::Pointer(42));
        session.handle(InputEvent::Transcript("select 9".into()));
        assert_eq!(session.state(), &GameState::default());
        assert!(session.take_effects().is_empty());
    }

    #[test]
    fn test_force_advance_cancels_celebration() {
        let mut session = Session::new(11, auto_advance(5), 0);
        let target = session.round().target_index().unwrap();
        session.handle(InputEvent::Pointer(target));
        assert!(session.is_timer_armed(TimerKind::CelebrationCooldown));

        session.handle(InputEvent::Key(KeyPress::ctrl(Key::Char('n'))));
        assert_eq!(session.generation(), 2);
        assert!(!session.state().celebrating);
        assert!(!session.is_timer_armed(TimerKind::CelebrationCooldown));

        // Only the new round's auto-advance remains; nothing fires early
        session.advance_to(4999);
        assert_eq!(session.generation(), 2);
        session.advance_to(5000);
        assert_eq!(session.generation(), 3);
    }

    #[test]
    fn test_auto_advance_rotates_without_double_firing() {
        let mut session = Session::new(21, auto_advance(3), 0);
        session.take_effects();
        session.advance_to(3000);
        assert_eq!(session.generation(), 2);
        let speech = spoken(&session.take_effects());
        assert!(speech.contains(&"Time's up! Moving to next round.".to_string()));
        session.advance_to(5999);
        assert_eq!(session.generation(), 2);
        session.advance_to(6000);
        assert_eq!(session.generation(), 3);
        // Jumping far ahead fires each round's timer once
        session.advance_to(15_000);
        assert_eq!(session.generation(), 6);
        assert_eq!(session.state().score, 0);
    }

    #[test]
    fn test_correct_answer_disarms_auto_advance() {
        let mut session = Session::new(21, auto_advance(3), 0);
        session.advance_to(2500);
        let target = session.round().target_index().unwrap();
        session.handle(InputEvent::Pointer(target));
        assert!(!session.is_timer_armed(TimerKind::AutoAdvance));
        session.advance_to(2500 + CELEBRATION_MS);
        assert_eq!(session.generation(), 2);
        assert!(session.is_timer_armed(TimerKind::AutoAdvance));
    }

    #[test]
    fn test_stale_voice_select_after_auto_advance_is_dropped() {
        let mut session = Session::new(8, auto_advance(3), 0);
        let old_generation = session.generation();
        let old_target = session.round().target_index().unwrap();

        session.advance_to(3000);
        assert_eq!(session.generation(), old_generation + 1);

        // The transcript was spoken about the previous round
        session.post_for_round(
            InputEvent::Transcript(format!("select {}", old_target + 1)),
            old_generation,
        );
        session.post_for_round(InputEvent::Transcript("next".into()), old_generation);
        session.pump();
        assert_eq!(session.state().score, 0);
        assert_eq!(session.state().total_incorrect, 0);
        assert_eq!(session.generation(), old_generation + 1);
    }

    #[test]
    fn test_queued_inputs_behind_an_advance_go_stale() {
        let mut session = Session::new(8, AccessibilitySettings::default(), 0);
        session.post(InputEvent::Transcript("skip".into()));
        session.post(InputEvent::Pointer(0));
        session.pump();
        // The pointer event was stamped for round 1 and arrived after "skip"
        assert_eq!(session.generation(), 2);
        assert_eq!(session.state().total_incorrect + session.state().total_correct, 0);
    }

    #[test]
    fn test_repeat_and_help_are_not_round_bound() {
        let mut session = Session::new(8, AccessibilitySettings::default(), 0);
        session.handle(InputEvent::Transcript("next".into()));
        session.take_effects();
        session.post_for_round(InputEvent::Key(KeyPress::new(Key::Char('r'))), 1);
        session.post_for_round(InputEvent::Transcript("help".into()), 1);
        session.pump();
        let speech = spoken(&session.take_effects());
        assert_eq!(speech.len(), 2);
        assert_eq!(speech[0], format!("Find the {}", session.round().target));
        assert!(speech[1].starts_with("You are playing level 1 with a score of 0"));
    }

    #[test]
    fn test_switch_scan_selects_highlight() {
        let settings = AccessibilitySettings {
            switch_input: true,
            ..Default::default()
        };
        let mut session = Session::new(13, settings, 0);
        session.handle(InputEvent::Key(KeyPress::new(Key::Space)));
        let scan = session.scan_state();
        assert!(scan.is_scanning);
        assert_eq!(scan.highlight_index, Some(0));

        let interval = scan.scan_interval_ms;
        session.advance_to(interval * 2);
        assert_eq!(session.scan_state().highlight_index, Some(2));

        let target = session.round().target_index().unwrap();
        session.handle(InputEvent::SwitchPress);
        assert!(!session.scan_state().is_scanning);
        assert!(!session.is_timer_armed(TimerKind::ScanTick));
        let state = session.state();
        if target == 2 {
            assert_eq!(state.total_correct, 1);
        } else {
            assert_eq!(state.total_incorrect, 1);
        }
    }

    #[test]
    fn test_switch_activate_slot_uses_key_highlight() {
        let settings = AccessibilitySettings {
            switch_input: true,
            ..Default::default()
        };
        let mut session = Session::new(17, settings, 0);
        let target = session.round().target_index().unwrap();
        let n = session.round().option_count();

        // Digit keys highlight in switch mode
        session.handle(InputEvent::Key(KeyPress::new(Key::Digit(target as u8 + 1))));
        assert_eq!(session.highlight(), Some(target));
        assert_eq!(session.state().total_correct, 0);

        session.handle(InputEvent::SwitchPress);
        let interval = session.scan_state().scan_interval_ms;
        session.advance_to(interval * n as u64);
        assert_eq!(session.scan_state().highlight_index, Some(n));
        session.handle(InputEvent::SwitchPress);
        assert_eq!(session.state().total_correct, 1);
    }

    #[test]
    fn test_round_change_resets_scan() {
        let settings = AccessibilitySettings {
            switch_input: true,
            ..Default::default()
        };
        let mut session = Session::new(17, settings, 0);
        session.handle(InputEvent::SwitchPress);
        session.handle(InputEvent::Key(KeyPress::new(Key::Digit(1))));
        session.handle(InputEvent::Key(KeyPress::ctrl(Key::Char('n'))));
        let scan = session.scan_state();
        assert_eq!(scan.highlight_index, None);
        assert!(!scan.is_scanning);
        assert_eq!(session.highlight(), None);
        assert!(!session.is_timer_armed(TimerKind::ScanTick));
    }

    #[test]
    fn test_gamepad_press_starts_scanning() {
        let settings = AccessibilitySettings {
            switch_input: true,
            ..Default::default()
        };
        let mut session = Session::new(17, settings, 0);
        session.handle(InputEvent::GamepadPoll {
            slot: 0,
            buttons: vec![false, true],
        });
        assert!(session.scan_state().is_scanning);
        // Held button is not a second press
        session.handle(InputEvent::GamepadPoll {
            slot: 0,
            buttons: vec![false, true],
        });
        assert!(session.scan_state().is_scanning);
    }

    #[test]
    fn test_gamepad_disconnect_forgets_held_buttons() {
        let settings = AccessibilitySettings {
            switch_input: true,
            ..Default::default()
        };
        let mut session = Session::new(17, settings, 0);
        session.handle(InputEvent::GamepadPoll {
            slot: 0,
            buttons: vec![true],
        });
        assert!(session.scan_state().is_scanning);

        // Replugged with the button still down: a fresh press
        session.handle(InputEvent::GamepadDisconnected(0));
        session.handle(InputEvent::GamepadPoll {
            slot: 0,
            buttons: vec![true],
        });
        assert!(!session.scan_state().is_scanning);
        assert_eq!(session.state().total_correct + session.state().total_incorrect, 1);
    }

    #[test]
    fn test_disabling_switch_mid_scan_clears_scanning() {
        let mut owner = SettingsOwner::new(AccessibilitySettings {
            switch_input: true,
            ..Default::default()
        });
        let mut session = Session::new(17, owner.snapshot(), 0);
        let target = session.round().target_index().unwrap();
        session.handle(InputEvent::Key(KeyPress::new(Key::Digit(target as u8 + 1))));
        session.handle(InputEvent::SwitchPress);
        assert!(session.scan_state().is_scanning);
        assert!(session.is_timer_armed(TimerKind::ScanTick));
        assert_eq!(session.highlight(), Some(target));

        let snapshot = owner.apply(SettingsPatch {
            name: SettingName::SwitchInput,
            value: false,
        });
        session.update_settings(snapshot);
        assert!(!session.is_timer_armed(TimerKind::ScanTick));
        let scan = session.scan_state();
        assert!(!scan.is_scanning);
        assert_eq!(scan.highlight_index, None);
        assert_eq!(session.highlight(), None);

        // Switch keys and the switch itself are now inert
        let interval = scan.scan_interval_ms;
        session.advance_to(interval * 5);
        session.handle(InputEvent::SwitchPress);
        session.handle(InputEvent::Key(KeyPress::new(Key::Space)));
        assert!(!session.scan_state().is_scanning);
        assert_eq!(session.state().total_correct + session.state().total_incorrect, 0);
        let last_render = session.take_effects().into_iter().rev().find_map(|e| match e {
            Effect::Render(snapshot) => Some(snapshot),
            _ => None,
        });
        assert_eq!(last_render.map(|snapshot| snapshot.highlight), Some(None));
    }

    #[test]
    fn test_pause_and_resume() {
        let mut session = Session::new(4, auto_advance(3), 0);
        session.handle(InputEvent::Transcript("pause".into()));
        assert!(session.is_paused());
        assert!(!session.is_timer_armed(TimerKind::AutoAdvance));

        let target = session.round().target_index().unwrap();
        session.handle(InputEvent::Pointer(target));
        assert_eq!(session.state().score, 0);
        session.advance_to(10_000);
        assert_eq!(session.generation(), 1);

        session.handle(InputEvent::Transcript("start".into()));
        assert!(!session.is_paused());
        assert!(session.is_timer_armed(TimerKind::AutoAdvance));
        session.advance_to(13_000);
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn test_voice_toggle_round_trips_through_settings_owner() {
        let mut owner = SettingsOwner::default();
        let mut session = Session::new(4, owner.snapshot(), 0);
        session.take_effects();

        session.handle(InputEvent::Transcript("high contrast please".into()));
        let patches: Vec<SettingsPatch> = session
            .take_effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::ApplySettings(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(
            patches,
            vec![SettingsPatch {
                name: SettingName::HighContrast,
                value: true
            }]
        );
        // Game state untouched
        assert_eq!(session.state(), &GameState::default());

        for patch in patches {
            let snapshot = owner.apply(patch);
            session.update_settings(snapshot);
        }
        assert!(session.settings().high_contrast);
    }

    #[test]
    fn test_enabling_auto_advance_mid_round_arms_timer() {
        let mut owner = SettingsOwner::default();
        let mut session = Session::new(4, owner.snapshot(), 0);
        session.advance_to(1000);
        assert!(!session.is_timer_armed(TimerKind::AutoAdvance));
        let snapshot = owner.apply(SettingsPatch {
            name: SettingName::AutoAdvance,
            value: true,
        });
        session.update_settings(snapshot);
        assert!(session.is_timer_armed(TimerKind::AutoAdvance));
        session.advance_to(11_000);
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn test_permission_denied_toasts_once() {
        let mut session = Session::new(4, AccessibilitySettings::default(), 0);
        session.take_effects();
        session.handle(InputEvent::RecognitionError(RecognitionError::PermissionDenied));
        session.handle(InputEvent::RecognitionError(RecognitionError::PermissionDenied));
        let toasts: Vec<Toast> = session
            .take_effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::Toast(t) => Some(t),
                _ => None,
            })
            .collect();
        assert_eq!(toasts.len(), 1);
        assert!(toasts[0].destructive);
        assert!(session.voice_denied());

        let target = session.round().target_index().unwrap();
        session.handle(InputEvent::Transcript(format!("{}", target + 1)));
        assert_eq!(session.state().score, 0);

        // Non-fatal errors are ignored
        session.handle(InputEvent::RecognitionError(RecognitionError::Network));
        assert!(session.take_effects().is_empty());
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = Session::new(77, AccessibilitySettings::default(), 0);
        let mut b = Session::new(77, AccessibilitySettings::default(), 0);
        for _ in 0..5 {
            assert_eq!(a.round(), b.round());
            a.handle(InputEvent::Transcript("next".into()));
            b.handle(InputEvent::Key(KeyPress::ctrl(Key::Char('n'))));
        }
        assert_eq!(a.round(), b.round());
    }

    #[test]
    fn test_audio_off_session_is_silent() {
        let settings = AccessibilitySettings {
            audio_enabled: false,
            ..Default::default()
        };
        let mut session = Session::new(2, settings, 0);
        session.advance_to(1000);
        assert!(spoken(&session.take_effects()).is_empty());
    }

    #[test]
    fn test_restart_resets_progress() {
        let mut session = Session::new(2, AccessibilitySettings::default(), 0);
        let target = session.round().target_index().unwrap();
        session.handle(InputEvent::Pointer(target));
        session.restart(3);
        assert_eq!(session.state(), &GameState::default());
        assert_eq!(session.generation(), 2);
        assert!(!session.is_timer_armed(TimerKind::CelebrationCooldown));
    }
}
