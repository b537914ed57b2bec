//! Single-switch scanning
//!
//! The first press starts cycling a highlight through the options plus one
//! extra "activate" slot. The next press picks whatever is highlighted. Any
//! gamepad button works as the switch.

use serde::{Deserialize, Serialize};

use super::IntentSource;
use super::keyboard::{Key, KeyPress};
use crate::consts::*;
use crate::sim::resolver::{Channel, SelectionIntent};
use crate::sim::round::Round;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanState {
    /// `None` until scanning starts; `Some(option_count)` is the activate slot
    pub highlight_index: Option<usize>,
    pub is_scanning: bool,
    pub scan_interval_ms: u64,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            highlight_index: None,
            is_scanning: false,
            scan_interval_ms: SCAN_INTERVAL_DEFAULT_MS,
        }
    }
}

/// Switch-mode key bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCommand {
    Press,
    Faster,
    Slower,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutput {
    /// Scanning began at index 0
    Started,
    /// `Select(i)` for an option, `ActivateHighlight` for the activate slot
    Intent(SelectionIntent),
    Stopped,
    SpeedChanged { interval_ms: u64, faster: bool },
}

#[derive(Debug, Clone)]
pub struct SwitchScan {
    enabled: bool,
    option_count: usize,
    state: ScanState,
    /// Result of the last command fed through [`IntentSource::on_input`]
    last_output: Option<SwitchOutput>,
}

impl SwitchScan {
    pub fn new(enabled: bool, option_count: usize) -> Self {
        Self {
            enabled,
            option_count,
            state: ScanState::default(),
            last_output: None,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// What the last polled command did, including the non-selecting
    /// outcomes (started, stopped, speed change)
    pub fn take_output(&mut self) -> Option<SwitchOutput> {
        self.last_output.take()
    }

    pub fn interval_ms(&self) -> u64 {
        self.state.scan_interval_ms
    }

    pub fn is_scanning(&self) -> bool {
        self.state.is_scanning
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.clear();
        }
        self.enabled = enabled;
    }

    fn clear(&mut self) {
        self.state.highlight_index = None;
        self.state.is_scanning = false;
    }

    /// Key binding while switch input is enabled
    pub fn command_for(&self, press: &KeyPress) -> Option<SwitchCommand> {
        if !self.enabled {
            return None;
        }
        match (press.key, press.ctrl) {
            (Key::Space | Key::Enter | Key::Numpad0, _) => Some(SwitchCommand::Press),
            (Key::ArrowUp, true) => Some(SwitchCommand::Faster),
            (Key::ArrowDown, true) => Some(SwitchCommand::Slower),
            (Key::Escape, _) => Some(SwitchCommand::Stop),
            _ => None,
        }
    }

    pub fn apply(&mut self, command: SwitchCommand) -> Option<SwitchOutput> {
        match command {
            SwitchCommand::Press => self.press(),
            SwitchCommand::Faster => self.adjust_interval(true),
            SwitchCommand::Slower => self.adjust_interval(false),
            SwitchCommand::Stop => self.stop(),
        }
    }

    pub fn press(&mut self) -> Option<SwitchOutput> {
        if !self.enabled {
            return None;
        }
        if !self.state.is_scanning {
            self.state.is_scanning = true;
            self.state.highlight_index = Some(0);
            return Some(SwitchOutput::Started);
        }

        let index = self.state.highlight_index.unwrap_or(0);
        self.state.is_scanning = false;
        let intent = if index < self.option_count {
            SelectionIntent::Select(index)
        } else {
            SelectionIntent::ActivateHighlight
        };
        Some(SwitchOutput::Intent(intent))
    }

    /// Scan interval elapsed; returns the new highlight
    pub fn tick(&mut self) -> Option<usize> {
        if !self.enabled || !self.state.is_scanning {
            return None;
        }
        let slots = self.option_count + 1;
        let next = self.state.highlight_index.map_or(0, |i| (i + 1) % slots);
        self.state.highlight_index = Some(next);
        Some(next)
    }

    fn adjust_interval(&mut self, faster: bool) -> Option<SwitchOutput> {
        let current = self.state.scan_interval_ms;
        let interval_ms = if faster {
            current.saturating_sub(SCAN_INTERVAL_STEP_MS)
        } else {
            current + SCAN_INTERVAL_STEP_MS
        }
        .clamp(SCAN_INTERVAL_MIN_MS, SCAN_INTERVAL_MAX_MS);
        self.state.scan_interval_ms = interval_ms;
        Some(SwitchOutput::SpeedChanged { interval_ms, faster })
    }

    pub fn stop(&mut self) -> Option<SwitchOutput> {
        if !self.state.is_scanning {
            return None;
        }
        self.state.is_scanning = false;
        Some(SwitchOutput::Stopped)
    }
}

impl IntentSource for SwitchScan {
    type Input = SwitchCommand;

    fn channel(&self) -> Channel {
        Channel::SwitchScan
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn on_input(&mut self, command: &SwitchCommand) -> Option<SelectionIntent> {
        self.last_output = self.apply(*command);
        match self.last_output {
            Some(SwitchOutput::Intent(intent)) => Some(intent),
            _ => None,
        }
    }

    fn reset_for_round(&mut self, round: &Round) {
        self.option_count = round.option_count();
        self.clear();
    }
}

/// Rising-edge detection over polled gamepad button snapshots
#[derive(Debug, Clone, Default)]
pub struct GamepadEdges {
    /// Previous button states per gamepad slot
    last: Vec<Vec<bool>>,
}

impl GamepadEdges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a poll of gamepad `slot`; returns the number of buttons that
    /// went from released to pressed
    pub fn poll(&mut self, slot: usize, buttons: &[bool]) -> usize {
        if self.last.len() <= slot {
            self.last.resize(slot + 1, Vec::new());
        }
        let last = &mut self.last[slot];
        let rising = buttons
            .iter()
            .enumerate()
            .filter(|&(i, &pressed)| pressed && !last.get(i).copied().unwrap_or(false))
            .count();
        last.clear();
        last.extend_from_slice(buttons);
        rising
    }

    /// Gamepad unplugged
    pub fn forget(&mut self, slot: usize) {
        if let Some(last) = self.last.get_mut(slot) {
            last.clear();
        }
    }
}
