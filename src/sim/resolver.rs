//! Command resolution
//!
//! Maps a channel-agnostic [`SelectionIntent`] onto an [`Action`] for the
//! current round. Stateless: correctness is decided here, score arithmetic
//! lives in [`super::scoring`].

use serde::{Deserialize, Serialize};

use super::piece::Piece;
use super::round::Round;
use super::scoring::GameState;
use crate::settings::{AccessibilitySettings, SettingName, SettingsPatch};

/// Input source an intent came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    PointerKeyboard,
    Voice,
    SwitchScan,
    AutoAdvance,
}

/// Normalized instruction produced by an input channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionIntent {
    /// Choose option `index` (0-based)
    Select(usize),
    /// Move the external highlight without choosing
    Highlight(usize),
    /// Choose whatever is currently highlighted
    ActivateHighlight,
    Repeat,
    Help,
    NextRound,
    Pause,
    Resume,
    ToggleSetting(SettingName),
}

impl SelectionIntent {
    /// Intents that only make sense for the round they were issued against
    pub fn is_round_bound(&self) -> bool {
        matches!(
            self,
            SelectionIntent::Select(_)
                | SelectionIntent::Highlight(_)
                | SelectionIntent::ActivateHighlight
                | SelectionIntent::NextRound
        )
    }

    /// Intents that pick or point at an option
    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            SelectionIntent::Select(_)
                | SelectionIntent::Highlight(_)
                | SelectionIntent::ActivateHighlight
        )
    }
}

/// Something to be said that is not tied to a scoring transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Restate the target
    Target,
    Help {
        level: u32,
        score: u64,
        option_count: usize,
        channel: Channel,
    },
}

/// Result of resolving an intent against a round
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Correct(Piece),
    Incorrect(Piece),
    Highlight { index: usize, piece: Piece },
    Announce(Prompt),
    /// Drop the current round without scoring and generate a new one
    ForceAdvance,
    /// Forwarded to the settings owner
    SettingsPatch(SettingsPatch),
    Pause,
    Resume,
}

/// Everything resolution reads
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub round: &'a Round,
    pub state: &'a GameState,
    pub settings: &'a AccessibilitySettings,
    /// Externally highlighted option, if any
    pub highlight: Option<usize>,
    pub source: Channel,
}

fn select_at(round: &Round, index: usize) -> Option<Action> {
    let Some(piece) = round.option(index) else {
        log::debug!(
            "Select({}) out of range for {} options",
            index,
            round.option_count()
        );
        return None;
    };
    if piece.matches(&round.target) {
        Some(Action::Correct(piece.clone()))
    } else {
        Some(Action::Incorrect(piece.clone()))
    }
}

/// Resolve `intent` for the current round; `None` means "no-op"
pub fn resolve(intent: &SelectionIntent, ctx: &ResolveContext<'_>) -> Option<Action> {
    match *intent {
        SelectionIntent::Select(index) => select_at(ctx.round, index),
        SelectionIntent::Highlight(index) => ctx.round.option(index).map(|piece| Action::Highlight {
            index,
            piece: piece.clone(),
        }),
        SelectionIntent::ActivateHighlight => match ctx.highlight {
            Some(index) => select_at(ctx.round, index),
            None => {
                log::debug!("Activate with nothing highlighted");
                None
            }
        },
        SelectionIntent::Repeat => Some(Action::Announce(Prompt::Target)),
        SelectionIntent::Help => Some(Action::Announce(Prompt::Help {
            level: ctx.state.level,
            score: ctx.state.score,
            option_count: ctx.round.option_count(),
            channel: ctx.source,
        })),
        SelectionIntent::NextRound => Some(Action::ForceAdvance),
        SelectionIntent::Pause => Some(Action::Pause),
        SelectionIntent::Resume => Some(Action::Resume),
        SelectionIntent::ToggleSetting(name) => {
            Some(Action::SettingsPatch(ctx.settings.toggle_patch(name)))
        }
    }
}
