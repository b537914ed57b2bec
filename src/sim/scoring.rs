//! Score, level and streak state machine
//!
//! Active --Correct--> Celebrating --cooldown--> Active (new round).
//! Incorrect answers leave the state untouched so the player can retry.

use serde::{Deserialize, Serialize};

use super::piece::Piece;
use super::resolver::Action;
use crate::consts::*;
use crate::settings::AccessibilitySettings;

/// Session progress (not persisted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub score: u64,
    /// 1..=5
    pub level: u32,
    /// Consecutive correct answers. Wrong answers do not reset it.
    pub streak: u32,
    pub total_correct: u32,
    /// Wrong picks, for display only
    pub total_incorrect: u32,
    /// Cooldown after a correct answer; selections are ignored
    pub celebrating: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            score: 0,
            level: MIN_LEVEL,
            streak: 0,
            total_correct: 0,
            total_incorrect: 0,
            celebrating: false,
        }
    }
}

/// What a scored selection did
#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    Correct {
        piece: Piece,
        score_delta: u64,
        score: u64,
        /// New level, if this answer levelled up
        level_up: Option<u32>,
        /// When the next round should be generated
        cooldown_ms: u64,
    },
    Incorrect {
        piece: Piece,
    },
}

/// Sole writer of [`GameState`]
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    state: GameState,
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_celebrating(&self) -> bool {
        self.state.celebrating
    }

    /// Score a resolved selection. Returns `None` for non-selection actions
    /// and for anything arriving while celebrating.
    pub fn apply(
        &mut self,
        action: &Action,
        settings: &AccessibilitySettings,
    ) -> Option<RoundOutcome> {
        let piece = match action {
            Action::Correct(piece) | Action::Incorrect(piece) => piece,
            _ => return None,
        };
        if self.state.celebrating {
            log::debug!("Ignoring selection of {} while celebrating", piece);
            return None;
        }
        Some(match action {
            Action::Correct(_) => self.on_correct(piece.clone(), settings),
            _ => self.on_incorrect(piece.clone()),
        })
    }

    fn on_correct(&mut self, piece: Piece, settings: &AccessibilitySettings) -> RoundOutcome {
        let state = &mut self.state;
        let score_delta = u64::from(state.level) * SCORE_PER_LEVEL;
        state.score += score_delta;
        state.streak += 1;
        state.total_correct += 1;

        // Delta never exceeds LEVEL_UP_EVERY, so at most one threshold per answer
        let level_up = if state.score % LEVEL_UP_EVERY == 0 && state.level < MAX_LEVEL {
            state.level += 1;
            log::info!("Level up -> {} at score {}", state.level, state.score);
            Some(state.level)
        } else {
            None
        };

        state.celebrating = true;

        RoundOutcome::Correct {
            piece,
            score_delta,
            score: state.score,
            level_up,
            cooldown_ms: settings.celebration_cooldown_ms(),
        }
    }

    fn on_incorrect(&mut self, piece: Piece) -> RoundOutcome {
        self.state.total_incorrect += 1;
        RoundOutcome::Incorrect { piece }
    }

    /// Cooldown elapsed
    pub fn finish_celebration(&mut self) {
        self.state.celebrating = false;
    }

    /// A forced advance cuts any celebration short
    pub fn force_advance(&mut self) {
        self.state.celebrating = false;
    }
}
