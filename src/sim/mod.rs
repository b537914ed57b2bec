//! Deterministic game core
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time comes from the host as a millisecond clock
//! - One event queue, processed in arrival order
//! - No speech, rendering or platform dependencies

pub mod piece;
pub mod resolver;
pub mod round;
pub mod schedule;
pub mod scoring;
pub mod session;

pub use piece::{COMBINATIONS, Color, Piece, Shape, TARGET_ID};
pub use resolver::{Action, Channel, Prompt, ResolveContext, SelectionIntent, resolve};
pub use round::{Round, generate_round};
pub use schedule::{Scheduler, Timer, TimerId, TimerKind};
pub use scoring::{GameState, RoundOutcome, ScoringEngine};
pub use session::{Effect, InputEvent, Session, Snapshot};
