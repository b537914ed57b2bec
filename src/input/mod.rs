//! Input channels
//!
//! Each channel turns one kind of raw input into [`SelectionIntent`]s:
//! - `keyboard`: pointer clicks and key presses
//! - `voice`: finalized speech recognition transcripts
//! - `switch_scan`: single-switch scanning (keys or gamepad buttons)
//! - `auto_advance`: round timeout

pub mod auto_advance;
pub mod keyboard;
pub mod switch_scan;
pub mod voice;

pub use auto_advance::AutoAdvanceTimer;
pub use keyboard::{Key, KeyPress, PointerInput, PointerKeyboard};
pub use switch_scan::{GamepadEdges, ScanState, SwitchCommand, SwitchOutput, SwitchScan};
pub use voice::{VoiceChannel, parse_transcript};

pub use crate::sim::resolver::{Channel, SelectionIntent};
use crate::sim::round::Round;

/// Common capability of every input channel
pub trait IntentSource {
    /// Raw input the channel consumes
    type Input: ?Sized;

    fn channel(&self) -> Channel;

    /// Whether the channel currently produces intents
    fn is_enabled(&self) -> bool;

    /// Map one raw input to at most one intent
    fn on_input(&mut self, input: &Self::Input) -> Option<SelectionIntent>;

    /// A new round replaced the previous one
    fn reset_for_round(&mut self, _round: &Round) {}
}

/// Feed `input` through `source`, tagging the intent with its channel.
/// Disabled channels drop everything.
pub fn poll<S: IntentSource>(
    source: &mut S,
    input: &S::Input,
) -> Option<(Channel, SelectionIntent)> {
    let channel = source.channel();
    if !source.is_enabled() {
        log::debug!("{:?} channel disabled, dropping input", channel);
        return None;
    }
    source.on_input(input).map(|intent| (channel, intent))
}
