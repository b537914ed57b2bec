//! Auto-advance channel
//!
//! While enabled, every round start arms one timer; expiry yields `NextRound`.
//! The timer itself lives in the session scheduler so a round change cancels
//! it together with every other round-bound timer.

use super::IntentSource;
use crate::settings::AccessibilitySettings;
use crate::sim::resolver::{Channel, SelectionIntent};
use crate::sim::schedule::{Scheduler, Timer, TimerKind};

#[derive(Debug, Clone, Default)]
pub struct AutoAdvanceTimer {
    duration_ms: Option<u64>,
}

impl AutoAdvanceTimer {
    pub fn new(settings: &AccessibilitySettings) -> Self {
        Self {
            duration_ms: settings.auto_advance_ms(),
        }
    }

    /// Pick up a new settings snapshot. Returns true when enablement changed.
    pub fn configure(&mut self, settings: &AccessibilitySettings) -> bool {
        let next = settings.auto_advance_ms();
        let changed = next.is_some() != self.duration_ms.is_some();
        self.duration_ms = next;
        changed
    }

    /// Replace any pending timer with one for `generation`
    pub fn arm(&self, scheduler: &mut Scheduler, now_ms: u64, generation: u64) -> bool {
        scheduler.cancel_kind(TimerKind::AutoAdvance);
        match self.duration_ms {
            Some(duration) => {
                scheduler.schedule(TimerKind::AutoAdvance, now_ms + duration, generation);
                true
            }
            None => false,
        }
    }

    pub fn disarm(&self, scheduler: &mut Scheduler) {
        scheduler.cancel_kind(TimerKind::AutoAdvance);
    }
}

impl IntentSource for AutoAdvanceTimer {
    type Input = Timer;

    fn channel(&self) -> Channel {
        Channel::AutoAdvance
    }

    fn is_enabled(&self) -> bool {
        self.duration_ms.is_some()
    }

    /// Expiry of this channel's timer means "next round"
    fn on_input(&mut self, timer: &Timer) -> Option<SelectionIntent> {
        (timer.kind == TimerKind::AutoAdvance).then_some(SelectionIntent::NextRound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::poll;

    fn enabled(secs: u32) -> AccessibilitySettings {
        AccessibilitySettings {
            auto_advance: true,
            auto_advance_time: secs,
            ..Default::default()
        }
    }

    #[test]
    fn test_disabled_never_arms() {
        let timer = AutoAdvanceTimer::new(&AccessibilitySettings::default());
        let mut scheduler = Scheduler::new();
        assert!(!timer.arm(&mut scheduler, 0, 1));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_arm_replaces_previous_timer() {
        let timer = AutoAdvanceTimer::new(&enabled(5));
        let mut scheduler = Scheduler::new();
        assert!(timer.arm(&mut scheduler, 0, 1));
        assert!(timer.arm(&mut scheduler, 1000, 2));
        assert_eq!(scheduler.len(), 1);
        let pending = scheduler.pending(TimerKind::AutoAdvance).unwrap();
        assert_eq!((pending.due_ms, pending.generation), (6000, 2));
    }

    #[test]
    fn test_configure_reports_toggle() {
        let mut timer = AutoAdvanceTimer::new(&AccessibilitySettings::default());
        assert!(timer.configure(&enabled(10)));
        assert!(!timer.configure(&enabled(20)));
        let mut scheduler = Scheduler::new();
        timer.arm(&mut scheduler, 0, 1);
        assert_eq!(scheduler.pending(TimerKind::AutoAdvance).unwrap().due_ms, 20_000);
        assert!(timer.configure(&AccessibilitySettings::default()));
    }

    #[test]
    fn test_expiry_yields_next_round() {
        let mut timer = AutoAdvanceTimer::new(&enabled(3));
        let mut scheduler = Scheduler::new();
        timer.arm(&mut scheduler, 0, 1);
        scheduler.schedule(TimerKind::ScanTick, 3000, 1);

        let expired = scheduler.pop_due(3000).unwrap();
        assert_eq!(expired.kind, TimerKind::AutoAdvance);
        assert_eq!(
            poll(&mut timer, &expired),
            Some((Channel::AutoAdvance, SelectionIntent::NextRound))
        );
        let other = scheduler.pop_due(3000).unwrap();
        assert_eq!(poll(&mut timer, &other), None);

        timer.configure(&AccessibilitySettings::default());
        assert_eq!(poll(&mut timer, &expired), None);
    }
}
