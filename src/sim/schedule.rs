//! Cancellable one-shot timers tagged with the round they belong to
//!
//! Timers never call back into the game directly. The session pops due timers
//! and checks the generation tag before acting, so a timer that survived a
//! round change by mistake is still dropped.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Speak the target shortly after a round starts
    AnnounceTarget,
    /// Force the next round if the player has not answered
    AutoAdvance,
    /// End of the post-answer celebration
    CelebrationCooldown,
    /// Move the switch-scan highlight
    ScanTick,
}

/// Arming order, used to break ties between timers due at the same time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub id: TimerId,
    pub kind: TimerKind,
    pub due_ms: u64,
    /// Round generation the timer was armed for
    pub generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, kind: TimerKind, due_ms: u64, generation: u64) {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            kind,
            due_ms,
            generation,
        });
        log::trace!("Armed {:?} for {}ms (round {})", kind, due_ms, generation);
    }

    /// Cancel every timer of `kind`, returning how many were pending
    pub fn cancel_kind(&mut self, kind: TimerKind) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.kind != kind);
        before - self.timers.len()
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    pub fn pending(&self, kind: TimerKind) -> Option<&Timer> {
        self.timers.iter().find(|t| t.kind == kind)
    }

    /// Earliest due time among pending timers
    pub fn next_due(&self) -> Option<u64> {
        self.timers.iter().map(|t| t.due_ms).min()
    }

    /// Remove and return the earliest timer due at or before `now_ms`.
    /// Ties fire in arming order.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Timer> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;
        Some(self.timers.remove(index))
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_due_orders_by_time_then_arming() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::AutoAdvance, 300, 1);
        s.schedule(TimerKind::ScanTick, 100, 1);
        s.schedule(TimerKind::AnnounceTarget, 100, 1);

        assert_eq!(s.pop_due(50), None);
        assert_eq!(s.pop_due(1000).map(|t| t.kind), Some(TimerKind::ScanTick));
        assert_eq!(s.pop_due(1000).map(|t| t.kind), Some(TimerKind::AnnounceTarget));
        assert_eq!(s.pop_due(1000).map(|t| t.kind), Some(TimerKind::AutoAdvance));
        assert!(s.is_empty());
    }

    #[test]
    fn test_cancel_kind_and_all() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::CelebrationCooldown, 2000, 3);
        s.schedule(TimerKind::ScanTick, 1000, 3);
        s.schedule(TimerKind::ScanTick, 2000, 3);

        assert_eq!(s.cancel_kind(TimerKind::ScanTick), 2);
        assert_eq!(s.cancel_kind(TimerKind::ScanTick), 0);
        assert!(s.is_armed(TimerKind::CelebrationCooldown));
        s.cancel_all();
        assert_eq!(s.next_due(), None);
    }

    #[test]
    fn test_pending_reports_generation() {
        let mut s = Scheduler::new();
        s.schedule(TimerKind::AutoAdvance, 10_000, 7);
        assert_eq!(s.pending(TimerKind::AutoAdvance).map(|t| t.generation), Some(7));
        assert_eq!(s.next_due(), Some(10_000));
    }
}
