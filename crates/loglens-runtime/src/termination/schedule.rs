//! The staged termination plan as a pure value.
//!
//! The schedule never sleeps or kills anything itself. The controller asks
//! for the next deadline, sleeps until it, and executes whatever
//! [`TerminationSchedule::take_due`] hands back. Tests drive it with
//! explicit instants.

use std::fmt;
use std::time::Duration;

use loglens_core::TerminationSettings;
use tokio::time::Instant;

/// One step of the escalating shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Stop consuming the old session's output.
    Detach,
    /// Kill through the owned child handle.
    SignalHandle,
    /// SIGKILL the producer's process group.
    KillGroup,
    /// Kill any process whose command line looks like a producer.
    Sweep,
    /// SIGKILL the original pid.
    KillPid,
    /// Report `stopped` regardless of what happened above.
    Ceiling,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detach => "detach",
            Self::SignalHandle => "signal-handle",
            Self::KillGroup => "kill-group",
            Self::Sweep => "sweep",
            Self::KillPid => "kill-pid",
            Self::Ceiling => "ceiling",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct TerminationSchedule {
    started_at: Instant,
    /// Stages not yet handed out, ordered by offset.
    pending: Vec<(Stage, Duration)>,
    completed: Vec<Stage>,
    closed: bool,
    notified: bool,
}

impl TerminationSchedule {
    pub fn new(started_at: Instant, settings: &TerminationSettings) -> Self {
        let mut pending = vec![
            (Stage::Detach, Duration::ZERO),
            (Stage::SignalHandle, Duration::ZERO),
            (Stage::KillGroup, Duration::from_millis(settings.group_kill_after_ms)),
            (Stage::Sweep, Duration::from_millis(settings.sweep_after_ms)),
            (Stage::KillPid, Duration::from_millis(settings.pid_kill_after_ms)),
            (Stage::Ceiling, Duration::from_millis(settings.ceiling_ms)),
        ];
        // Stable: stages sharing an offset keep their escalation order.
        pending.sort_by_key(|&(_, offset)| offset);

        Self {
            started_at,
            pending,
            completed: Vec::new(),
            closed: false,
            notified: false,
        }
    }

    pub const fn started_at(&self) -> Instant {
        self.started_at
    }

    /// When the next pending stage becomes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.first().map(|&(_, offset)| self.started_at + offset)
    }

    /// Remove and return every stage due at `now`, in escalation order.
    pub fn take_due(&mut self, now: Instant) -> Vec<Stage> {
        let elapsed = now.saturating_duration_since(self.started_at);
        let due = self.pending.iter().take_while(|&&(_, offset)| offset <= elapsed).count();
        let stages: Vec<Stage> = self.pending.drain(..due).map(|(stage, _)| stage).collect();
        self.completed.extend(&stages);
        stages
    }

    pub fn has_run(&self, stage: Stage) -> bool {
        self.completed.contains(&stage)
    }

    /// Record that the producer is confirmed gone.
    ///
    /// Returns the cleanup to run right away: a group kill, if one has not
    /// happened, to catch children left in the group. The pid kill is
    /// cancelled since the pid may be recycled once reaped, and the ceiling
    /// is dropped because the caller reports stopped now. A pending sweep
    /// stays on its timer; it matches by command line, not pid.
    pub fn close(&mut self) -> Vec<Stage> {
        if self.closed {
            return Vec::new();
        }
        self.closed = true;

        let cleanup = if self.has_run(Stage::KillGroup) {
            Vec::new()
        } else {
            self.completed.push(Stage::KillGroup);
            vec![Stage::KillGroup]
        };
        self.pending.retain(|&(stage, _)| stage == Stage::Sweep);
        cleanup
    }

    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Claim the right to send the stopped notification. Returns `true`
    /// exactly once per schedule.
    pub fn claim_notification(&mut self) -> bool {
        if self.notified {
            return false;
        }
        self.notified = true;
        true
    }

    /// Stopped has been reported and no stage is left to hand out.
    pub fn is_finished(&self) -> bool {
        self.notified && self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn schedule() -> (TerminationSchedule, Instant) {
        let start = Instant::now();
        (TerminationSchedule::new(start, &TerminationSettings::default()), start)
    }

    #[test]
    fn test_immediate_stages() {
        let (mut schedule, start) = schedule();
        assert_eq!(schedule.next_deadline(), Some(start));
        assert_eq!(schedule.take_due(start), vec![Stage::Detach, Stage::SignalHandle]);
        assert_eq!(schedule.next_deadline(), Some(start + ms(100)));
    }

    #[test]
    fn test_full_escalation_order() {
        let (mut schedule, start) = schedule();
        let mut seen = Vec::new();
        for offset in [0, 99, 100, 250, 400, 799, 800] {
            seen.extend(schedule.take_due(start + ms(offset)));
        }
        assert_eq!(
            seen,
            vec![
                Stage::Detach,
                Stage::SignalHandle,
                Stage::KillGroup,
                Stage::Sweep,
                Stage::KillPid,
                Stage::Ceiling
            ]
        );
        assert_eq!(schedule.next_deadline(), None);
    }

    #[test]
    fn test_late_wakeup_returns_all_due_in_order() {
        let (mut schedule, start) = schedule();
        assert_eq!(
            schedule.take_due(start + ms(450)),
            vec![
                Stage::Detach,
                Stage::SignalHandle,
                Stage::KillGroup,
                Stage::Sweep,
                Stage::KillPid
            ]
        );
    }

    #[test]
    fn test_each_stage_handed_out_once() {
        let (mut schedule, start) = schedule();
        schedule.take_due(start + ms(150));
        assert!(schedule.take_due(start + ms(150)).is_empty());
        assert!(schedule.has_run(Stage::KillGroup));
        assert!(!schedule.has_run(Stage::Sweep));
    }

    #[test]
    fn test_close_before_group_kill_runs_it_and_keeps_sweep() {
        let (mut schedule, start) = schedule();
        schedule.take_due(start);

        assert_eq!(schedule.close(), vec![Stage::KillGroup]);
        assert!(schedule.is_closed());
        assert_eq!(schedule.next_deadline(), Some(start + ms(200)));
        assert_eq!(schedule.take_due(start + ms(1000)), vec![Stage::Sweep]);
        assert_eq!(schedule.next_deadline(), None);
        assert!(!schedule.has_run(Stage::KillPid));
        assert!(!schedule.has_run(Stage::Ceiling));
    }

    #[test]
    fn test_finished_waits_for_sweep() {
        let (mut schedule, start) = schedule();
        schedule.take_due(start);
        schedule.close();
        assert!(schedule.claim_notification());
        assert!(!schedule.is_finished());

        schedule.take_due(start + ms(200));
        assert!(schedule.is_finished());
    }

    #[test]
    fn test_close_after_sweep_cancels_pid_kill() {
        let (mut schedule, start) = schedule();
        schedule.take_due(start + ms(300));
        assert!(schedule.close().is_empty());
        assert_eq!(schedule.next_deadline(), None);
        assert!(!schedule.has_run(Stage::KillPid));
    }

    #[test]
    fn test_close_after_group_kill_needs_nothing() {
        let (mut schedule, start) = schedule();
        schedule.take_due(start + ms(120));
        assert!(schedule.close().is_empty());
        assert!(schedule.close().is_empty());
    }

    #[test]
    fn test_notification_claimed_once() {
        let (mut schedule, start) = schedule();
        schedule.take_due(start + ms(800));
        assert!(!schedule.is_finished());
        assert!(schedule.claim_notification());
        assert!(!schedule.claim_notification());
        assert!(schedule.is_finished());
    }

    #[test]
    fn test_custom_offsets() {
        let start = Instant::now();
        let settings = TerminationSettings {
            group_kill_after_ms: 10,
            sweep_after_ms: 10,
            pid_kill_after_ms: 20,
            ceiling_ms: 30,
        };
        let mut schedule = TerminationSchedule::new(start, &settings);
        schedule.take_due(start);
        assert_eq!(schedule.take_due(start + ms(10)), vec![Stage::KillGroup, Stage::Sweep]);
        assert_eq!(schedule.next_deadline(), Some(start + ms(20)));
    }
}
