//! Deterministic periodic timers
//!
//! Every periodic activity of a session (jump trajectory, obstacle scroll,
//! obstacle spawn, master tick) is a timer in one [`Scheduler`]. The host
//! feeds wall-clock time in, and due timers come out one at a time in a fixed
//! order, so nothing ever runs concurrently with anything else.

/// A periodic activity owned by a session
///
/// Declaration order is the tie-break when two timers fall due on the same
/// millisecond: movement first, then spawning, then the collision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Activity {
    Jump,
    Scroll,
    Spawn,
    MasterTick,
}

#[derive(Debug, Clone)]
struct Timer {
    activity: Activity,
    period_ms: u64,
    next_due_ms: u64,
}

/// Single-owner timer queue on a millisecond clock
#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock (time of the last fired timer or the last horizon reached)
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Start `activity`, first firing one period from now
    ///
    /// An already running timer for the same activity is replaced, which
    /// cancels its pending firing.
    pub fn schedule(&mut self, activity: Activity, period_ms: u64) {
        let period_ms = period_ms.max(1);
        let next_due_ms = self.now_ms + period_ms;
        match self.timers.iter_mut().find(|t| t.activity == activity) {
            Some(timer) => {
                timer.period_ms = period_ms;
                timer.next_due_ms = next_due_ms;
            }
            None => self.timers.push(Timer {
                activity,
                period_ms,
                next_due_ms,
            }),
        }
    }

    /// Change the period of a running timer, restarting its phase
    pub fn retime(&mut self, activity: Activity, period_ms: u64) {
        if self.is_scheduled(activity) {
            self.schedule(activity, period_ms);
        }
    }

    /// Stop `activity`. Returns whether it was running.
    pub fn cancel(&mut self, activity: Activity) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.activity != activity);
        self.timers.len() != before
    }

    /// Stop every activity
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_scheduled(&self, activity: Activity) -> bool {
        self.timers.iter().any(|t| t.activity == activity)
    }

    pub fn is_idle(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn period_ms(&self, activity: Activity) -> Option<u64> {
        self.timers
            .iter()
            .find(|t| t.activity == activity)
            .map(|t| t.period_ms)
    }

    /// Pop the earliest timer due at or before `horizon_ms`
    ///
    /// The clock moves to the timer's due time and the timer is re-armed one
    /// period later.
    pub fn pop_due(&mut self, horizon_ms: u64) -> Option<Activity> {
        let timer = self
            .timers
            .iter_mut()
            .filter(|t| t.next_due_ms <= horizon_ms)
            .min_by_key(|t| (t.next_due_ms, t.activity))?;

        self.now_ms = self.now_ms.max(timer.next_due_ms);
        timer.next_due_ms += timer.period_ms;
        Some(timer.activity)
    }

    /// Due time of the earliest pending timer
    pub fn next_due_ms(&self) -> Option<u64> {
        self.timers.iter().map(|t| t.next_due_ms).min()
    }

    /// Move the clock forward to `horizon_ms`
    ///
    /// Timers that are still overdue keep their due time and fire on the
    /// next `pop_due`; no firing is ever skipped.
    pub fn advance_to(&mut self, horizon_ms: u64) {
        self.now_ms = self.now_ms.max(horizon_ms);
    }
}
