//! Priority/period task list
//!
//! Tasks are plain state machines with a non-blocking `step`. The list
//! decides which of them are due and runs them highest priority first; it
//! never preempts a running step.

use heapless::Vec;

/// Maximum number of registered tasks
pub const MAX_TASKS: usize = 8;

/// A resumable unit of work driven by the task list
pub trait CooperativeTask {
    /// Short name for logging and statistics
    fn name(&self) -> &'static str;

    /// Run one period of work; must return without blocking
    fn step(&mut self, now_ms: u32);

    /// Bring any owned actuators to rest
    fn shutdown(&mut self) {}
}

/// Registration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerError {
    /// All task slots are in use
    Full,
    /// A period of zero would make the task always due
    ZeroPeriod,
}

impl core::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SchedulerError::Full => f.write_str("task list full"),
            SchedulerError::ZeroPeriod => f.write_str("task period must be non-zero"),
        }
    }
}

/// Per-task profiling counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskStats {
    pub name: &'static str,
    pub priority: u8,
    pub period_ms: u32,
    /// Number of completed steps
    pub runs: u32,
    /// Steps that started a full period or more after they were due
    pub late_runs: u32,
}

struct Entry<'a> {
    task: &'a mut dyn CooperativeTask,
    priority: u8,
    period_ms: u32,
    /// `None` until the first run, which is due immediately
    next_due_ms: Option<u32>,
    runs: u32,
    late_runs: u32,
}

/// Registered tasks, kept sorted by descending priority
pub struct TaskList<'a, const N: usize = MAX_TASKS> {
    entries: Vec<Entry<'a>, N>,
}

impl<'a, const N: usize> TaskList<'a, N> {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register a task
    ///
    /// Tasks of equal priority run in registration order.
    pub fn add(
        &mut self,
        task: &'a mut dyn CooperativeTask,
        priority: u8,
        period_ms: u32,
    ) -> Result<(), SchedulerError> {
        if period_ms == 0 {
            return Err(SchedulerError::ZeroPeriod);
        }
        let index = self
            .entries
            .iter()
            .position(|e| e.priority < priority)
            .unwrap_or(self.entries.len());
        let entry = Entry {
            task,
            priority,
            period_ms,
            next_due_ms: None,
            runs: 0,
            late_runs: 0,
        };
        self.entries
            .insert(index, entry)
            .map_err(|_| SchedulerError::Full)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every task that is due at `now_ms`, once each
    ///
    /// Returns the number of tasks that ran. A task that fell more than a
    /// period behind is rescheduled from `now_ms` instead of catching up.
    pub fn run_ready(&mut self, now_ms: u32) -> usize {
        let mut ran = 0;
        for entry in self.entries.iter_mut() {
            let due = entry.next_due_ms.unwrap_or(now_ms);
            if !reached(now_ms, due) {
                continue;
            }

            let lag = now_ms.wrapping_sub(due);
            if lag >= entry.period_ms {
                entry.late_runs += 1;
            }

            entry.task.step(now_ms);
            entry.runs += 1;
            ran += 1;

            let next = due.wrapping_add(entry.period_ms);
            entry.next_due_ms = Some(if reached(now_ms, next) {
                now_ms.wrapping_add(entry.period_ms)
            } else {
                next
            });
        }
        ran
    }

    /// Milliseconds until the earliest task is due (zero if one is due now)
    pub fn next_due_in(&self, now_ms: u32) -> Option<u32> {
        self.entries
            .iter()
            .map(|e| match e.next_due_ms {
                Some(due) if !reached(now_ms, due) => due.wrapping_sub(now_ms),
                _ => 0,
            })
            .min()
    }

    /// Shut down every task, highest priority first
    pub fn shutdown_all(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.task.shutdown();
        }
    }

    /// Profiling counters in run order
    pub fn stats(&self) -> impl Iterator<Item = TaskStats> + '_ + use<'_, 'a, N> {
        self.entries.iter().map(|e| TaskStats {
            name: e.task.name(),
            priority: e.priority,
            period_ms: e.period_ms,
            runs: e.runs,
            late_runs: e.late_runs,
        })
    }
}

impl<const N: usize> Default for TaskList<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrapping-safe `now >= deadline`
fn reached(now_ms: u32, deadline_ms: u32) -> bool {
    (now_ms.wrapping_sub(deadline_ms) as i32) >= 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    struct Recorder<'r> {
        name: &'static str,
        log: &'r RefCell<std::vec::Vec<(&'static str, u32)>>,
        stopped: bool,
    }

    impl<'r> Recorder<'r> {
        fn new(name: &'static str, log: &'r RefCell<std::vec::Vec<(&'static str, u32)>>) -> Self {
            Self {
                name,
                log,
                stopped: false,
            }
        }
    }

    impl CooperativeTask for Recorder<'_> {
        fn name(&self) -> &'static str {
            self.name
        }

        fn step(&mut self, now_ms: u32) {
            self.log.borrow_mut().push((self.name, now_ms));
        }

        fn shutdown(&mut self) {
            self.stopped = true;
        }
    }

    #[test]
    fn test_higher_priority_runs_first() {
        let log = RefCell::new(std::vec::Vec::new());
        let mut low = Recorder::new("trigger", &log);
        let mut high = Recorder::new("motor", &log);
        let mut tasks: TaskList<'_, 4> = TaskList::new();
        tasks.add(&mut low, 1, 10).unwrap();
        tasks.add(&mut high, 2, 10).unwrap();

        assert_eq!(tasks.run_ready(0), 2);
        assert_eq!(*log.borrow(), [("motor", 0), ("trigger", 0)]);
    }

    #[test]
    fn test_period_is_respected() {
        let log = RefCell::new(std::vec::Vec::new());
        let mut fast = Recorder::new("fast", &log);
        let mut slow = Recorder::new("slow", &log);
        let mut tasks: TaskList<'_, 4> = TaskList::new();
        tasks.add(&mut fast, 1, 10).unwrap();
        tasks.add(&mut slow, 1, 25).unwrap();

        for now in 0..=50 {
            tasks.run_ready(now);
        }

        let runs: std::vec::Vec<u32> = tasks.stats().map(|s| s.runs).collect();
        assert_eq!(runs, [6, 3]);
        assert!(log.borrow().iter().all(|&(name, t)| match name {
            "fast" => t % 10 == 0,
            _ => t % 25 == 0,
        }));
    }

    #[test]
    fn test_late_runs_are_counted_and_not_replayed() {
        let log = RefCell::new(std::vec::Vec::new());
        let mut task = Recorder::new("motor", &log);
        let mut tasks: TaskList<'_, 2> = TaskList::new();
        tasks.add(&mut task, 1, 10).unwrap();

        tasks.run_ready(0);
        // Stalled for three periods
        assert_eq!(tasks.run_ready(35), 1);
        assert_eq!(tasks.run_ready(36), 0);
        assert_eq!(tasks.next_due_in(36), Some(9));

        let stats = tasks.stats().next().unwrap();
        assert_eq!(stats.runs, 2);
        assert_eq!(stats.late_runs, 1);
    }

    #[test]
    fn test_wraparound_keeps_period() {
        let log = RefCell::new(std::vec::Vec::new());
        let mut task = Recorder::new("motor", &log);
        let mut tasks: TaskList<'_, 2> = TaskList::new();
        tasks.add(&mut task, 1, 10).unwrap();

        let start = u32::MAX - 4;
        tasks.run_ready(start);
        assert_eq!(tasks.run_ready(start.wrapping_add(9)), 0);
        assert_eq!(tasks.run_ready(start.wrapping_add(10)), 1);
    }

    #[test]
    fn test_registration_errors() {
        let log = RefCell::new(std::vec::Vec::new());
        let mut a = Recorder::new("a", &log);
        let mut b = Recorder::new("b", &log);
        let mut c = Recorder::new("c", &log);
        let mut tasks: TaskList<'_, 1> = TaskList::new();

        assert_eq!(tasks.add(&mut a, 1, 0), Err(SchedulerError::ZeroPeriod));
        tasks.add(&mut b, 1, 10).unwrap();
        assert_eq!(tasks.add(&mut c, 1, 10), Err(SchedulerError::Full));
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_shutdown_reaches_every_task() {
        let log = RefCell::new(std::vec::Vec::new());
        let mut a = Recorder::new("a", &log);
        let mut b = Recorder::new("b", &log);
        {
            let mut tasks: TaskList<'_, 2> = TaskList::new();
            tasks.add(&mut a, 1, 10).unwrap();
            tasks.add(&mut b, 2, 10).unwrap();
            tasks.shutdown_all();
        }
        assert!(a.stopped && b.stopped);
    }
}
