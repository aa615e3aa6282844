//! Cooperative scheduler
//!
//! Single-threaded, non-preemptive: each registered task is stepped at its
//! period, highest priority first within a pass.

pub mod task_list;

pub use task_list::{CooperativeTask, SchedulerError, TaskList, TaskStats, MAX_TASKS};
