//! Schedule (solution) model.
//!
//! The record handed to downstream consumers after a successful solve:
//! one timed assignment per (job, task) plus the formation-yard occupancy
//! profile and its peak. The Gantt and occupancy-curve renderers consume
//! this type; they are not part of this crate.

use serde::{Deserialize, Serialize};

/// A solved (job, task) start with its derived end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    /// Job the task belongs to.
    pub job_id: String,
    /// Position within the job's task sequence.
    pub task_index: usize,
    /// Machine the task runs on, if any.
    pub machine: Option<String>,
    /// Solved start time (minutes).
    pub start_min: i64,
    /// Start plus fixed duration (minutes).
    pub end_min: i64,
}

/// A complete solved yard schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YardSchedule {
    /// One entry per (job, task), in instance order.
    pub assignments: Vec<TaskAssignment>,
    /// Trains present in the formation yard at each slot boundary.
    pub formation_occupancy: Vec<i64>,
    /// Peak simultaneous formation-yard occupancy.
    pub peak: i64,
}

impl YardSchedule {
    /// Assignments belonging to one job, in task order.
    pub fn assignments_for_job(&self, job_id: &str) -> Vec<&TaskAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.job_id == job_id)
            .collect()
    }

    /// The assignment of one specific task.
    pub fn assignment(&self, job_id: &str, task_index: usize) -> Option<&TaskAssignment> {
        self.assignments
            .iter()
            .find(|a| a.job_id == job_id && a.task_index == task_index)
    }

    /// Assignments running on one machine.
    pub fn assignments_for_machine(&self, machine_id: &str) -> Vec<&TaskAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.machine.as_deref() == Some(machine_id))
            .collect()
    }

    /// Time the last task ends (minutes); 0 for an empty schedule.
    pub fn makespan_min(&self) -> i64 {
        self.assignments.iter().map(|a| a.end_min).max().unwrap_or(0)
    }
}
