//! Job (train) model.
//!
//! A job is one physical train passing through the yard: an arrival to be
//! broken up, or a departure to be formed. Each job carries the ordered
//! sequence of handling tasks performed on it and one fixed timetable
//! event — the arrival (release) time or the departure (due) time.
//!
//! # Time Representation
//! All times are in whole minutes from the instance origin (a Monday
//! 00:00). The consumer defines which calendar date the origin maps to.

use serde::{Deserialize, Serialize};

/// Whether a train arrives at or departs from the yard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobRole {
    /// An inbound train: released at its timetable time, then broken up.
    Arrival,
    /// An outbound train: formed in the yard, gone at its timetable time.
    Departure,
}

/// One handling operation within a job's ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Fixed processing duration (minutes).
    pub duration_min: i64,
    /// Unit-capacity machine required, `None` if the task needs no machine.
    pub machine: Option<String>,
}

impl Task {
    /// Creates a machine-free task.
    pub fn new(duration_min: i64) -> Self {
        Self {
            duration_min,
            machine: None,
        }
    }

    /// Requires a machine for this task.
    pub fn with_machine(mut self, machine: impl Into<String>) -> Self {
        self.machine = Some(machine.into());
        self
    }
}

/// A train with its ordered task sequence.
///
/// Created once per timetable row; immutable after instance construction.
/// Invariant (enforced by the model, checked on any returned solution):
/// task *k*'s start + duration never exceeds task *k+1*'s start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: String,
    /// Arrival or departure.
    pub role: JobRole,
    /// Release time (arrival jobs) or due time (departure jobs), minutes.
    pub timetable_min: i64,
    /// Handling tasks, in execution order.
    pub tasks: Vec<Task>,
}

impl Job {
    /// Creates an arrival job released at `release_min`.
    pub fn arrival(id: impl Into<String>, release_min: i64) -> Self {
        Self {
            id: id.into(),
            role: JobRole::Arrival,
            timetable_min: release_min,
            tasks: Vec::new(),
        }
    }

    /// Creates a departure job due at `due_min`.
    pub fn departure(id: impl Into<String>, due_min: i64) -> Self {
        Self {
            id: id.into(),
            role: JobRole::Departure,
            timetable_min: due_min,
            tasks: Vec::new(),
        }
    }

    /// Appends a task to the sequence.
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Release time, for arrival jobs.
    pub fn release_min(&self) -> Option<i64> {
        matches!(self.role, JobRole::Arrival).then_some(self.timetable_min)
    }

    /// Due time, for departure jobs.
    pub fn due_min(&self) -> Option<i64> {
        matches!(self.role, JobRole::Departure).then_some(self.timetable_min)
    }

    /// Total processing duration across all tasks (minutes).
    pub fn total_duration_min(&self) -> i64 {
        self.tasks.iter().map(|t| t.duration_min).sum()
    }

    /// Number of tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Index of the de-coupling task of an arrival job: the last task,
    /// after which the wagons sit loose and the train has left the
    /// reception yard.
    pub fn decoupling_index(&self) -> usize {
        self.tasks.len().saturating_sub(1)
    }

    /// Index of the marshalling task of a departure job: the next-to-last
    /// task, whose completion pulls the formed train out of the formation
    /// yard and onto the departure yard.
    pub fn marshalling_index(&self) -> usize {
        self.tasks.len().saturating_sub(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrival_chain() -> Job {
        Job::arrival("A1", 120)
            .with_task(Task::new(15))
            .with_task(Task::new(45))
            .with_task(Task::new(15).with_machine("DEB"))
    }

    fn departure_chain() -> Job {
        Job::departure("D1", 900)
            .with_task(Task::new(15).with_machine("FOR"))
            .with_task(Task::new(150))
            .with_task(Task::new(15).with_machine("DEG"))
            .with_task(Task::new(20))
    }

    #[test]
    fn test_job_builder() {
        let job = arrival_chain();
        assert_eq!(job.id, "A1");
        assert_eq!(job.role, JobRole::Arrival);
        assert_eq!(job.release_min(), Some(120));
        assert_eq!(job.due_min(), None);
        assert_eq!(job.task_count(), 3);
        assert_eq!(job.total_duration_min(), 75);
        assert_eq!(job.tasks[2].machine.as_deref(), Some("DEB"));
    }

    #[test]
    fn test_departure_times() {
        let job = departure_chain();
        assert_eq!(job.release_min(), None);
        assert_eq!(job.due_min(), Some(900));
        assert_eq!(job.total_duration_min(), 200);
    }

    #[test]
    fn test_anchor_tasks() {
        assert_eq!(arrival_chain().decoupling_index(), 2);
        assert_eq!(departure_chain().marshalling_index(), 2);

        // Degenerate chains saturate instead of panicking.
        let single = Job::departure("D2", 100).with_task(Task::new(10));
        assert_eq!(single.marshalling_index(), 0);
    }

    #[test]
    fn test_serde_round_trip() {
        let job = departure_chain();
        let json = serde_json::to_string(&job).unwrap();
        let back: Job = serde_json::from_str(&json).unwrap();
        assert_eq!(job, back);
    }
}
