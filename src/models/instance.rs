//! Problem instance.
//!
//! Bundles the in-memory records handed over by the external spreadsheet
//! reader — jobs, resources, correspondence pairs — and derives the
//! planning horizon and the occupancy slot grid from them. The instance
//! is the single input to model construction; it owns no solver state.

use serde::{Deserialize, Serialize};

use super::correspondence::CorrespondencePair;
use super::job::{Job, JobRole};
use super::resource::{Resource, YardRole};

/// Width of one occupancy slot (minutes).
pub const SLOT_MIN: i64 = 15;

/// A complete scheduling problem: jobs, resources, correspondences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Instance {
    /// All trains, arrivals and departures.
    pub jobs: Vec<Job>,
    /// All machines and yard zones.
    pub resources: Vec<Resource>,
    /// Raw wagon correspondence table.
    pub correspondences: Vec<CorrespondencePair>,
}

impl Instance {
    /// Creates an empty instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a job.
    pub fn with_job(mut self, job: Job) -> Self {
        self.jobs.push(job);
        self
    }

    /// Adds a resource.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Adds a correspondence row.
    pub fn with_correspondence(mut self, pair: CorrespondencePair) -> Self {
        self.correspondences.push(pair);
        self
    }

    /// Looks up a job by id.
    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// Looks up a resource by id.
    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Arrival jobs, in instance order.
    pub fn arrivals(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|j| j.role == JobRole::Arrival)
    }

    /// Departure jobs, in instance order.
    pub fn departures(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|j| j.role == JobRole::Departure)
    }

    /// Machines, in instance order.
    pub fn machines(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(|r| r.is_machine())
    }

    /// Yard zones, in instance order.
    pub fn yards(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(|r| !r.is_machine())
    }

    /// The yard zone with the given role, if present.
    pub fn yard_with_role(&self, role: YardRole) -> Option<&Resource> {
        self.yards().find(|r| r.yard_role() == Some(role))
    }

    /// Planning horizon: the latest relevant event — the last departure
    /// due time or the last arrival's release plus its total handling
    /// time — rounded up to a whole slot. At least one slot wide.
    pub fn horizon_min(&self) -> i64 {
        let last_event = self
            .jobs
            .iter()
            .map(|j| match j.role {
                JobRole::Arrival => j.timetable_min + j.total_duration_min(),
                JobRole::Departure => j.timetable_min,
            })
            .max()
            .unwrap_or(0);
        let rounded = last_event.div_euclid(SLOT_MIN) * SLOT_MIN;
        let rounded = if rounded < last_event {
            rounded + SLOT_MIN
        } else {
            rounded
        };
        rounded.max(SLOT_MIN)
    }

    /// Number of slot boundaries on the grid `0, 15, …, horizon`.
    pub fn slot_count(&self) -> usize {
        (self.horizon_min() / SLOT_MIN) as usize + 1
    }

    /// Absolute time of a slot boundary (minutes).
    pub fn slot_time(&self, slot: usize) -> i64 {
        slot as i64 * SLOT_MIN
    }
}
