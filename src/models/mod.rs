//! Yard scheduling domain models.
//!
//! Core data types for marshalling-yard scheduling problems and
//! solutions: trains with ordered handling tasks, machines and yard
//! zones with weekly availability patterns, wagon correspondences, and
//! the solved schedule records handed to downstream renderers.

mod calendar;
mod correspondence;
mod instance;
mod job;
mod resource;
mod schedule;

pub use calendar::{Calendar, TimeWindow, WeeklyTiling, WeeklyWindow, WEEK_MIN};
pub use correspondence::{CorrespondenceMap, CorrespondencePair};
pub use instance::{Instance, SLOT_MIN};
pub use job::{Job, JobRole, Task};
pub use resource::{Resource, ResourceKind, YardRole};
pub use schedule::{TaskAssignment, YardSchedule};
