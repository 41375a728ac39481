//! Marshalling-yard train scheduling as mixed-integer linear programs.
//!
//! Schedules the handling tasks of arriving and departing freight trains
//! through a shared yard — machine and track availability calendars,
//! wagon correspondences between trains, yard capacity limits — and
//! minimizes the peak number of tracks simultaneously occupied in the
//! formation yard.
//!
//! The crate builds the *model*, not the numbers: time-indexed decision
//! variables, big-M-linearized disjunctions, calendar interval selectors
//! and derived occupancy indicators are emitted into a solver-independent
//! registry, then handed to an external MILP solver through `good_lp`.
//! Spreadsheet parsing and Gantt/occupancy rendering live in external
//! collaborators that exchange plain data types with this crate.
//!
//! # Modules
//!
//! - **`models`**: domain types — `Job`, `Task`, `Resource`, `Calendar`,
//!   `CorrespondenceMap`, `Instance`, `YardSchedule`
//! - **`milp`**: the formulation — variable factory, constraint
//!   generator, model assembly and solving
//! - **`validation`**: fail-fast input integrity checks
//!
//! # Example
//!
//! ```
//! use yard_schedule::milp::{SolveOptions, YardModel};
//! use yard_schedule::models::{
//!     CorrespondencePair, Instance, Job, Resource, Task, YardRole,
//! };
//!
//! let instance = Instance::new()
//!     .with_job(
//!         Job::arrival("A1", 0)
//!             .with_task(Task::new(15))
//!             .with_task(Task::new(15).with_machine("DEB")),
//!     )
//!     .with_job(
//!         Job::departure("D1", 150)
//!             .with_task(Task::new(15))
//!             .with_task(Task::new(15)),
//!     )
//!     .with_resource(Resource::machine("DEB"))
//!     .with_resource(Resource::yard("Y-FOR", YardRole::Formation, 3))
//!     .with_correspondence(CorrespondencePair::new("A1", "D1"));
//!
//! let model = YardModel::build(&instance)?;
//! let outcome = model.solve(&SolveOptions::default())?;
//! if let Some(solution) = outcome.solution {
//!     println!("peak tracks: {:?}", solution.peak());
//! }
//! # Ok::<(), yard_schedule::YardError>(())
//! ```

pub mod error;
pub mod milp;
pub mod models;
pub mod validation;

pub use error::{Result, YardError};
