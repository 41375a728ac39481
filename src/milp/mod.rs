//! Mixed-integer linear formulation of the yard scheduling problem.
//!
//! The pipeline runs leaf-first: availability calendars and resolved
//! correspondences feed a deterministic variable factory, constraint
//! families are emitted through an explicit [`ModelBuilder`] context,
//! and the assembler freezes everything into a [`YardModel`] that is the
//! only component touching the external MILP solver.
//!
//! # Modules
//!
//! - **`var`**: typed variable identities and the write-once registry
//! - **`expr`**: solver-independent linear expressions and constraints
//! - **`builder`**: the single-writer construction context
//! - **`disjunction`**: the shared big-M branch-selection combinator
//! - **`factory`**: variable allocation
//! - **`generator`**: constraint families
//! - **`model`**: assembly, solving, solution read-back

mod builder;
mod disjunction;
mod expr;
mod factory;
mod generator;
mod model;
mod var;

pub use builder::ModelBuilder;
pub use expr::{LinConstraint, LinExpr, Sense};
pub use model::{SolveOptions, SolveOutcome, SolveStatus, SolvedModel, YardModel};
pub use var::{TaskKey, VarDef, VarId, VarKind, VariableRegistry};

use std::collections::HashMap;

use crate::models::{Calendar, CorrespondenceMap, Instance, Job, JobRole, Resource, YardRole};

/// Read-only inputs shared by the factory and every constraint family.
pub(crate) struct ModelContext<'a> {
    pub instance: &'a Instance,
    /// Availability calendar per resource id.
    pub calendars: &'a HashMap<String, Calendar>,
    /// Resolved departure → arrivals correspondence map.
    pub feeds: &'a CorrespondenceMap,
}

/// Tasks grouped by the machine they require, in deterministic order:
/// machines in instance order, tasks in job then sequence order. Each
/// entry carries the task key and its duration.
pub(crate) fn machine_task_lists(instance: &Instance) -> Vec<(String, Vec<(TaskKey, i64)>)> {
    instance
        .machines()
        .map(|machine| {
            let mut tasks = Vec::new();
            for job in &instance.jobs {
                for (k, task) in job.tasks.iter().enumerate() {
                    if task.machine.as_deref() == Some(machine.id.as_str()) {
                        tasks.push((TaskKey::new(job.id.clone(), k), task.duration_min));
                    }
                }
            }
            (machine.id.clone(), tasks)
        })
        .collect()
}

/// Task indices of `job` performed inside a yard of the given role.
///
/// Reception hosts the whole arrival chain; formation hosts the
/// departure chain through the marshalling task; the departure yard
/// hosts what follows it. Role/job combinations that never meet yield
/// an empty range.
pub(crate) fn yard_task_range(job: &Job, role: YardRole) -> std::ops::Range<usize> {
    match (role, job.role) {
        (YardRole::Reception, JobRole::Arrival) => 0..job.tasks.len(),
        (YardRole::Formation, JobRole::Departure) => 0..job.marshalling_index() + 1,
        (YardRole::Departure, JobRole::Departure) => job.marshalling_index() + 1..job.tasks.len(),
        _ => 0..0,
    }
}

/// Jobs that pass through a yard of the given role, in instance order.
pub(crate) fn yard_jobs<'a>(
    instance: &'a Instance,
    role: YardRole,
) -> Box<dyn Iterator<Item = &'a Job> + 'a> {
    match role {
        YardRole::Reception => Box::new(instance.arrivals()),
        YardRole::Formation | YardRole::Departure => Box::new(instance.departures()),
    }
}

/// Yard resources paired with their role, in instance order.
pub(crate) fn yards_with_roles(instance: &Instance) -> Vec<(&Resource, YardRole)> {
    instance
        .yards()
        .filter_map(|y| y.yard_role().map(|role| (y, role)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Task, WeeklyWindow};

    fn instance() -> Instance {
        Instance::new()
            .with_job(
                Job::arrival("A1", 0)
                    .with_task(Task::new(15))
                    .with_task(Task::new(45))
                    .with_task(Task::new(15).with_machine("DEB")),
            )
            .with_job(
                Job::arrival("A2", 60)
                    .with_task(Task::new(15))
                    .with_task(Task::new(45))
                    .with_task(Task::new(15).with_machine("DEB")),
            )
            .with_job(
                Job::departure("D1", 900)
                    .with_task(Task::new(15).with_machine("FOR"))
                    .with_task(Task::new(150))
                    .with_task(Task::new(15).with_machine("DEG"))
                    .with_task(Task::new(20)),
            )
            .with_resource(Resource::machine("DEB").with_closure(WeeklyWindow::new(300, 780)))
            .with_resource(Resource::machine("FOR"))
            .with_resource(Resource::machine("DEG"))
            .with_resource(Resource::yard("Y-REC", YardRole::Reception, 9))
            .with_resource(Resource::yard("Y-FOR", YardRole::Formation, 12))
            .with_resource(Resource::yard("Y-DEP", YardRole::Departure, 6))
    }

    #[test]
    fn test_machine_task_lists_deterministic_order() {
        let inst = instance();
        let lists = machine_task_lists(&inst);
        assert_eq!(lists.len(), 3);
        assert_eq!(lists[0].0, "DEB");
        assert_eq!(
            lists[0].1,
            vec![(TaskKey::new("A1", 2), 15), (TaskKey::new("A2", 2), 15)]
        );
        assert_eq!(lists[1].1, vec![(TaskKey::new("D1", 0), 15)]);
        assert_eq!(lists[2].1, vec![(TaskKey::new("D1", 2), 15)]);
    }

    #[test]
    fn test_yard_task_ranges() {
        let inst = instance();
        let arr = inst.job("A1").unwrap();
        let dep = inst.job("D1").unwrap();

        assert_eq!(yard_task_range(arr, YardRole::Reception), 0..3);
        assert_eq!(yard_task_range(arr, YardRole::Formation), 0..0);
        assert_eq!(yard_task_range(dep, YardRole::Formation), 0..3);
        assert_eq!(yard_task_range(dep, YardRole::Departure), 3..4);
        assert_eq!(yard_task_range(dep, YardRole::Reception), 0..0);
    }

    #[test]
    fn test_yard_jobs() {
        let inst = instance();
        let rec: Vec<_> = yard_jobs(&inst, YardRole::Reception)
            .map(|j| j.id.as_str())
            .collect();
        assert_eq!(rec, ["A1", "A2"]);
        let dep: Vec<_> = yard_jobs(&inst, YardRole::Departure)
            .map(|j| j.id.as_str())
            .collect();
        assert_eq!(dep, ["D1"]);
    }
}
