//! Input validation for yard scheduling instances.
//!
//! Structural integrity checks run before any decision variable exists.
//! The first violation aborts model assembly — there is no partial or
//! degraded model. Detects:
//! - Duplicate job or resource IDs
//! - Jobs with no tasks
//! - Non-positive task durations, negative timetable times
//! - Departure jobs whose handling cannot fit before their due time
//! - Task references to unknown or non-machine resources
//! - Duplicate yard roles, or a missing formation yard

use std::collections::{HashMap, HashSet};

use crate::error::{Result, YardError};
use crate::models::{Instance, JobRole, ResourceKind, YardRole};

/// Validates an instance, failing fast on the first violation.
///
/// Checks, in order:
/// 1. No duplicate resource IDs, at most one yard per role
/// 2. A formation yard exists (the objective is defined on it)
/// 3. No duplicate job IDs
/// 4. Every job has at least one task
/// 5. Every task duration is positive, every timetable time non-negative
/// 6. Every departure's total handling fits before its due time
/// 7. Every task machine reference names a machine resource
pub fn validate_instance(instance: &Instance) -> Result<()> {
    let mut resource_ids = HashSet::new();
    let mut yard_roles: HashMap<YardRole, &str> = HashMap::new();
    for r in &instance.resources {
        if !resource_ids.insert(r.id.as_str()) {
            return Err(YardError::ModelConstruction(format!(
                "duplicate resource id '{}'",
                r.id
            )));
        }
        if let ResourceKind::Yard { role, tracks } = r.kind {
            if tracks <= 0 {
                return Err(YardError::ModelConstruction(format!(
                    "yard '{}' has non-positive track count {tracks}",
                    r.id
                )));
            }
            if let Some(other) = yard_roles.insert(role, r.id.as_str()) {
                return Err(YardError::ModelConstruction(format!(
                    "yards '{}' and '{}' share the role {role:?}",
                    other, r.id
                )));
            }
        }
    }
    if !instance.jobs.is_empty() && !yard_roles.contains_key(&YardRole::Formation) {
        return Err(YardError::ModelConstruction(
            "no formation yard: the peak objective is undefined".into(),
        ));
    }

    let mut job_ids = HashSet::new();
    for job in &instance.jobs {
        if !job_ids.insert(job.id.as_str()) {
            return Err(YardError::ModelConstruction(format!(
                "duplicate job id '{}'",
                job.id
            )));
        }
        if job.tasks.is_empty() {
            return Err(YardError::ModelConstruction(format!(
                "job '{}' has no tasks",
                job.id
            )));
        }
        if job.timetable_min < 0 {
            return Err(YardError::ModelConstruction(format!(
                "job '{}' has negative timetable time {}",
                job.id, job.timetable_min
            )));
        }
        for (k, task) in job.tasks.iter().enumerate() {
            if task.duration_min <= 0 {
                return Err(YardError::ModelConstruction(format!(
                    "task {k} of job '{}' has non-positive duration {}",
                    job.id, task.duration_min
                )));
            }
            if let Some(machine) = &task.machine {
                match instance.resource(machine) {
                    Some(r) if r.is_machine() => {}
                    Some(_) => {
                        return Err(YardError::ModelConstruction(format!(
                            "task {k} of job '{}' requires '{}', which is a yard, not a machine",
                            job.id, machine
                        )))
                    }
                    None => {
                        return Err(YardError::ModelConstruction(format!(
                            "task {k} of job '{}' requires unknown machine '{}'",
                            job.id, machine
                        )))
                    }
                }
            }
        }
        if job.role == JobRole::Departure && job.total_duration_min() > job.timetable_min {
            return Err(YardError::ModelConstruction(format!(
                "departure job '{}' needs {} min of handling but is due at {}",
                job.id,
                job.total_duration_min(),
                job.timetable_min
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, Resource, Task};

    fn valid_instance() -> Instance {
        Instance::new()
            .with_job(
                Job::arrival("A1", 0)
                    .with_task(Task::new(15))
                    .with_task(Task::new(15).with_machine("DEB")),
            )
            .with_job(
                Job::departure("D1", 600)
                    .with_task(Task::new(15).with_machine("FOR"))
                    .with_task(Task::new(20)),
            )
            .with_resource(Resource::machine("DEB"))
            .with_resource(Resource::machine("FOR"))
            .with_resource(Resource::yard("Y-REC", YardRole::Reception, 5))
            .with_resource(Resource::yard("Y-FOR", YardRole::Formation, 8))
            .with_resource(Resource::yard("Y-DEP", YardRole::Departure, 4))
    }

    #[test]
    fn test_valid_instance_passes() {
        assert!(validate_instance(&valid_instance()).is_ok());
    }

    #[test]
    fn test_duplicate_job_id() {
        let inst = valid_instance().with_job(Job::arrival("A1", 5).with_task(Task::new(10)));
        let err = validate_instance(&inst).unwrap_err();
        assert!(err.to_string().contains("duplicate job id"));
    }

    #[test]
    fn test_duplicate_resource_id() {
        let inst = valid_instance().with_resource(Resource::machine("DEB"));
        let err = validate_instance(&inst).unwrap_err();
        assert!(err.to_string().contains("duplicate resource id"));
    }

    #[test]
    fn test_empty_job() {
        let inst = valid_instance().with_job(Job::arrival("A2", 0));
        let err = validate_instance(&inst).unwrap_err();
        assert!(err.to_string().contains("no tasks"));
    }

    #[test]
    fn test_non_positive_duration() {
        let inst = valid_instance().with_job(Job::arrival("A2", 0).with_task(Task::new(0)));
        let err = validate_instance(&inst).unwrap_err();
        assert!(err.to_string().contains("non-positive duration"));
    }

    #[test]
    fn test_unfittable_departure() {
        let inst = valid_instance().with_job(
            Job::departure("D2", 30)
                .with_task(Task::new(20))
                .with_task(Task::new(20)),
        );
        let err = validate_instance(&inst).unwrap_err();
        assert!(err.to_string().contains("due at"));
    }

    #[test]
    fn test_unknown_machine() {
        let inst =
            valid_instance().with_job(Job::arrival("A2", 0).with_task(Task::new(10).with_machine("GHOST")));
        let err = validate_instance(&inst).unwrap_err();
        assert!(err.to_string().contains("unknown machine"));
    }

    #[test]
    fn test_yard_used_as_machine() {
        let inst =
            valid_instance().with_job(Job::arrival("A2", 0).with_task(Task::new(10).with_machine("Y-REC")));
        let err = validate_instance(&inst).unwrap_err();
        assert!(err.to_string().contains("not a machine"));
    }

    #[test]
    fn test_missing_formation_yard() {
        let inst = Instance::new()
            .with_job(Job::arrival("A1", 0).with_task(Task::new(10)))
            .with_resource(Resource::yard("Y-REC", YardRole::Reception, 5));
        let err = validate_instance(&inst).unwrap_err();
        assert!(err.to_string().contains("formation yard"));
    }

    #[test]
    fn test_duplicate_yard_role() {
        let inst = valid_instance().with_resource(Resource::yard("Y-FOR2", YardRole::Formation, 3));
        let err = validate_instance(&inst).unwrap_err();
        assert!(err.to_string().contains("share the role"));
    }
}
