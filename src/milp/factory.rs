//! Variable factory.
//!
//! Allocates every decision variable deterministically: jobs in instance
//! order, tasks in sequence order, machine pairs from the per-machine
//! task lists, calendar intervals ascending, slots ascending. No
//! randomness, no allocation on demand — constraint generation only
//! references what was created here, so a missing key always means a
//! construction bug, never a race.

use itertools::Itertools;
use tracing::debug;

use crate::error::{Result, YardError};
use crate::models::{Calendar, JobRole};

use super::builder::ModelBuilder;
use super::var::{VarId, VarKind};
use super::{machine_task_lists, yard_jobs, yard_task_range, yards_with_roles, ModelContext};

/// Allocates all variables for the instance.
pub(crate) fn create_variables(ctx: &ModelContext<'_>, b: &mut ModelBuilder) -> Result<()> {
    start_variables(ctx, b)?;
    order_variables(ctx, b)?;
    machine_interval_variables(ctx, b)?;
    yard_interval_variables(ctx, b)?;
    feed_variables(ctx, b)?;
    occupancy_variables(ctx, b)?;
    peak_variable(ctx, b)?;
    debug!(variables = b.registry().len(), "variable factory done");
    Ok(())
}

/// One integer start per (job, task), bounded by the job release (or
/// zero) below and the horizon above.
fn start_variables(ctx: &ModelContext<'_>, b: &mut ModelBuilder) -> Result<()> {
    let horizon = b.horizon_min() as f64;
    for job in &ctx.instance.jobs {
        let lb = job.release_min().unwrap_or(0) as f64;
        for task in 0..job.tasks.len() {
            b.add_var(
                VarId::Start {
                    job: job.id.clone(),
                    task,
                },
                VarKind::Integer { lb, ub: horizon },
            )?;
        }
    }
    Ok(())
}

/// One binary ordering indicator per unordered pair of tasks sharing a
/// machine.
fn order_variables(ctx: &ModelContext<'_>, b: &mut ModelBuilder) -> Result<()> {
    for (machine, tasks) in machine_task_lists(ctx.instance) {
        for ((a, _), (other, _)) in tasks.iter().tuple_combinations() {
            b.add_var(
                VarId::Order {
                    machine: machine.clone(),
                    a: a.clone(),
                    b: other.clone(),
                },
                VarKind::Binary,
            )?;
        }
    }
    Ok(())
}

/// Fetches a resource calendar, rejecting resources that are closed for
/// the whole horizon while work still needs them.
fn usable_calendar<'a>(
    ctx: &'a ModelContext<'_>,
    resource: &str,
) -> Result<&'a Calendar> {
    let calendar = ctx.calendars.get(resource).ok_or_else(|| {
        YardError::ModelConstruction(format!("no calendar built for resource '{resource}'"))
    })?;
    if calendar.is_empty() {
        return Err(YardError::ModelConstruction(format!(
            "resource '{resource}' is closed for the whole horizon but tasks require it"
        )));
    }
    Ok(calendar)
}

/// One binary interval selector per (machine task, calendar interval).
fn machine_interval_variables(ctx: &ModelContext<'_>, b: &mut ModelBuilder) -> Result<()> {
    for job in &ctx.instance.jobs {
        for (task, op) in job.tasks.iter().enumerate() {
            let Some(machine) = &op.machine else {
                continue;
            };
            let calendar = usable_calendar(ctx, machine)?;
            for interval in 0..calendar.len() {
                b.add_var(
                    VarId::IntervalChoice {
                        resource: machine.clone(),
                        job: job.id.clone(),
                        task,
                        interval,
                    },
                    VarKind::Binary,
                )?;
            }
        }
    }
    Ok(())
}

/// One binary interval selector per (in-yard task, yard calendar
/// interval) — the second calendar-membership family.
fn yard_interval_variables(ctx: &ModelContext<'_>, b: &mut ModelBuilder) -> Result<()> {
    for (yard, role) in yards_with_roles(ctx.instance) {
        for job in yard_jobs(ctx.instance, role) {
            let range = yard_task_range(job, role);
            if range.is_empty() {
                continue;
            }
            let calendar = usable_calendar(ctx, &yard.id)?;
            for task in range {
                for interval in 0..calendar.len() {
                    b.add_var(
                        VarId::IntervalChoice {
                            resource: yard.id.clone(),
                            job: job.id.clone(),
                            task,
                            interval,
                        },
                        VarKind::Binary,
                    )?;
                }
            }
        }
    }
    Ok(())
}

/// One derived feed-start per departure job, plus one selector per
/// feeder realizing the minimum.
fn feed_variables(ctx: &ModelContext<'_>, b: &mut ModelBuilder) -> Result<()> {
    let horizon = b.horizon_min() as f64;
    for job in ctx.instance.departures() {
        b.add_var(
            VarId::FeedStart {
                job: job.id.clone(),
            },
            VarKind::Integer {
                lb: 0.0,
                ub: horizon,
            },
        )?;
        for feeder in ctx.feeds.feeders_of(&job.id) {
            b.add_var(
                VarId::FeedChoice {
                    job: job.id.clone(),
                    feeder: feeder.clone(),
                },
                VarKind::Binary,
            )?;
        }
    }
    Ok(())
}

/// The entered / not-yet-left / occupied indicator triple per
/// (yard, served job, slot boundary).
fn occupancy_variables(ctx: &ModelContext<'_>, b: &mut ModelBuilder) -> Result<()> {
    for (yard, role) in yards_with_roles(ctx.instance) {
        for job in yard_jobs(ctx.instance, role) {
            for slot in 0..b.slot_count() {
                b.add_var(
                    VarId::Entered {
                        yard: yard.id.clone(),
                        job: job.id.clone(),
                        slot,
                    },
                    VarKind::Binary,
                )?;
                b.add_var(
                    VarId::NotLeft {
                        yard: yard.id.clone(),
                        job: job.id.clone(),
                        slot,
                    },
                    VarKind::Binary,
                )?;
                b.add_var(
                    VarId::Occupied {
                        yard: yard.id.clone(),
                        job: job.id.clone(),
                        slot,
                    },
                    VarKind::Binary,
                )?;
            }
        }
    }
    Ok(())
}

/// The single integer peak variable, bounded by the departure count.
fn peak_variable(ctx: &ModelContext<'_>, b: &mut ModelBuilder) -> Result<()> {
    let departures = ctx
        .instance
        .jobs
        .iter()
        .filter(|j| j.role == JobRole::Departure)
        .count();
    b.add_var(
        VarId::Peak,
        VarKind::Integer {
            lb: 0.0,
            ub: departures as f64,
        },
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::{
        CorrespondenceMap, CorrespondencePair, Instance, Job, Resource, Task, WeeklyWindow,
        YardRole,
    };

    fn instance() -> Instance {
        Instance::new()
            .with_job(
                Job::arrival("A1", 0)
                    .with_task(Task::new(15))
                    .with_task(Task::new(15).with_machine("DEB")),
            )
            .with_job(
                Job::arrival("A2", 30)
                    .with_task(Task::new(15))
                    .with_task(Task::new(15).with_machine("DEB")),
            )
            .with_job(
                Job::departure("D1", 285)
                    .with_task(Task::new(15))
                    .with_task(Task::new(20)),
            )
            .with_resource(Resource::machine("DEB"))
            .with_resource(Resource::yard("Y-FOR", YardRole::Formation, 4))
            .with_correspondence(CorrespondencePair::new("A1", "D1"))
            .with_correspondence(CorrespondencePair::new("A2", "D1"))
    }

    fn build(inst: &Instance) -> ModelBuilder {
        let horizon = inst.horizon_min();
        let calendars: HashMap<String, crate::models::Calendar> = inst
            .resources
            .iter()
            .map(|r| {
                (
                    r.id.clone(),
                    crate::models::Calendar::build(&r.closures, horizon).unwrap(),
                )
            })
            .collect();
        let feeds = CorrespondenceMap::resolve(&inst.correspondences, &inst.jobs).unwrap();
        let mut b = ModelBuilder::new(horizon, inst.slot_count());
        let ctx = ModelContext {
            instance: inst,
            calendars: &calendars,
            feeds: &feeds,
        };
        create_variables(&ctx, &mut b).unwrap();
        b
    }

    #[test]
    fn test_variable_census() {
        let inst = instance();
        let b = build(&inst);
        // horizon 285 (last due, already on the grid) → 20 slot boundaries
        let slots = 20;
        // starts: 2 + 2 + 2
        // orders: one pair on DEB
        // machine selectors: 2 tasks × 1 interval
        // yard selectors: D1 tasks 0..=0 (marshalling index) × 1 interval
        // feed: 1 start + 2 choices
        // occupancy: formation yard × D1 × slots × 3
        // peak: 1
        let expected = 6 + 1 + 2 + 1 + 3 + slots * 3 + 1;
        assert_eq!(b.registry().len(), expected);
    }

    #[test]
    fn test_allocation_is_deterministic() {
        let inst = instance();
        let a = build(&inst);
        let b = build(&inst);
        assert_eq!(a.registry().defs(), b.registry().defs());
    }

    #[test]
    fn test_start_bounds_follow_release() {
        let inst = instance();
        let b = build(&inst);
        let idx = b
            .registry()
            .index_of(&VarId::Start {
                job: "A2".into(),
                task: 0,
            })
            .unwrap();
        match b.registry().defs()[idx].kind {
            VarKind::Integer { lb, ub } => {
                assert_eq!(lb, 30.0);
                assert_eq!(ub, inst.horizon_min() as f64);
            }
            VarKind::Binary => panic!("start must be integer"),
        }
    }

    #[test]
    fn test_fully_closed_machine_rejected() {
        let inst = Instance::new()
            .with_job(Job::arrival("A1", 0).with_task(Task::new(15).with_machine("DEB")))
            .with_resource(
                Resource::machine("DEB").with_closure(WeeklyWindow::new(0, crate::models::WEEK_MIN)),
            )
            .with_resource(Resource::yard("Y-FOR", YardRole::Formation, 4));

        let horizon = inst.horizon_min();
        let calendars: HashMap<String, crate::models::Calendar> = inst
            .resources
            .iter()
            .map(|r| {
                (
                    r.id.clone(),
                    crate::models::Calendar::build(&r.closures, horizon).unwrap(),
                )
            })
            .collect();
        let feeds = CorrespondenceMap::default();
        let mut b = ModelBuilder::new(horizon, inst.slot_count());
        let ctx = ModelContext {
            instance: &inst,
            calendars: &calendars,
            feeds: &feeds,
        };
        let err = create_variables(&ctx, &mut b).unwrap_err();
        assert!(err.to_string().contains("closed for the whole horizon"));
    }
}
