//! Constraint generator.
//!
//! Emits every constraint family of the formulation into the builder:
//! intra-job ordering, release/due, wagon-correspondence precedence,
//! disjunctive machine exclusion, the two calendar-membership families,
//! the derived feed-start minimum, occupancy derivation, track capacity,
//! and the peak envelope. Families are emitted in a fixed order; none is
//! ever skipped silently — anything that cannot be emitted is a
//! construction error.

use itertools::Itertools;
use tracing::warn;

use crate::error::{Result, YardError};
use crate::models::{Instance, Job, TimeWindow, YardRole, SLOT_MIN};

use super::builder::ModelBuilder;
use super::disjunction::{exactly_one, guarded_bounds};
use super::expr::{LinConstraint, LinExpr};
use super::var::VarId;
use super::{machine_task_lists, yard_jobs, yard_task_range, yards_with_roles, ModelContext};

/// Emits all constraint families, in a fixed order.
pub(crate) fn emit_all(ctx: &ModelContext<'_>, b: &mut ModelBuilder) -> Result<()> {
    intra_job_ordering(ctx, b);
    release_due(ctx, b);
    correspondence_precedence(ctx, b)?;
    machine_exclusion(ctx, b);
    machine_calendar_membership(ctx, b)?;
    yard_calendar_membership(ctx, b)?;
    feed_start_definition(ctx, b)?;
    occupancy_derivation(ctx, b);
    track_capacity(ctx, b);
    peak_envelope(ctx, b);
    Ok(())
}

/// `start` expression of one task.
fn start(job: &str, task: usize) -> LinExpr {
    LinExpr::var(VarId::Start {
        job: job.into(),
        task,
    })
}

/// `start + duration` expression of one task.
fn end(job: &Job, task: usize) -> LinExpr {
    start(&job.id, task) + job.tasks[task].duration_min as f64
}

/// Consecutive tasks of a job never overlap:
/// `start[k] + duration[k] ≤ start[k+1]`.
fn intra_job_ordering(ctx: &ModelContext<'_>, b: &mut ModelBuilder) {
    let mark = b.constraints().len();
    for job in &ctx.instance.jobs {
        for k in 0..job.tasks.len().saturating_sub(1) {
            b.push(LinConstraint::le(
                format!("ord/{}/{}", job.id, k),
                end(job, k) - start(&job.id, k + 1),
                0.0,
            ));
        }
    }
    b.family_done("intra_job_ordering", mark);
}

/// Arrivals start no earlier than their release; departures finish no
/// later than their due time.
fn release_due(ctx: &ModelContext<'_>, b: &mut ModelBuilder) {
    let mark = b.constraints().len();
    for job in &ctx.instance.jobs {
        if let Some(release) = job.release_min() {
            b.push(LinConstraint::ge(
                format!("release/{}", job.id),
                start(&job.id, 0),
                release as f64,
            ));
        }
        if let Some(due) = job.due_min() {
            let last = job.tasks.len() - 1;
            b.push(LinConstraint::le(
                format!("due/{}", job.id),
                end(job, last),
                due as f64,
            ));
        }
    }
    b.family_done("release_due", mark);
}

/// A departure's first task waits for the de-coupling of every arrival
/// supplying its wagons.
fn correspondence_precedence(ctx: &ModelContext<'_>, b: &mut ModelBuilder) -> Result<()> {
    let mark = b.constraints().len();
    for dep in ctx.instance.departures() {
        for feeder in ctx.feeds.feeders_of(&dep.id) {
            let arr = require_job(ctx.instance, feeder)?;
            let dec = arr.decoupling_index();
            b.push(LinConstraint::ge(
                format!("prec/{}/{}", dep.id, arr.id),
                start(&dep.id, 0) - end(arr, dec),
                0.0,
            ));
        }
    }
    b.family_done("correspondence_precedence", mark);
    Ok(())
}

fn require_job<'a>(instance: &'a Instance, id: &str) -> Result<&'a Job> {
    instance
        .job(id)
        .ok_or_else(|| YardError::ModelConstruction(format!("no job record for id '{id}'")))
}

/// Two tasks sharing a unit-capacity machine never overlap: the order
/// indicator picks which runs first, big-M relaxes the other branch.
fn machine_exclusion(ctx: &ModelContext<'_>, b: &mut ModelBuilder) {
    let mark = b.constraints().len();
    for (machine, tasks) in machine_task_lists(ctx.instance) {
        for ((a, dur_a), (other, dur_b)) in tasks.iter().tuple_combinations() {
            let delta = VarId::Order {
                machine: machine.clone(),
                a: a.clone(),
                b: other.clone(),
            };
            let gap_ab = start(&other.job, other.task) - start(&a.job, a.task);
            guarded_bounds(
                b,
                &format!("mx/{machine}/{a}_{other}/fwd"),
                &LinExpr::var(delta.clone()),
                &gap_ab,
                Some(*dur_a as f64),
                None,
            );
            let gap_ba = start(&a.job, a.task) - start(&other.job, other.task);
            guarded_bounds(
                b,
                &format!("mx/{machine}/{a}_{other}/rev"),
                &LinExpr::one_minus(delta),
                &gap_ba,
                Some(*dur_b as f64),
                None,
            );
        }
    }
    b.family_done("machine_exclusion", mark);
}

/// Every machine task lies entirely inside exactly one open interval of
/// its machine's calendar.
fn machine_calendar_membership(ctx: &ModelContext<'_>, b: &mut ModelBuilder) -> Result<()> {
    let mark = b.constraints().len();
    for job in &ctx.instance.jobs {
        for (task, op) in job.tasks.iter().enumerate() {
            let Some(machine) = &op.machine else {
                continue;
            };
            let calendar = ctx.calendars.get(machine).ok_or_else(|| {
                YardError::ModelConstruction(format!("no calendar built for machine '{machine}'"))
            })?;
            interval_membership(
                b,
                "cal",
                machine,
                &job.id,
                task,
                op.duration_min,
                calendar.intervals(),
            );
        }
    }
    b.family_done("machine_calendar_membership", mark);
    Ok(())
}

/// Every task performed inside a yard lies within one open interval of
/// that yard's calendar — the second membership family, kept separate
/// from the machine family on purpose.
fn yard_calendar_membership(ctx: &ModelContext<'_>, b: &mut ModelBuilder) -> Result<()> {
    let mark = b.constraints().len();
    for (yard, role) in yards_with_roles(ctx.instance) {
        let calendar = ctx.calendars.get(&yard.id).ok_or_else(|| {
            YardError::ModelConstruction(format!("no calendar built for yard '{}'", yard.id))
        })?;
        let longest_open = calendar
            .intervals()
            .iter()
            .map(|w| w.duration_min())
            .max()
            .unwrap_or(0);

        for job in yard_jobs(ctx.instance, role) {
            let range = yard_task_range(job, role);
            if range.is_empty() {
                continue;
            }
            let dwell: i64 = range
                .clone()
                .map(|k| job.tasks[k].duration_min)
                .sum();
            if dwell > longest_open {
                // The stay cannot fit inside any single open interval, so
                // binding tasks one by one is weaker than binding the whole
                // stay; surface the instance for manual review.
                warn!(
                    yard = %yard.id,
                    job = %job.id,
                    dwell,
                    longest_open,
                    "yard stay exceeds every open interval; per-task calendar bounds applied"
                );
            }
            for k in range {
                interval_membership(
                    b,
                    "ycal",
                    &yard.id,
                    &job.id,
                    k,
                    job.tasks[k].duration_min,
                    calendar.intervals(),
                );
            }
        }
    }
    b.family_done("yard_calendar_membership", mark);
    Ok(())
}

/// Shared body of both membership families: one selector per interval,
/// guarded bounds on the selected one, exactly one selected.
fn interval_membership(
    b: &mut ModelBuilder,
    tag: &str,
    resource: &str,
    job: &str,
    task: usize,
    duration_min: i64,
    intervals: &[TimeWindow],
) {
    let mut selectors = Vec::with_capacity(intervals.len());
    for (i, window) in intervals.iter().enumerate() {
        let sigma = VarId::IntervalChoice {
            resource: resource.into(),
            job: job.into(),
            task,
            interval: i,
        };
        guarded_bounds(
            b,
            &format!("{tag}/{resource}/{job}.{task}/{i}"),
            &LinExpr::var(sigma.clone()),
            &start(job, task),
            Some(window.start_min as f64),
            Some((window.end_min - duration_min) as f64),
        );
        selectors.push(sigma);
    }
    exactly_one(b, &format!("{tag}/{resource}/{job}.{task}"), selectors);
}

/// The derived feed-start of each departure equals the minimum
/// de-coupling start over its correspondence set; a departure with no
/// correspondences is fed by its own first task.
fn feed_start_definition(ctx: &ModelContext<'_>, b: &mut ModelBuilder) -> Result<()> {
    let mark = b.constraints().len();
    for dep in ctx.instance.departures() {
        let feed = LinExpr::var(VarId::FeedStart {
            job: dep.id.clone(),
        });
        let feeders = ctx.feeds.feeders_of(&dep.id);
        if feeders.is_empty() {
            b.push(LinConstraint::eq(
                format!("feed/{}/self", dep.id),
                feed - start(&dep.id, 0),
                0.0,
            ));
            continue;
        }
        let mut choices = Vec::with_capacity(feeders.len());
        for feeder in feeders {
            let arr = require_job(ctx.instance, feeder)?;
            let dec_start = start(&arr.id, arr.decoupling_index());
            b.push(LinConstraint::le(
                format!("feed/{}/{}/ub", dep.id, arr.id),
                feed.clone() - dec_start.clone(),
                0.0,
            ));
            let mu = VarId::FeedChoice {
                job: dep.id.clone(),
                feeder: arr.id.clone(),
            };
            guarded_bounds(
                b,
                &format!("feed/{}/{}", dep.id, arr.id),
                &LinExpr::var(mu.clone()),
                &(feed.clone() - dec_start),
                Some(0.0),
                None,
            );
            choices.push(mu);
        }
        exactly_one(b, &format!("feed/{}", dep.id), choices);
    }
    b.family_done("feed_start_definition", mark);
    Ok(())
}

/// Entry and exit events of a job in a yard, by yard role.
///
/// Reception: timetable arrival → end of de-coupling. Formation: feed
/// start → end of marshalling. Departure: end of marshalling →
/// timetable departure.
fn occupancy_events(job: &Job, role: YardRole) -> (LinExpr, LinExpr) {
    match role {
        YardRole::Reception => (
            LinExpr::constant(job.timetable_min as f64),
            end(job, job.decoupling_index()),
        ),
        YardRole::Formation => (
            LinExpr::var(VarId::FeedStart {
                job: job.id.clone(),
            }),
            end(job, job.marshalling_index()),
        ),
        YardRole::Departure => (
            end(job, job.marshalling_index()),
            LinExpr::constant(job.timetable_min as f64),
        ),
    }
}

/// Derives the occupancy indicator triple at every slot boundary τ:
/// `entered = 1 ⇔ τ ≥ entry`, `not-yet-left = 1 ⇔ τ < exit`, and
/// `occupied` as their conjunction. Times are integral, so strict `<`
/// is `≤ x − 1`.
fn occupancy_derivation(ctx: &ModelContext<'_>, b: &mut ModelBuilder) {
    let mark = b.constraints().len();
    for (yard, role) in yards_with_roles(ctx.instance) {
        for job in yard_jobs(ctx.instance, role) {
            let (entry, exit) = occupancy_events(job, role);
            for slot in 0..b.slot_count() {
                let tau = (slot as i64 * SLOT_MIN) as f64;
                let entered = VarId::Entered {
                    yard: yard.id.clone(),
                    job: job.id.clone(),
                    slot,
                };
                let not_left = VarId::NotLeft {
                    yard: yard.id.clone(),
                    job: job.id.clone(),
                    slot,
                };
                let occupied = VarId::Occupied {
                    yard: yard.id.clone(),
                    job: job.id.clone(),
                    slot,
                };
                let name = format!("occ/{}/{}/{}", yard.id, job.id, slot);

                // entered = 1 ⇒ τ ≥ entry; entered = 0 ⇒ entry ≥ τ + 1.
                guarded_bounds(
                    b,
                    &format!("{name}/in"),
                    &LinExpr::var(entered.clone()),
                    &(LinExpr::constant(tau) - entry.clone()),
                    Some(0.0),
                    None,
                );
                guarded_bounds(
                    b,
                    &format!("{name}/in!"),
                    &LinExpr::one_minus(entered.clone()),
                    &(entry.clone() - tau),
                    Some(1.0),
                    None,
                );

                // not-left = 1 ⇒ exit ≥ τ + 1; not-left = 0 ⇒ τ ≥ exit.
                guarded_bounds(
                    b,
                    &format!("{name}/out"),
                    &LinExpr::var(not_left.clone()),
                    &(exit.clone() - tau),
                    Some(1.0),
                    None,
                );
                guarded_bounds(
                    b,
                    &format!("{name}/out!"),
                    &LinExpr::one_minus(not_left.clone()),
                    &(LinExpr::constant(tau) - exit.clone()),
                    Some(0.0),
                    None,
                );

                // occupied = entered ∧ not-left, linearized.
                b.push(LinConstraint::le(
                    format!("{name}/and_in"),
                    LinExpr::var(occupied.clone()) - LinExpr::var(entered.clone()),
                    0.0,
                ));
                b.push(LinConstraint::le(
                    format!("{name}/and_out"),
                    LinExpr::var(occupied.clone()) - LinExpr::var(not_left.clone()),
                    0.0,
                ));
                b.push(LinConstraint::ge(
                    format!("{name}/and_both"),
                    LinExpr::var(occupied) - LinExpr::var(entered) - LinExpr::var(not_left),
                    -1.0,
                ));
            }
        }
    }
    b.family_done("occupancy_derivation", mark);
}

/// Trains present in a yard never exceed its track count, at any slot.
fn track_capacity(ctx: &ModelContext<'_>, b: &mut ModelBuilder) {
    let mark = b.constraints().len();
    for (yard, role) in yards_with_roles(ctx.instance) {
        let jobs: Vec<_> = yard_jobs(ctx.instance, role).collect();
        if jobs.is_empty() {
            continue;
        }
        let tracks = match yard.tracks() {
            Some(t) => t as f64,
            None => continue,
        };
        for slot in 0..b.slot_count() {
            let sum = LinExpr::sum(jobs.iter().map(|job| VarId::Occupied {
                yard: yard.id.clone(),
                job: job.id.clone(),
                slot,
            }));
            b.push(LinConstraint::le(
                format!("cap/{}/{}", yard.id, slot),
                sum,
                tracks,
            ));
        }
    }
    b.family_done("track_capacity", mark);
}

/// The peak variable dominates formation-yard occupancy at every slot;
/// minimizing it minimizes the true maximum.
fn peak_envelope(ctx: &ModelContext<'_>, b: &mut ModelBuilder) {
    let mark = b.constraints().len();
    let Some(formation) = ctx.instance.yard_with_role(YardRole::Formation) else {
        b.family_done("peak_envelope", mark);
        return;
    };
    let departures: Vec<_> = ctx.instance.departures().collect();
    for slot in 0..b.slot_count() {
        let sum = LinExpr::sum(departures.iter().map(|job| VarId::Occupied {
            yard: formation.id.clone(),
            job: job.id.clone(),
            slot,
        }));
        b.push(LinConstraint::le(
            format!("peak/{slot}"),
            sum - LinExpr::var(VarId::Peak),
            0.0,
        ));
    }
    b.family_done("peak_envelope", mark);
}
