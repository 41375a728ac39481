//! Model assembly, solving, and solution read-back.
//!
//! [`YardModel::build`] runs the whole construction pipeline —
//! validation, calendar building, correspondence resolution, the
//! variable factory, every constraint family — and freezes the result.
//! [`YardModel::solve`] is the single place the external MILP solver is
//! touched: the frozen registries are translated into a `good_lp`
//! problem, the peak variable is minimized, and the backend outcome is
//! mapped onto [`SolveStatus`] without further interpretation.

use std::collections::HashMap;

use good_lp::{
    default_solver, variable, variables, Expression, ResolutionError, Solution, SolverModel,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, YardError};
use crate::models::{
    Calendar, CorrespondenceMap, Instance, TaskAssignment, YardRole, YardSchedule,
};
use crate::validation::validate_instance;

use super::builder::ModelBuilder;
use super::expr::{LinConstraint, Sense};
use super::var::{VarId, VarKind, VariableRegistry};
use super::{factory, generator, ModelContext};

/// Options forwarded to the external solver.
///
/// Backends apply what they support; the pure-Rust default backend
/// proves optimality or infeasibility and ignores both fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Wall-clock limit for the solve, in seconds.
    pub time_limit_s: Option<f64>,
    /// Acceptable relative optimality gap.
    pub mip_gap: Option<f64>,
}

/// Outcome classification reported by the solver.
///
/// Infeasibility and hitting the time limit are statuses for the caller
/// to interpret, not errors of model construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Proven optimal solution.
    Optimal,
    /// Feasible solution without an optimality proof.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// The time limit expired before a proof was obtained.
    TimeLimit,
}

/// Result of one solve call: a status, plus values when any solution
/// was found.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// How the solve ended.
    pub status: SolveStatus,
    /// The solved variable values, when a solution exists.
    pub solution: Option<SolvedModel>,
}

/// Read-back view of a solved model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolvedModel {
    values: HashMap<VarId, f64>,
}

impl SolvedModel {
    /// Value of any registered variable.
    pub fn value_of(&self, id: &VarId) -> Option<f64> {
        self.values.get(id).copied()
    }

    /// Solved start of one task, in minutes from the origin.
    pub fn start_min(&self, job: &str, task: usize) -> Option<i64> {
        self.value_of(&VarId::Start {
            job: job.into(),
            task,
        })
        .map(rounded)
    }

    /// Every task start keyed by (job id, task index).
    pub fn task_starts(&self) -> HashMap<(String, usize), i64> {
        self.values
            .iter()
            .filter_map(|(id, v)| match id {
                VarId::Start { job, task } => Some(((job.clone(), *task), rounded(*v))),
                _ => None,
            })
            .collect()
    }

    /// The optimal (or best found) peak formation-yard occupancy.
    pub fn peak(&self) -> Option<i64> {
        self.value_of(&VarId::Peak).map(rounded)
    }

    /// Assembles the schedule record consumed by downstream renderers.
    pub fn schedule(&self, instance: &Instance) -> YardSchedule {
        let mut assignments = Vec::new();
        for job in &instance.jobs {
            for (task, op) in job.tasks.iter().enumerate() {
                if let Some(start) = self.start_min(&job.id, task) {
                    assignments.push(TaskAssignment {
                        job_id: job.id.clone(),
                        task_index: task,
                        machine: op.machine.clone(),
                        start_min: start,
                        end_min: start + op.duration_min,
                    });
                }
            }
        }

        let formation_occupancy = match instance.yard_with_role(YardRole::Formation) {
            Some(yard) => (0..instance.slot_count())
                .map(|slot| {
                    instance
                        .departures()
                        .filter_map(|job| {
                            self.value_of(&VarId::Occupied {
                                yard: yard.id.clone(),
                                job: job.id.clone(),
                                slot,
                            })
                        })
                        .map(rounded)
                        .sum()
                })
                .collect(),
            None => Vec::new(),
        };

        YardSchedule {
            assignments,
            formation_occupancy,
            peak: self.peak().unwrap_or(0),
        }
    }
}

fn rounded(v: f64) -> i64 {
    v.round() as i64
}

/// The frozen optimization model for one instance.
///
/// All variables and constraints are created once at build time and
/// never mutated; solving reads them and leaves them intact, so the
/// model can be solved repeatedly with different options.
#[derive(Debug)]
pub struct YardModel {
    registry: VariableRegistry,
    constraints: Vec<LinConstraint>,
    horizon_min: i64,
}

impl YardModel {
    /// Builds the complete model for an instance.
    ///
    /// Fails fast on malformed input — nothing is emitted past the
    /// first error, and no partially-built model is ever returned.
    pub fn build(instance: &Instance) -> Result<Self> {
        validate_instance(instance)?;

        let horizon_min = instance.horizon_min();
        let mut calendars = HashMap::new();
        for resource in &instance.resources {
            calendars.insert(
                resource.id.clone(),
                Calendar::build(&resource.closures, horizon_min)?,
            );
        }
        let feeds = CorrespondenceMap::resolve(&instance.correspondences, &instance.jobs)?;

        let mut builder = ModelBuilder::new(horizon_min, instance.slot_count());
        let ctx = ModelContext {
            instance,
            calendars: &calendars,
            feeds: &feeds,
        };
        factory::create_variables(&ctx, &mut builder)?;
        generator::emit_all(&ctx, &mut builder)?;

        let (registry, constraints) = builder.finish();

        // Every constraint term must address a variable the factory
        // created; a miss here is a construction bug, surfaced now
        // rather than at solve time.
        for constraint in &constraints {
            for (id, _) in constraint.expr.terms() {
                registry.require(id)?;
            }
        }

        debug!(
            variables = registry.len(),
            constraints = constraints.len(),
            horizon_min,
            "model assembled"
        );

        Ok(Self {
            registry,
            constraints,
            horizon_min,
        })
    }

    /// Number of registered variables.
    pub fn variable_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of emitted constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// The planning horizon (minutes).
    pub fn horizon_min(&self) -> i64 {
        self.horizon_min
    }

    /// The variable registry, for audit and diagnostics.
    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// The emitted constraints, for audit and diagnostics.
    pub fn constraints(&self) -> &[LinConstraint] {
        &self.constraints
    }

    /// Solves the model, minimizing peak formation-yard occupancy.
    ///
    /// Delegates to the external solver behind `good_lp`. Returns a
    /// status plus values; only backend failures other than
    /// infeasibility are errors.
    pub fn solve(&self, options: &SolveOptions) -> Result<SolveOutcome> {
        if options.time_limit_s.is_some() || options.mip_gap.is_some() {
            debug!(?options, "solver options forwarded; backend applies what it supports");
        }

        let mut vars = variables!();
        let mut handles = Vec::with_capacity(self.registry.len());
        for def in self.registry.defs() {
            let handle = match def.kind {
                VarKind::Integer { lb, ub } => {
                    vars.add(variable().integer().min(lb).max(ub).name(def.id.to_string()))
                }
                VarKind::Binary => vars.add(variable().binary().name(def.id.to_string())),
            };
            handles.push(handle);
        }

        let peak = handles[self.registry.require(&VarId::Peak)?];
        let mut problem = vars.minimise(Expression::from(peak)).using(default_solver);

        for constraint in &self.constraints {
            let lhs = constraint
                .expr
                .terms()
                .iter()
                .fold(
                    Expression::from(constraint.expr.constant_part()),
                    |acc, (id, coef)| {
                        // Checked at build time; registry is immutable since.
                        let idx = self.registry.index_of(id).unwrap_or_default();
                        acc + *coef * handles[idx]
                    },
                );
            match constraint.sense {
                Sense::Le => problem.add_constraint(lhs.leq(constraint.rhs)),
                Sense::Ge => problem.add_constraint(lhs.geq(constraint.rhs)),
                Sense::Eq => problem.add_constraint(lhs.eq(constraint.rhs)),
            };
        }

        match problem.solve() {
            Ok(solution) => {
                let values = self
                    .registry
                    .defs()
                    .iter()
                    .zip(&handles)
                    .map(|(def, handle)| (def.id.clone(), solution.value(*handle)))
                    .collect();
                Ok(SolveOutcome {
                    status: SolveStatus::Optimal,
                    solution: Some(SolvedModel { values }),
                })
            }
            Err(ResolutionError::Infeasible) => Ok(SolveOutcome {
                status: SolveStatus::Infeasible,
                solution: None,
            }),
            Err(err) => Err(YardError::Solver(err.to_string())),
        }
    }
}
