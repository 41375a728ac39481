//! Model-construction context.
//!
//! One `ModelBuilder` is threaded explicitly through the variable
//! factory and every constraint family — there is no shared global model
//! object. The builder owns the write-once variable registry and the
//! append-only constraint store; nothing is mutated after assembly
//! freezes it into a [`crate::milp::YardModel`].

use tracing::debug;

use crate::error::Result;
use crate::models::WEEK_MIN;

use super::expr::LinConstraint;
use super::var::{VarId, VarKind, VariableRegistry};

/// Append-only construction state for one model.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    registry: VariableRegistry,
    constraints: Vec<LinConstraint>,
    horizon_min: i64,
    slot_count: usize,
}

impl ModelBuilder {
    /// Creates a builder for the given horizon and slot grid.
    pub fn new(horizon_min: i64, slot_count: usize) -> Self {
        Self {
            registry: VariableRegistry::new(),
            constraints: Vec::new(),
            horizon_min,
            slot_count,
        }
    }

    /// The planning horizon (minutes).
    pub fn horizon_min(&self) -> i64 {
        self.horizon_min
    }

    /// Number of slot boundaries on the occupancy grid.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// The big-M relaxation constant: one week beyond the horizon,
    /// comfortably larger than any time difference in the model.
    pub fn big_m(&self) -> f64 {
        (self.horizon_min + WEEK_MIN) as f64
    }

    /// Registers a variable.
    pub fn add_var(&mut self, id: VarId, kind: VarKind) -> Result<()> {
        self.registry.add(id, kind)?;
        Ok(())
    }

    /// Appends a constraint.
    pub fn push(&mut self, constraint: LinConstraint) {
        self.constraints.push(constraint);
    }

    /// Dense index of a registered variable; missing keys are
    /// construction errors.
    pub fn require(&self, id: &VarId) -> Result<usize> {
        self.registry.require(id)
    }

    /// The variable registry.
    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    /// The constraints emitted so far.
    pub fn constraints(&self) -> &[LinConstraint] {
        &self.constraints
    }

    /// Logs and returns the number of constraints added since `mark`.
    ///
    /// Each constraint family calls this once so construction leaves a
    /// per-family audit trail.
    pub fn family_done(&self, family: &str, mark: usize) -> usize {
        let emitted = self.constraints.len() - mark;
        debug!(family, emitted, "constraint family emitted");
        emitted
    }

    /// Freezes the builder into its registry and constraint store.
    pub fn finish(self) -> (VariableRegistry, Vec<LinConstraint>) {
        (self.registry, self.constraints)
    }
}
