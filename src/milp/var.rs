//! Decision variable identities and the write-once registry.
//!
//! Every variable in the formulation is addressed by a typed [`VarId`]
//! derived from domain keys — (job, task), (machine, pair), (yard, job,
//! slot) — so constraint generation and solution read-back can name the
//! same variable without sharing solver handles. The registry assigns
//! dense indices in allocation order and rejects duplicate keys.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, YardError};

/// A (job, task-index) key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskKey {
    /// Owning job id.
    pub job: String,
    /// Position within the job's task sequence.
    pub task: usize,
}

impl TaskKey {
    /// Creates a task key.
    pub fn new(job: impl Into<String>, task: usize) -> Self {
        Self {
            job: job.into(),
            task,
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.job, self.task)
    }
}

/// Identity of one decision variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarId {
    /// Start time of a task (integer minutes).
    Start {
        /// Owning job id.
        job: String,
        /// Task index within the job.
        task: usize,
    },
    /// Ordering indicator for an unordered pair of tasks sharing a
    /// machine: 1 means `a` runs before `b`.
    Order {
        /// Shared machine id.
        machine: String,
        /// First task of the pair (allocation order).
        a: TaskKey,
        /// Second task of the pair.
        b: TaskKey,
    },
    /// Calendar interval selector: 1 means the task lies inside interval
    /// `interval` of `resource`'s calendar.
    IntervalChoice {
        /// Governing resource (machine or yard) id.
        resource: String,
        /// Owning job id.
        job: String,
        /// Task index within the job.
        task: usize,
        /// Calendar interval index.
        interval: usize,
    },
    /// Derived time the first wagon of a departure job becomes available:
    /// the minimum de-coupling start over its correspondence set.
    FeedStart {
        /// Departure job id.
        job: String,
    },
    /// Selector realizing the feed-start minimum: 1 means `feeder`
    /// attains it.
    FeedChoice {
        /// Departure job id.
        job: String,
        /// Arrival job id attaining the minimum.
        feeder: String,
    },
    /// 1 iff the slot boundary lies at or after the job's yard entry.
    Entered {
        /// Yard id.
        yard: String,
        /// Occupying job id.
        job: String,
        /// Slot index.
        slot: usize,
    },
    /// 1 iff the slot boundary lies strictly before the job's yard exit.
    NotLeft {
        /// Yard id.
        yard: String,
        /// Occupying job id.
        job: String,
        /// Slot index.
        slot: usize,
    },
    /// Conjunction of `Entered` and `NotLeft`: the job physically sits
    /// in the yard at the slot boundary.
    Occupied {
        /// Yard id.
        yard: String,
        /// Occupying job id.
        job: String,
        /// Slot index.
        slot: usize,
    },
    /// Objective variable: peak simultaneous formation-yard occupancy.
    Peak,
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarId::Start { job, task } => write!(f, "start_{job}.{task}"),
            VarId::Order { machine, a, b } => write!(f, "order_{machine}_{a}_{b}"),
            VarId::IntervalChoice {
                resource,
                job,
                task,
                interval,
            } => write!(f, "sel_{resource}_{job}.{task}_{interval}"),
            VarId::FeedStart { job } => write!(f, "first_wagon_{job}"),
            VarId::FeedChoice { job, feeder } => write!(f, "first_wagon_sel_{job}_{feeder}"),
            VarId::Entered { yard, job, slot } => write!(f, "entered_{yard}_{job}_{slot}"),
            VarId::NotLeft { yard, job, slot } => write!(f, "not_left_{yard}_{job}_{slot}"),
            VarId::Occupied { yard, job, slot } => write!(f, "is_present_{yard}_{job}_{slot}"),
            VarId::Peak => write!(f, "peak_tracks"),
        }
    }
}

/// Domain of one decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VarKind {
    /// Bounded integer.
    Integer {
        /// Lower bound.
        lb: f64,
        /// Upper bound.
        ub: f64,
    },
    /// Binary 0/1.
    Binary,
}

/// A registered variable: identity plus domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDef {
    /// Variable identity.
    pub id: VarId,
    /// Variable domain.
    pub kind: VarKind,
}

/// Append-only variable store with stable allocation order.
///
/// Each key maps to exactly one variable; registering the same [`VarId`]
/// twice is a construction error, never an overwrite.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    defs: Vec<VarDef>,
    index: HashMap<VarId, usize>,
}

impl VariableRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a variable and returns its dense index.
    pub fn add(&mut self, id: VarId, kind: VarKind) -> Result<usize> {
        if self.index.contains_key(&id) {
            return Err(YardError::ModelConstruction(format!(
                "variable '{id}' registered twice"
            )));
        }
        let idx = self.defs.len();
        self.index.insert(id.clone(), idx);
        self.defs.push(VarDef { id, kind });
        Ok(idx)
    }

    /// Dense index of a registered variable.
    pub fn index_of(&self, id: &VarId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Like [`index_of`](Self::index_of), but a missing key is a
    /// construction error.
    pub fn require(&self, id: &VarId) -> Result<usize> {
        self.index_of(id).ok_or_else(|| {
            YardError::ModelConstruction(format!("variable '{id}' was never registered"))
        })
    }

    /// Registered variables, in allocation order.
    pub fn defs(&self) -> &[VarDef] {
        &self.defs
    }

    /// Number of registered variables.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_allocation_order() {
        let mut reg = VariableRegistry::new();
        let s = VarId::Start {
            job: "A1".into(),
            task: 0,
        };
        let p = VarId::Peak;
        assert_eq!(
            reg.add(s.clone(), VarKind::Integer { lb: 0.0, ub: 100.0 })
                .unwrap(),
            0
        );
        assert_eq!(
            reg.add(p.clone(), VarKind::Integer { lb: 0.0, ub: 10.0 })
                .unwrap(),
            1
        );
        assert_eq!(reg.index_of(&s), Some(0));
        assert_eq!(reg.index_of(&p), Some(1));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut reg = VariableRegistry::new();
        let id = VarId::FeedStart { job: "D1".into() };
        reg.add(id.clone(), VarKind::Integer { lb: 0.0, ub: 1.0 })
            .unwrap();
        let err = reg.add(id, VarKind::Binary).unwrap_err();
        assert!(matches!(err, YardError::ModelConstruction(_)));
    }

    #[test]
    fn test_require_missing() {
        let reg = VariableRegistry::new();
        let err = reg.require(&VarId::Peak).unwrap_err();
        assert!(err.to_string().contains("never registered"));
    }

    #[test]
    fn test_display_names() {
        let id = VarId::Occupied {
            yard: "FOR".into(),
            job: "D1".into(),
            slot: 12,
        };
        assert_eq!(id.to_string(), "is_present_FOR_D1_12");

        let id = VarId::Order {
            machine: "DEB".into(),
            a: TaskKey::new("A1", 2),
            b: TaskKey::new("A2", 2),
        };
        assert_eq!(id.to_string(), "order_DEB_A1.2_A2.2");
    }
}
