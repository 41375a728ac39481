//! Resource model.
//!
//! Two kinds of resource exist in the yard: machines (unit capacity,
//! serialized access, used by individual tasks) and yards (a number of
//! parallel tracks, entered and left by whole trains). Both carry a
//! weekly unavailability pattern from which an availability [`Calendar`]
//! is built over the planning horizon.

use serde::{Deserialize, Serialize};

use super::calendar::WeeklyWindow;

/// The three yard zones a train moves through.
///
/// The role fixes occupancy semantics: which jobs occupy the yard, what
/// event lets them in and what event lets them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YardRole {
    /// Receives arrival trains, from their timetable arrival until the
    /// end of their de-coupling task.
    Reception,
    /// Holds departure trains being formed, from the first wagon made
    /// available by a corresponding arrival until the end of the
    /// marshalling task.
    Formation,
    /// Holds formed trains, from the end of the marshalling task until
    /// their timetable departure.
    Departure,
}

/// Resource classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Unit-capacity machine; two tasks can never overlap on it.
    Machine,
    /// Multi-track yard zone occupied by whole trains.
    Yard {
        /// Number of parallel tracks.
        tracks: i64,
        /// Which zone of the yard this is.
        role: YardRole,
    },
}

/// A machine or yard with its weekly unavailability pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource identifier.
    pub id: String,
    /// Machine or yard.
    pub kind: ResourceKind,
    /// Weekly closure windows (may be empty: always available).
    pub closures: Vec<WeeklyWindow>,
}

impl Resource {
    /// Creates a unit-capacity machine.
    pub fn machine(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ResourceKind::Machine,
            closures: Vec::new(),
        }
    }

    /// Creates a yard zone with the given number of tracks.
    pub fn yard(id: impl Into<String>, role: YardRole, tracks: i64) -> Self {
        Self {
            id: id.into(),
            kind: ResourceKind::Yard { tracks, role },
            closures: Vec::new(),
        }
    }

    /// Adds a weekly closure window.
    pub fn with_closure(mut self, window: WeeklyWindow) -> Self {
        self.closures.push(window);
        self
    }

    /// Whether this resource is a machine.
    pub fn is_machine(&self) -> bool {
        matches!(self.kind, ResourceKind::Machine)
    }

    /// The yard role, if this resource is a yard.
    pub fn yard_role(&self) -> Option<YardRole> {
        match self.kind {
            ResourceKind::Yard { role, .. } => Some(role),
            ResourceKind::Machine => None,
        }
    }

    /// The track count, if this resource is a yard.
    pub fn tracks(&self) -> Option<i64> {
        match self.kind {
            ResourceKind::Yard { tracks, .. } => Some(tracks),
            ResourceKind::Machine => None,
        }
    }
}
