//! Error taxonomy.
//!
//! All construction-time failures are raised synchronously, before the
//! solver is invoked, and abort model assembly — there is no partial or
//! degraded model. Solver-side outcomes (infeasible, time limit) are
//! statuses, not errors; see [`crate::milp::SolveStatus`].

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, YardError>;

/// Errors raised while building or solving a yard model.
#[derive(Debug, thiserror::Error)]
pub enum YardError {
    /// A raw availability specification is malformed (e.g. a weekly
    /// closure window with `end <= start`).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A correspondence row references a job id with no job record,
    /// or references it with the wrong role.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    /// Instance data cannot be turned into a well-formed model:
    /// invalid durations, impossible time bounds, dangling resource
    /// references, duplicate variable keys.
    #[error("model construction error: {0}")]
    ModelConstruction(String),

    /// The external solver failed for a reason other than infeasibility.
    #[error("solver error: {0}")]
    Solver(String),
}
