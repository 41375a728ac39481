//! Wagon correspondences.
//!
//! Each departure train is formed from wagons delivered by one or more
//! arrival trains. The raw input is a flat table of (arrival, departure)
//! id pairs; the resolver turns it into a per-departure list of supplying
//! arrivals, de-duplicated with insertion order preserved.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, YardError};

use super::job::{Job, JobRole};

/// One row of the raw correspondence table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrespondencePair {
    /// Arrival job whose wagons are reused.
    pub arrival_id: String,
    /// Departure job that reuses them.
    pub departure_id: String,
}

impl CorrespondencePair {
    /// Creates a correspondence row.
    pub fn new(arrival_id: impl Into<String>, departure_id: impl Into<String>) -> Self {
        Self {
            arrival_id: arrival_id.into(),
            departure_id: departure_id.into(),
        }
    }
}

/// Resolved mapping: departure job id → supplying arrival job ids.
///
/// Read-only during optimization. A departure job absent from the raw
/// table maps to the empty set (no precedence constraint is generated
/// for it).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrespondenceMap {
    feeders: HashMap<String, Vec<String>>,
}

impl CorrespondenceMap {
    /// Resolves the raw pair table against the job records.
    ///
    /// Duplicate pairs collapse to one entry; insertion order of distinct
    /// arrivals is preserved. Fails with [`YardError::DataIntegrity`] if
    /// a referenced id has no job record or the pair's roles are crossed.
    pub fn resolve(pairs: &[CorrespondencePair], jobs: &[Job]) -> Result<Self> {
        let roles: HashMap<&str, JobRole> =
            jobs.iter().map(|j| (j.id.as_str(), j.role)).collect();

        let mut feeders: HashMap<String, Vec<String>> = HashMap::new();
        for pair in pairs {
            match roles.get(pair.arrival_id.as_str()) {
                Some(JobRole::Arrival) => {}
                Some(JobRole::Departure) => {
                    return Err(YardError::DataIntegrity(format!(
                        "correspondence references departure job '{}' on the arrival side",
                        pair.arrival_id
                    )))
                }
                None => {
                    return Err(YardError::DataIntegrity(format!(
                        "correspondence references unknown arrival job '{}'",
                        pair.arrival_id
                    )))
                }
            }
            match roles.get(pair.departure_id.as_str()) {
                Some(JobRole::Departure) => {}
                Some(JobRole::Arrival) => {
                    return Err(YardError::DataIntegrity(format!(
                        "correspondence references arrival job '{}' on the departure side",
                        pair.departure_id
                    )))
                }
                None => {
                    return Err(YardError::DataIntegrity(format!(
                        "correspondence references unknown departure job '{}'",
                        pair.departure_id
                    )))
                }
            }

            let entry = feeders.entry(pair.departure_id.clone()).or_default();
            if !entry.iter().any(|id| id == &pair.arrival_id) {
                entry.push(pair.arrival_id.clone());
            }
        }

        Ok(Self { feeders })
    }

    /// Arrival jobs supplying the given departure job.
    ///
    /// Empty for departures absent from the raw table.
    pub fn feeders_of(&self, departure_id: &str) -> &[String] {
        self.feeders
            .get(departure_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of departures with at least one feeder.
    pub fn len(&self) -> usize {
        self.feeders.len()
    }

    /// Whether no correspondences exist at all.
    pub fn is_empty(&self) -> bool {
        self.feeders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::Task;

    fn jobs() -> Vec<Job> {
        vec![
            Job::arrival("A1", 0).with_task(Task::new(15)),
            Job::arrival("A2", 60).with_task(Task::new(15)),
            Job::departure("D1", 600).with_task(Task::new(20)),
            Job::departure("D2", 700).with_task(Task::new(20)),
        ]
    }

    #[test]
    fn test_resolve_preserves_insertion_order() {
        let pairs = vec![
            CorrespondencePair::new("A2", "D1"),
            CorrespondencePair::new("A1", "D1"),
            CorrespondencePair::new("A2", "D1"), // duplicate
        ];
        let map = CorrespondenceMap::resolve(&pairs, &jobs()).unwrap();
        assert_eq!(map.feeders_of("D1"), ["A2", "A1"]);
    }

    #[test]
    fn test_absent_departure_maps_to_empty() {
        let pairs = vec![CorrespondencePair::new("A1", "D1")];
        let map = CorrespondenceMap::resolve(&pairs, &jobs()).unwrap();
        assert!(map.feeders_of("D2").is_empty());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let pairs = vec![CorrespondencePair::new("A9", "D1")];
        let err = CorrespondenceMap::resolve(&pairs, &jobs()).unwrap_err();
        assert!(matches!(err, YardError::DataIntegrity(_)));

        let pairs = vec![CorrespondencePair::new("A1", "D9")];
        let err = CorrespondenceMap::resolve(&pairs, &jobs()).unwrap_err();
        assert!(matches!(err, YardError::DataIntegrity(_)));
    }

    #[test]
    fn test_crossed_roles_rejected() {
        let pairs = vec![CorrespondencePair::new("D1", "D2")];
        let err = CorrespondenceMap::resolve(&pairs, &jobs()).unwrap_err();
        assert!(matches!(err, YardError::DataIntegrity(_)));

        let pairs = vec![CorrespondencePair::new("A1", "A2")];
        let err = CorrespondenceMap::resolve(&pairs, &jobs()).unwrap_err();
        assert!(matches!(err, YardError::DataIntegrity(_)));
    }
}
