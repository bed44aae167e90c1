// src/index/sampler.rs

//! Retry-bounded random sampling over the published index.

use std::sync::Arc;

use crate::models::Project;

use super::snapshot::IndexSnapshot;

/// Pick a qualifying project by bounded random probing.
///
/// Probes up to `max_attempts` uniformly random entries and returns the
/// first one the predicate accepts. Gives up silently after the bound; with
/// a large index that is sparse in qualifying entries this can miss even
/// when a match exists, which is the accepted cost of staying O(1) instead
/// of scanning the whole key set.
pub fn sample_qualifying<F>(
    snapshot: &IndexSnapshot,
    max_attempts: u32,
    mut predicate: F,
) -> Option<Arc<Project>>
where
    F: FnMut(&Project) -> bool,
{
    let mut rng = rand::thread_rng();
    for _ in 0..max_attempts {
        if let Some(record) = snapshot.random_entry(&mut rng) {
            if predicate(record) {
                return Some(Arc::clone(record));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_of(count: u32) -> IndexSnapshot {
        let mut snapshot = IndexSnapshot::default();
        for id in 0..count {
            snapshot.insert(Project {
                project_id: id,
                contract: "0xabc".to_string(),
                name: format!("Project {id}"),
                invocations: u64::from(id),
                max_invocations: 100,
                active: id % 2 == 0,
                start_time: None,
            });
        }
        snapshot
    }

    #[test]
    fn test_returns_qualifying_entry() {
        let snapshot = snapshot_of(8);
        let found = sample_qualifying(&snapshot, 10, |_| true);
        assert!(found.is_some());
    }

    #[test]
    fn test_gives_up_after_exactly_the_bound() {
        let snapshot = snapshot_of(8);
        let mut attempts = 0;
        let found = sample_qualifying(&snapshot, 10, |_| {
            attempts += 1;
            false
        });
        assert!(found.is_none());
        assert_eq!(attempts, 10);
    }

    #[test]
    fn test_empty_index_yields_none() {
        let snapshot = IndexSnapshot::default();
        let mut attempts = 0;
        let found = sample_qualifying(&snapshot, 10, |_| {
            attempts += 1;
            true
        });
        assert!(found.is_none());
        assert_eq!(attempts, 0);
    }

    #[test]
    fn test_predicate_filters() {
        let snapshot = snapshot_of(8);
        // Plenty of attempts so the probe almost surely lands on an
        // active entry at least once.
        for _ in 0..20 {
            if let Some(record) = sample_qualifying(&snapshot, 10, |p| p.active) {
                assert!(record.active);
            }
        }
    }
}
