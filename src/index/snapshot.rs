// src/index/snapshot.rs

//! Immutable result of one full index rebuild.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;

use crate::models::Project;

use super::key::project_key;

/// One fully-built generation of the project index.
///
/// A snapshot is assembled off to the side during a rebuild and published
/// whole; readers never see it half-filled. Records are shared between the
/// key map and the birthday map.
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    /// Normalized lookup key -> project
    projects: HashMap<String, Arc<Project>>,

    /// "MM-DD" -> projects created that day, in discovery order
    birthdays: HashMap<String, Vec<Arc<Project>>>,

    /// Key list mirroring `projects`, for O(1) random access
    keys: Vec<String>,
}

impl IndexSnapshot {
    /// Insert a project under its normalized key.
    ///
    /// Key collisions within one rebuild are last-write-wins for lookups;
    /// the birthday list keeps every record that carries a start time.
    pub fn insert(&mut self, project: Project) {
        let key = project_key(&project.name);
        let record = Arc::new(project);

        if let Some(day) = record.birthday_key() {
            self.birthdays.entry(day).or_default().push(Arc::clone(&record));
        }
        if self.projects.insert(key.clone(), record).is_none() {
            self.keys.push(key);
        }
    }

    /// Look up a project by display name (normalized internally).
    pub fn lookup(&self, name: &str) -> Option<&Arc<Project>> {
        self.projects.get(&project_key(name))
    }

    /// Look up a project by an already-normalized key.
    pub fn get(&self, key: &str) -> Option<&Arc<Project>> {
        self.projects.get(key)
    }

    /// Projects whose creation date falls on `"MM-DD"`.
    pub fn birthdays_on(&self, month_day: &str) -> &[Arc<Project>] {
        self.birthdays
            .get(month_day)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// One uniformly random entry, or `None` on an empty index.
    pub fn random_entry<R: Rng>(&self, rng: &mut R) -> Option<&Arc<Project>> {
        if self.keys.is_empty() {
            return None;
        }
        let key = &self.keys[rng.gen_range(0..self.keys.len())];
        self.projects.get(key)
    }

    /// Number of indexed projects.
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Number of distinct birthday dates.
    pub fn birthday_count(&self) -> usize {
        self.birthdays.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: u32, name: &str, start_time: Option<&str>) -> Project {
        Project {
            project_id: id,
            contract: "0xabc".to_string(),
            name: name.to_string(),
            invocations: 100,
            max_invocations: 100,
            active: true,
            start_time: start_time.map(|s| s.parse().unwrap()),
        }
    }

    #[test]
    fn test_lookup_normalizes_name() {
        let mut snapshot = IndexSnapshot::default();
        snapshot.insert(project(2, "Ringers #2", None));

        assert!(snapshot.get("ringers2").is_some());
        assert!(snapshot.lookup("Ringers #2").is_some());
        assert!(snapshot.lookup("ringers 2").is_some());
        assert!(snapshot.lookup("unknown").is_none());
    }

    #[test]
    fn test_collision_last_write_wins() {
        let mut snapshot = IndexSnapshot::default();
        snapshot.insert(project(1, "Chromie Squiggle", None));
        snapshot.insert(project(9, "chromie-squiggle", None));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.keys.len(), 1);
        assert_eq!(snapshot.get("chromiesquiggle").unwrap().project_id, 9);
    }

    #[test]
    fn test_birthdays_grouped_in_discovery_order() {
        let mut snapshot = IndexSnapshot::default();
        snapshot.insert(project(1, "First", Some("2021-06-11T17:00:00Z")));
        snapshot.insert(project(2, "Second", Some("2022-06-11T09:00:00Z")));
        snapshot.insert(project(3, "Dateless", None));

        let both = snapshot.birthdays_on("06-11");
        assert_eq!(both.len(), 2);
        assert_eq!(both[0].project_id, 1);
        assert_eq!(both[1].project_id, 2);
        assert!(snapshot.birthdays_on("01-01").is_empty());
        assert_eq!(snapshot.birthday_count(), 1);
    }

    #[test]
    fn test_random_entry_empty() {
        let snapshot = IndexSnapshot::default();
        let mut rng = rand::thread_rng();
        assert!(snapshot.random_entry(&mut rng).is_none());
    }
}
