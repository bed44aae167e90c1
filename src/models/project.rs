//! Project record structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generative-art project fetched from a backend source.
///
/// Records are immutable once constructed; every rebuild cycle produces a
/// fresh set and the old one is discarded wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    /// Numeric project identifier within its contract
    pub project_id: u32,

    /// Owning core contract address
    pub contract: String,

    /// Display name
    pub name: String,

    /// Total minted invocations (the edition size)
    pub invocations: u64,

    /// Maximum allowed invocations
    pub max_invocations: u64,

    /// Whether the project is currently active
    pub active: bool,

    /// Creation timestamp, when the metadata source knows it
    pub start_time: Option<DateTime<Utc>>,
}

impl Project {
    /// Key used by the metadata (birthday) source: `"contract-projectNumber"`.
    pub fn metadata_key(&self) -> String {
        format!("{}-{}", self.contract, self.project_id)
    }

    /// `"MM-DD"` birthday key, if the project has a creation timestamp.
    pub fn birthday_key(&self) -> Option<String> {
        self.start_time.map(|t| t.format("%m-%d").to_string())
    }

    /// Whether the project has more than one edition and is active.
    ///
    /// This is the default qualification used when picking a random project.
    pub fn is_open_edition(&self) -> bool {
        self.invocations > 1 && self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project() -> Project {
        Project {
            project_id: 78,
            contract: "0xa7d8d9ef8d8ce8992df33d8b8cf4aebabd5bd270".to_string(),
            name: "Fidenza".to_string(),
            invocations: 999,
            max_invocations: 999,
            active: true,
            start_time: Some("2021-06-11T17:00:00Z".parse().unwrap()),
        }
    }

    #[test]
    fn test_metadata_key() {
        let project = sample_project();
        assert_eq!(
            project.metadata_key(),
            "0xa7d8d9ef8d8ce8992df33d8b8cf4aebabd5bd270-78"
        );
    }

    #[test]
    fn test_birthday_key() {
        let project = sample_project();
        assert_eq!(project.birthday_key().as_deref(), Some("06-11"));

        let unborn = Project {
            start_time: None,
            ..project
        };
        assert_eq!(unborn.birthday_key(), None);
    }

    #[test]
    fn test_is_open_edition() {
        assert!(sample_project().is_open_edition());

        let single = Project {
            invocations: 1,
            ..sample_project()
        };
        assert!(!single.is_open_edition());

        let inactive = Project {
            active: false,
            ..sample_project()
        };
        assert!(!inactive.is_open_edition());
    }
}
