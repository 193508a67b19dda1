use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A candidate's statement on one policy topic.
///
/// Unknown keys are rejected rather than silently dropped, so whatever is
/// accepted is exactly what gets stored and served back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    pub title: String,
    pub description: String,
    /// Higher is more important to the candidate.
    pub priority: i32,
}

/// Policy statements keyed by topic, e.g. `"housing"`. Unordered.
pub type Policies = HashMap<String, Policy>;

#[cfg(test)]
mod examples {
    use super::*;

    impl Policy {
        pub fn housing() -> Self {
            Self {
                title: "Affordable Housing".to_string(),
                description: "Expand affordable housing".to_string(),
                priority: 90,
            }
        }

        pub fn climate() -> Self {
            Self {
                title: "Climate Action".to_string(),
                description: "Carbon neutrality by 2030".to_string(),
                priority: 85,
            }
        }

        pub fn examples() -> Policies {
            [
                ("housing".to_string(), Self::housing()),
                ("climate".to_string(), Self::climate()),
            ]
            .into_iter()
            .collect()
        }
    }
}
