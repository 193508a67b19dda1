use std::ops::{Deref, DerefMut};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::common::ElectionId;

/// Core election data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionCore {
    pub name: String,
    pub date: NaiveDate,
    /// Free text, e.g. `"Berkeley, CA"`.
    pub jurisdiction: String,
}

/// An election from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    #[serde(rename = "_id")]
    pub id: ElectionId,
    #[serde(flatten)]
    pub election: ElectionCore,
}

impl Deref for Election {
    type Target = ElectionCore;

    fn deref(&self) -> &Self::Target {
        &self.election
    }
}

impl DerefMut for Election {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.election
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl ElectionCore {
        pub fn example() -> Self {
            Self {
                name: "Berkeley Municipal Election".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 11, 5).unwrap(),
                jurisdiction: "Berkeley, CA".to_string(),
            }
        }

        pub fn example2() -> Self {
            Self {
                name: "Oakland Special Election".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
                jurisdiction: "Oakland, CA".to_string(),
            }
        }
    }

    impl Election {
        pub fn example(id: ElectionId) -> Self {
            Self {
                id,
                election: ElectionCore::example(),
            }
        }
    }
}
