//! People, roles and per-role tallies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One roster entry. Identity is positional: two entries may share both
/// name and role and still be different people.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub role: String,
}

impl Person {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Person {
            name: name.into(),
            role: role.into(),
        }
    }
}

/// Count of people per role, keyed in label order.
pub type RoleCounts = BTreeMap<String, usize>;

/// Tally the roles present in a roster.
pub fn count_roles(roster: &[Person]) -> RoleCounts {
    let mut counts = RoleCounts::new();
    for person in roster {
        *counts.entry(person.role.clone()).or_insert(0) += 1;
    }
    counts
}
