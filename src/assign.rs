//! Assignment of concrete people to groups
//!
//! Fills every group from shuffled per-role pools according to the quota
//! table, then checks that each group ends up exactly at capacity.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AllocationError, Result};
use crate::quota::QuotaTable;
use crate::roster::Person;
use crate::seeds::shuffle;

/// Flat export row: one per person, `group_index` is 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub name: String,
    pub role: String,
    pub group_index: usize,
}

/// Filled groups and their flattened records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub groups: Vec<Vec<Person>>,
    /// Ordered by group, then by order of assignment within the group
    pub records: Vec<AnnotatedRecord>,
}

/// Assign every person in `roster` to a group.
///
/// Each role's pool is shuffled independently, then consumed through a
/// single cursor: group 0 takes its quota first, then group 1, and so on.
/// People no quota asked for are shuffled and dropped into open seats.
pub fn assign<R: Rng + ?Sized>(
    roster: &[Person],
    quotas: &QuotaTable,
    capacities: &[usize],
    rng: &mut R,
) -> Result<Assignment> {
    if quotas.group_count() != capacities.len() {
        return Err(AllocationError::AllocationInvariantViolation(format!(
            "quota table covers {} groups but {} capacities were given",
            quotas.group_count(),
            capacities.len()
        )));
    }

    let mut pools: BTreeMap<&str, Vec<&Person>> = BTreeMap::new();
    for person in roster {
        pools.entry(person.role.as_str()).or_default().push(person);
    }
    for pool in pools.values_mut() {
        shuffle(pool, rng);
    }

    let mut groups: Vec<Vec<Person>> =
        capacities.iter().map(|&c| Vec::with_capacity(c)).collect();
    let mut leftovers: Vec<&Person> = Vec::new();

    for (role, row) in quotas.iter() {
        let pool = pools.remove(role).unwrap_or_default();
        let mut cursor = 0;
        for (group, &required) in row.iter().enumerate() {
            let available = pool.len() - cursor;
            if available < required {
                return Err(AllocationError::InsufficientRoleSupply {
                    role: role.to_string(),
                    group,
                    required,
                    available,
                });
            }
            groups[group].extend(pool[cursor..cursor + required].iter().map(|&p| p.clone()));
            cursor += required;
        }
        leftovers.extend_from_slice(&pool[cursor..]);
    }
    // Roles the quota table never mentions
    for pool in pools.into_values() {
        leftovers.extend(pool);
    }

    if !leftovers.is_empty() {
        warn!(
            leftovers = leftovers.len(),
            "people left after quota fill; placing them in open seats"
        );
        place_leftovers(&mut groups, capacities, leftovers, rng);
    }

    verify(&groups, capacities, roster.len())?;

    let records = groups
        .iter()
        .enumerate()
        .flat_map(|(i, members)| {
            members.iter().map(move |p| AnnotatedRecord {
                name: p.name.clone(),
                role: p.role.clone(),
                group_index: i + 1,
            })
        })
        .collect();

    debug!(groups = groups.len(), people = roster.len(), "assigned roster");
    Ok(Assignment { groups, records })
}

/// Shuffle leftovers and hand them out one at a time to groups below
/// capacity, lowest index first. Anything that does not fit is dropped here
/// and caught by `verify`.
fn place_leftovers<R: Rng + ?Sized>(
    groups: &mut [Vec<Person>],
    capacities: &[usize],
    mut leftovers: Vec<&Person>,
    rng: &mut R,
) {
    shuffle(&mut leftovers, rng);
    let mut rest = leftovers.into_iter();
    for (members, &capacity) in groups.iter_mut().zip(capacities) {
        while members.len() < capacity {
            match rest.next() {
                Some(person) => members.push(person.clone()),
                None => return,
            }
        }
    }
}

fn verify(groups: &[Vec<Person>], capacities: &[usize], population: usize) -> Result<()> {
    for (group, (members, &capacity)) in groups.iter().zip(capacities).enumerate() {
        if members.len() != capacity {
            return Err(AllocationError::AllocationInvariantViolation(format!(
                "group {} holds {} people, capacity is {}",
                group,
                members.len(),
                capacity
            )));
        }
    }
    let assigned: usize = groups.iter().map(Vec::len).sum();
    if assigned != population {
        return Err(AllocationError::AllocationInvariantViolation(format!(
            "assigned {} people out of {}",
            assigned, population
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn roster(counts: &[(&str, usize)]) -> Vec<Person> {
        counts
            .iter()
            .flat_map(|&(role, count)| {
                (0..count).map(move |i| Person::new(format!("{}{}", role, i), role))
            })
            .collect()
    }

    fn quotas(rows: &[(&str, &[usize])]) -> QuotaTable {
        let targets = rows.iter().map(|&(r, row)| (r.to_string(), row.to_vec())).collect();
        QuotaTable::from_targets(targets).unwrap()
    }

    fn sorted(mut people: Vec<Person>) -> Vec<Person> {
        people.sort_by(|a, b| (&a.role, &a.name).cmp(&(&b.role, &b.name)));
        people
    }

    #[test]
    fn test_fills_exact_quotas() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let people = roster(&[("A", 6), ("B", 3)]);
        let table = quotas(&[("A", &[2, 2, 2]), ("B", &[1, 1, 1])]);
        let result = assign(&people, &table, &[3, 3, 3], &mut rng).unwrap();

        for members in &result.groups {
            assert_eq!(members.len(), 3);
            assert_eq!(members.iter().filter(|p| p.role == "A").count(), 2);
            assert_eq!(members.iter().filter(|p| p.role == "B").count(), 1);
        }
        assert_eq!(sorted(result.groups.concat()), sorted(people));
    }

    #[test]
    fn test_records_follow_groups() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let people = roster(&[("A", 3), ("B", 2)]);
        let table = quotas(&[("A", &[2, 1]), ("B", &[1, 1])]);
        let result = assign(&people, &table, &[3, 2], &mut rng).unwrap();

        assert_eq!(result.records.len(), 5);
        let indexes: Vec<usize> = result.records.iter().map(|r| r.group_index).collect();
        assert_eq!(indexes, vec![1, 1, 1, 2, 2]);
        for (record, person) in result.records.iter().zip(result.groups.concat()) {
            assert_eq!(record.name, person.name);
            assert_eq!(record.role, person.role);
        }
    }

    #[test]
    fn test_pools_are_shuffled() {
        let people = roster(&[("A", 6)]);
        let table = quotas(&[("A", &[3, 3])]);
        let mut first_groups = std::collections::HashSet::new();
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let result = assign(&people, &table, &[3, 3], &mut rng).unwrap();
            let mut names: Vec<String> = result.groups[0].iter().map(|p| p.name.clone()).collect();
            names.sort();
            first_groups.insert(names);
        }
        assert!(first_groups.len() > 1);
    }

    #[test]
    fn test_leftovers_fill_open_seats() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let people = roster(&[("A", 2), ("B", 2)]);
        // Group 1 is one short; the unclaimed B goes there
        let table = quotas(&[("A", &[1, 1]), ("B", &[1, 0])]);
        let result = assign(&people, &table, &[2, 2], &mut rng).unwrap();

        assert_eq!(result.groups[0].len(), 2);
        assert_eq!(result.groups[1].len(), 2);
        assert_eq!(result.groups[1].iter().filter(|p| p.role == "B").count(), 1);
        assert_eq!(sorted(result.groups.concat()), sorted(people));
    }

    #[test]
    fn test_unlisted_roles_become_leftovers() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let people = roster(&[("A", 2), ("C", 2)]);
        let table = quotas(&[("A", &[1, 1])]);
        let result = assign(&people, &table, &[2, 2], &mut rng).unwrap();

        for members in &result.groups {
            assert_eq!(members.iter().filter(|p| p.role == "C").count(), 1);
        }
    }

    #[test]
    fn test_insufficient_supply() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let people = roster(&[("A", 2)]);
        let table = quotas(&[("A", &[2, 1])]);
        let err = assign(&people, &table, &[2, 1], &mut rng).unwrap_err();
        assert_eq!(
            err,
            AllocationError::InsufficientRoleSupply {
                role: "A".to_string(),
                group: 1,
                required: 1,
                available: 0,
            }
        );
    }

    #[test]
    fn test_overfilled_group_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let people = roster(&[("A", 3), ("B", 1)]);
        let table = quotas(&[("A", &[3, 0]), ("B", &[0, 1])]);
        let err = assign(&people, &table, &[2, 2], &mut rng).unwrap_err();
        assert!(matches!(err, AllocationError::AllocationInvariantViolation(_)));
    }

    #[test]
    fn test_leftover_without_seat_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let people = roster(&[("A", 3)]);
        let table = quotas(&[("A", &[1, 1])]);
        let err = assign(&people, &table, &[1, 1], &mut rng).unwrap_err();
        assert!(matches!(err, AllocationError::AllocationInvariantViolation(_)));
    }

    #[test]
    fn test_group_count_mismatch() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let people = roster(&[("A", 4)]);
        let table = quotas(&[("A", &[2, 2])]);
        let err = assign(&people, &table, &[4], &mut rng).unwrap_err();
        assert!(matches!(err, AllocationError::AllocationInvariantViolation(_)));
    }
}
