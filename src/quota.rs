//! Quota apportionment
//!
//! Decides how many members of each role every group receives. Ideal quotas
//! `capacity * role_total / population` are floored, then the leftover units
//! go to the cells with the largest fractional remainder (Hamilton's method)
//! while respecting both the group capacities and the role totals.
//!
//! Fractions are kept exact: a cell's remainder is the numerator
//! `(capacity * role_total) mod population`, so equal remainders are equal
//! integers and ties are broken only by the random permutation.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AllocationError, Result};
use crate::roster::RoleCounts;
use crate::seeds::shuffle;

/// Target count of every role in every group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaTable {
    targets: BTreeMap<String, Vec<usize>>,
    group_count: usize,
    /// Units placed by the residual fallback rather than the greedy pass
    residual_bumps: usize,
}

impl QuotaTable {
    /// Build a table from explicit per-role targets.
    ///
    /// Every role must list one target per group. Sums are not checked here;
    /// the assigner verifies the final group sizes.
    pub fn from_targets(targets: BTreeMap<String, Vec<usize>>) -> Result<Self> {
        let group_count = targets.values().next().map_or(0, Vec::len);
        if let Some((role, row)) = targets.iter().find(|(_, row)| row.len() != group_count) {
            return Err(AllocationError::InvalidConfiguration(format!(
                "role '{}' has {} targets, expected {}",
                role,
                row.len(),
                group_count
            )));
        }
        Ok(QuotaTable {
            targets,
            group_count,
            residual_bumps: 0,
        })
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.targets.iter().map(|(role, row)| (role.as_str(), row.as_slice()))
    }

    /// Targets for one role across all groups
    pub fn targets(&self, role: &str) -> Option<&[usize]> {
        self.targets.get(role).map(Vec::as_slice)
    }

    /// Target of `role` in `group`, zero if either is unknown
    pub fn get(&self, role: &str, group: usize) -> usize {
        self.targets
            .get(role)
            .and_then(|row| row.get(group))
            .copied()
            .unwrap_or(0)
    }

    /// Sum over roles for one group
    pub fn group_total(&self, group: usize) -> usize {
        self.targets.values().filter_map(|row| row.get(group)).sum()
    }

    /// Sum over groups for one role
    pub fn role_total(&self, role: &str) -> usize {
        self.targets.get(role).map_or(0, |row| row.iter().sum())
    }

    pub fn residual_bumps(&self) -> usize {
        self.residual_bumps
    }
}

/// A (group, role) pair with its fractional remainder numerator.
#[derive(Clone, Copy, Debug)]
struct Cell {
    group: usize,
    role: usize,
    remainder: usize,
}

/// Working state between flooring and the final table.
#[derive(Clone, Debug)]
struct Apportionment {
    roles: Vec<String>,
    /// Provisional targets, indexed `[role][group]`
    targets: Vec<Vec<usize>>,
    /// Remainder numerators over the population, indexed `[role][group]`
    remainders: Vec<Vec<usize>>,
    /// Units per role still to place
    extra: Vec<usize>,
    /// Open seats per group
    deficit: Vec<usize>,
}

impl Apportionment {
    fn floor(capacities: &[usize], role_counts: &RoleCounts, population: usize) -> Self {
        let roles: Vec<String> = role_counts.keys().cloned().collect();
        let mut targets = Vec::with_capacity(roles.len());
        let mut remainders = Vec::with_capacity(roles.len());
        let mut extra = Vec::with_capacity(roles.len());
        let mut deficit = capacities.to_vec();

        for total in role_counts.values() {
            let mut row = Vec::with_capacity(capacities.len());
            let mut rem_row = Vec::with_capacity(capacities.len());
            for (group, &capacity) in capacities.iter().enumerate() {
                let scaled = capacity * total;
                let floor = scaled / population;
                row.push(floor);
                rem_row.push(scaled % population);
                deficit[group] -= floor;
            }
            extra.push(total - row.iter().sum::<usize>());
            targets.push(row);
            remainders.push(rem_row);
        }

        Apportionment {
            roles,
            targets,
            remainders,
            extra,
            deficit,
        }
    }

    /// All cells, shuffled then stably sorted by remainder descending.
    fn ranked_cells<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Cell> {
        let mut cells: Vec<Cell> = (0..self.roles.len())
            .flat_map(|role| (0..self.deficit.len()).map(move |group| (role, group)))
            .map(|(role, group)| Cell {
                group,
                role,
                remainder: self.remainders[role][group],
            })
            .collect();
        shuffle(&mut cells, rng);
        cells.sort_by(|a, b| b.remainder.cmp(&a.remainder));
        cells
    }

    fn bump(&mut self, role: usize, group: usize) {
        self.targets[role][group] += 1;
        self.extra[role] -= 1;
        self.deficit[group] -= 1;
    }

    /// One pass over the ranked cells; each cell is visited once.
    fn greedy(&mut self, cells: &[Cell]) {
        for cell in cells {
            if self.extra[cell.role] > 0 && self.deficit[cell.group] > 0 {
                self.bump(cell.role, cell.group);
            }
        }
    }

    /// Fill any seats the greedy pass left open. Returns the number of bumps.
    fn fill_residual(&mut self) -> Result<usize> {
        let mut bumps = 0;
        for group in 0..self.deficit.len() {
            while self.deficit[group] > 0 {
                let role = (0..self.roles.len())
                    .filter(|&r| self.extra[r] > 0)
                    .max_by_key(|&r| (self.remainders[r][group], self.extra[r]))
                    .ok_or_else(|| {
                        AllocationError::AllocationInvariantViolation(format!(
                            "group {} has {} open seats but every role is fully placed",
                            group, self.deficit[group]
                        ))
                    })?;
                self.bump(role, group);
                bumps += 1;
            }
        }
        Ok(bumps)
    }

    fn into_table(
        self,
        capacities: &[usize],
        role_counts: &RoleCounts,
        residual_bumps: usize,
    ) -> Result<QuotaTable> {
        let table = QuotaTable {
            targets: self.roles.into_iter().zip(self.targets).collect(),
            group_count: capacities.len(),
            residual_bumps,
        };

        for (group, &capacity) in capacities.iter().enumerate() {
            let total = table.group_total(group);
            if total != capacity {
                return Err(AllocationError::AllocationInvariantViolation(format!(
                    "group {} apportioned {} seats, capacity is {}",
                    group, total, capacity
                )));
            }
        }
        for (role, &count) in role_counts {
            let total = table.role_total(role);
            if total != count {
                return Err(AllocationError::AllocationInvariantViolation(format!(
                    "role '{}' apportioned {} members, roster has {}",
                    role, total, count
                )));
            }
        }
        Ok(table)
    }
}

/// Apportion role counts across group capacities.
///
/// `capacities` and `role_counts` must describe the same population. Ties
/// between equal remainders are resolved uniformly at random using `rng`.
pub fn apportion<R: Rng + ?Sized>(
    capacities: &[usize],
    role_counts: &RoleCounts,
    rng: &mut R,
) -> Result<QuotaTable> {
    let population: usize = capacities.iter().sum();
    let counted: usize = role_counts.values().sum();
    if capacities.is_empty() || population == 0 {
        return Err(AllocationError::InvalidConfiguration(
            "cannot apportion into zero seats".to_string(),
        ));
    }
    if population != counted {
        return Err(AllocationError::InvalidConfiguration(format!(
            "capacities hold {} people but role counts total {}",
            population, counted
        )));
    }

    let mut state = Apportionment::floor(capacities, role_counts, population);
    let cells = state.ranked_cells(rng);
    state.greedy(&cells);

    let residual_bumps = state.fill_residual()?;
    if residual_bumps > 0 {
        debug!(residual_bumps, "filled seats left open by the greedy pass");
    }

    let table = state.into_table(capacities, role_counts, residual_bumps)?;
    debug!(groups = table.group_count(), roles = role_counts.len(), "apportioned quotas");
    Ok(table)
}
