//! Allocation entry point
//!
//! Runs the three stages in order: size the groups, apportion role quotas,
//! assign people. Each call builds and discards its own state.
//!
//! # Usage
//!
//! ```
//! use balanced_groups::{AllocationConfig, Allocator, Person};
//!
//! let roster: Vec<Person> = (0..9)
//!     .map(|i| Person::new(format!("p{}", i), if i < 6 { "A" } else { "B" }))
//!     .collect();
//! let allocator = Allocator::new(AllocationConfig::new(3.0).with_seed(7)).unwrap();
//! let allocation = allocator.allocate(&roster).unwrap();
//! assert_eq!(allocation.capacities, vec![3, 3, 3]);
//! ```

use rand::Rng;
use tracing::{debug, info};

use crate::assign::{assign, AnnotatedRecord, Assignment};
use crate::config::AllocationConfig;
use crate::error::{AllocationError, Result};
use crate::quota::{apportion, QuotaTable};
use crate::roster::{count_roles, Person, RoleCounts};
use crate::seeds::AllocationSeeds;
use crate::sizing::compute_group_sizes;

/// Result of one allocation, with the intermediate tables that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    pub capacities: Vec<usize>,
    pub role_counts: RoleCounts,
    pub quotas: QuotaTable,
    pub groups: Vec<Vec<Person>>,
    pub records: Vec<AnnotatedRecord>,
}

impl Allocation {
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Role tally of one group (0-based index)
    pub fn group_composition(&self, group: usize) -> RoleCounts {
        self.groups
            .get(group)
            .map(|members| count_roles(members))
            .unwrap_or_default()
    }
}

/// Split `roster` into balanced groups of roughly `desired_group_size`.
///
/// Seeds for the tie-break and pool-shuffle streams are drawn from `rng`.
pub fn allocate<R: Rng + ?Sized>(
    roster: &[Person],
    desired_group_size: f64,
    rng: &mut R,
) -> Result<Allocation> {
    let seeds = AllocationSeeds::from_master(rng.gen());
    run(
        roster,
        desired_group_size,
        &mut seeds.ties_rng(),
        &mut seeds.pools_rng(),
    )
}

/// The three stages, with tie-breaking and pool shuffles on separate streams.
fn run<T: Rng + ?Sized, P: Rng + ?Sized>(
    roster: &[Person],
    desired_group_size: f64,
    ties_rng: &mut T,
    pools_rng: &mut P,
) -> Result<Allocation> {
    if let Some(index) = roster
        .iter()
        .position(|p| p.name.trim().is_empty() || p.role.trim().is_empty())
    {
        return Err(AllocationError::InvalidConfiguration(format!(
            "roster entry {} has a blank name or role",
            index + 1
        )));
    }

    let capacities = compute_group_sizes(roster.len(), desired_group_size)?;
    let role_counts = count_roles(roster);
    debug!(?capacities, roles = role_counts.len(), "sized groups");

    let quotas = apportion(&capacities, &role_counts, ties_rng)?;
    let Assignment { groups, records } = assign(roster, &quotas, &capacities, pools_rng)?;

    Ok(Allocation {
        capacities,
        role_counts,
        quotas,
        groups,
        records,
    })
}

/// Reusable allocator bound to a configuration and a seed set.
///
/// Tie-breaking and pool shuffles use separate seeded streams, so the same
/// seeds reproduce the same allocation exactly.
#[derive(Clone, Debug)]
pub struct Allocator {
    config: AllocationConfig,
    seeds: AllocationSeeds,
}

impl Allocator {
    pub fn new(config: AllocationConfig) -> Result<Self> {
        let seeds = config
            .seed
            .map(AllocationSeeds::from_master)
            .unwrap_or_default();
        Self::with_seeds(config, seeds)
    }

    pub fn with_seeds(config: AllocationConfig, seeds: AllocationSeeds) -> Result<Self> {
        config.validate()?;
        Ok(Allocator { config, seeds })
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    pub fn seeds(&self) -> &AllocationSeeds {
        &self.seeds
    }

    pub fn allocate(&self, roster: &[Person]) -> Result<Allocation> {
        info!(
            people = roster.len(),
            seed = self.seeds.master,
            "allocating roster"
        );
        run(
            roster,
            self.config.desired_group_size,
            &mut self.seeds.ties_rng(),
            &mut self.seeds.pools_rng(),
        )
    }
}
