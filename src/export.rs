//! Export allocations to JSON and plain text

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::allocator::Allocation;
use crate::assign::AnnotatedRecord;
use crate::roster::{Person, RoleCounts};

/// Exported allocation data
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationExport {
    pub seed: Option<u64>,
    pub group_count: usize,
    pub capacities: Vec<usize>,
    pub groups: Vec<GroupExport>,
    pub records: Vec<AnnotatedRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupExport {
    /// 1-based, matching `AnnotatedRecord::group_index`
    pub index: usize,
    pub members: Vec<Person>,
    pub composition: RoleCounts,
}

/// Build the export structure from an allocation
pub fn create_export(allocation: &Allocation, seed: Option<u64>) -> AllocationExport {
    let groups = allocation
        .groups
        .iter()
        .enumerate()
        .map(|(i, members)| GroupExport {
            index: i + 1,
            members: members.clone(),
            composition: allocation.group_composition(i),
        })
        .collect();

    AllocationExport {
        seed,
        group_count: allocation.group_count(),
        capacities: allocation.capacities.clone(),
        groups,
        records: allocation.records.clone(),
    }
}

/// Export allocation to a JSON file
pub fn export_allocation(
    allocation: &Allocation,
    seed: Option<u64>,
    path: &Path,
) -> std::io::Result<()> {
    let export = create_export(allocation, seed);
    let json = serde_json::to_string_pretty(&export)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;

    Ok(())
}

/// Text rendering of the groups, one block per group
pub struct GroupSummary<'a>(pub &'a Allocation);

impl fmt::Display for GroupSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let allocation = self.0;
        for (i, members) in allocation.groups.iter().enumerate() {
            let composition = allocation
                .group_composition(i)
                .iter()
                .map(|(role, count)| format!("{} {}", count, role))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "Group {} ({} people: {})", i + 1, members.len(), composition)?;
            for person in members {
                writeln!(f, "  {} [{}]", person.name, person.role)?;
            }
        }
        Ok(())
    }
}
