//! Configuration for an allocation run.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sizing::check_desired_size;

/// Parameters for splitting a roster into groups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Preferred number of people per group (default: 4).
    pub desired_group_size: f64,

    /// Master seed; a fresh random one is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            desired_group_size: 4.0,
            seed: None,
        }
    }
}

impl AllocationConfig {
    pub fn new(desired_group_size: f64) -> Self {
        Self {
            desired_group_size,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject group sizes that cannot form groups.
    pub fn validate(&self) -> Result<()> {
        check_desired_size(self.desired_group_size)
    }
}
