//! Balanced group allocation library
//!
//! Splits a roster of people tagged with roles into near-equal groups whose
//! role mix mirrors the whole roster as closely as integer counts allow.

pub mod allocator;
pub mod assign;
pub mod config;
pub mod error;
pub mod export;
pub mod quota;
pub mod roster;
pub mod seeds;
pub mod sizing;

pub use allocator::{allocate, Allocation, Allocator};
pub use assign::AnnotatedRecord;
pub use config::AllocationConfig;
pub use error::{AllocationError, Result};
pub use quota::QuotaTable;
pub use roster::{Person, RoleCounts};
pub use seeds::AllocationSeeds;
