//! Git context for the project segment.

pub mod branch;

pub use branch::BranchLookup;
