//! Allocation strategies, strategy comparison, and planning aids built on
//! top of the simulator.

pub mod comparator;
pub mod reserves;
pub mod strategy;
pub mod summary;
