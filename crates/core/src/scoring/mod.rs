//! Deterministic scorers. Both are pure: identical inputs give identical outputs.

pub mod risk;
pub mod sentiment;
