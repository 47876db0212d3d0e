//! Transient datastructures built and thrown away per entry.

pub mod frame; // open conditional chains
pub mod token;
