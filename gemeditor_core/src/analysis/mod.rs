//! Whole model analyses: duplicate detection and merging, summary statistics
pub mod duplicates;
pub mod statistics;
