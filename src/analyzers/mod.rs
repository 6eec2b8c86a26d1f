//! Census aggregation and sampling.
//!
//! This module groups flat tree records by neighborhood, computes
//! descriptive statistics and frequency tables for each group and for the
//! whole dataset, and draws the seeded heatmap sample.

pub mod aggregate;
pub mod sample;
pub mod types;
pub mod utility;
