//! Classbridge command-line host
//!
//! Loads the three classifier artifacts, then classifies a single sample,
//! every row of a CSV file, or prints what the model declares.

pub mod cli;
pub mod commands;
pub mod report;
