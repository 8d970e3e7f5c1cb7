//! Output formatting for assessment results

pub mod report;
