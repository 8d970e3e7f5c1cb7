//! Progress reporting for story turns

pub mod reporter;
