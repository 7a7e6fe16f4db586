//! Command handlers for the mcdwalk CLI

pub mod check;
pub mod walk;
