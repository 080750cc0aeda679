//! Data types shared across the scribe library.

pub mod config;
pub mod record;
