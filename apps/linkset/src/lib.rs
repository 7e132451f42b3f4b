//! # Linkset
//!
//! Command-line front end for linkset-core over a redb-backed graph.

pub mod cli;
pub mod config;
