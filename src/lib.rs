//! `pgd-screen` library crate.
//!
//! The binary (`pgd`) is a thin wrapper around this library so that:
//!
//! - the engine is testable without spawning processes
//! - solver tiers and soil-force models can be swapped behind their traits
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod decision;
pub mod domain;
pub mod error;
pub mod io;
pub mod memo;
pub mod report;
pub mod springs;
pub mod stability;
pub mod sweep;
