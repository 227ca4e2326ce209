//! Swath Core - Foundational types for the swath spreader simulation
//!
//! This crate provides the types the simulation crate depends on:
//! - `Vec3` - World-frame spatial vector
//! - Error types and Result alias

mod error;
mod types;

pub use error::{Result, SwathError};
pub use types::Vec3;
