//! # cansar-core
//!
//! Core types, traits, and abstractions for the CAN-SAR data pipeline.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other cansar crates depend on: the conservation entity models,
//! the shared error type, repository traits, and the structured logging
//! field schema.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
