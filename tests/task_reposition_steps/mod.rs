//! Step definitions for task reposition scenarios.

pub mod given;
pub mod when;
pub mod world;
