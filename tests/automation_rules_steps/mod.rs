//! Step definitions for automation rule behaviour scenarios.

mod given;
mod then;
mod when;
pub mod world;
