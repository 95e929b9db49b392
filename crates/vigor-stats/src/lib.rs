//! VIGOR Stats - The reactive stat graph
//!
//! This crate holds the stateful half of the engine:
//! - [`Stat`]: a base value plus ordered modifiers behind a dirty-flag cache
//! - [`Vital`]: a clamped, ratio-preserving resource bound to a stat
//! - [`StatRegistry`]/[`StatTable`]: the lookup surface hosts hang stats on
//!
//! Everything here is single-threaded and callback-driven: mutations
//! complete synchronously, and every notification is delivered inside the
//! call that caused it.

pub mod registry;
pub mod stat;
pub mod vital;

pub use registry::*;
pub use stat::*;
pub use vital::*;
