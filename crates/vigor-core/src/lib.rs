//! VIGOR Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout the VIGOR engine:
//! - Identifiers (SourceId, StatKey)
//! - Modifier value records and their combination kinds
//! - Change-notification primitives (Observers, Subscription)
//! - Engine errors

pub mod error;
pub mod id;
pub mod modifier;
pub mod observe;

pub use error::*;
pub use id::*;
pub use modifier::*;
pub use observe::*;
