//! Acoustic model resolver.
//!
//! - `core`: model lifecycle and accessors
//! - `lookup`: the unit to HMM fallback chain
//! - `composite`: composite senone synthesis and its cache

pub mod composite;
pub mod core;
pub mod lookup;

pub use self::composite::{COMPOSITE_LOG_WEIGHT, merge_sequences};
pub use self::core::AcousticModel;
