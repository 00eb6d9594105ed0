//! mel-am: inspect tied-state acoustic models and resolve units to HMMs.

pub mod cli;
pub mod config;
pub mod info;
pub mod lookup;
