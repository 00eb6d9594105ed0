//! melops-am: tied-state acoustic model resolution for speech decoders.
//!
//! Given a context-dependent phonetic unit and its position in a word, this
//! crate finds the HMM a decoder should score against incoming frames. Units
//! never seen in training resolve through a fixed fallback chain, and
//! partially specified units get composite HMMs synthesized on demand.
//!
//! # Architecture
//!
//! - [`unit`]: units and their left/right contexts
//! - [`senone`]: tied and composite observation models
//! - [`hmm`]: HMMs and the `(position, unit)` registry
//! - [`loader`]: model files to registries, behind [`traits::Loader`]
//! - [`model::AcousticModel`]: the resolver
//!
//! # Quick Start
//!
//! ```ignore
//! use melops_am::config::AcousticModelConfig;
//! use melops_am::hmm::HmmPosition;
//! use melops_am::loader::TiedStateLoader;
//! use melops_am::model::AcousticModel;
//! use melops_am::unit::Context;
//! use melops_am::unit_manager::UnitManager;
//! use std::sync::Arc;
//!
//! let units = Arc::new(UnitManager::new());
//! let model = AcousticModel::new(
//!     Arc::new(TiedStateLoader::from_dir("model_dir")),
//!     units.clone(),
//!     AcousticModelConfig::default(),
//! );
//! model.allocate()?;
//!
//! let t = units.context_independent("T").unwrap();
//! let unit = units.get_unit("AE", false, Context::left_right(None, Some(vec![t])));
//! let hmm = model.lookup_nearest_hmm(&unit, HmmPosition::Internal, false)?;
//! ```

pub mod config;
pub mod error;
pub mod hmm;
pub mod loader;
pub mod model;
pub mod senone;
pub mod traits;
pub mod types;
pub mod unit;
pub mod unit_manager;
