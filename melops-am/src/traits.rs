//! Core traits for acoustic model components.

use crate::error::Result;
use crate::loader::ModelData;
use crate::unit_manager::UnitManager;

/// Source of trained acoustic model data.
///
/// This trait abstracts over where and how a model is stored, so the
/// [`AcousticModel`](crate::model::AcousticModel) only sees the registries it
/// resolves against.
pub trait Loader: Send + Sync {
    /// Load the model, registering its context-independent units with
    /// `unit_manager`.
    ///
    /// Fails with [`LoadError`](crate::error::LoadError) when model data is
    /// missing or malformed.
    fn load(&self, unit_manager: &UnitManager) -> Result<ModelData>;
}

/// Closures act as loaders, which keeps in-memory models cheap to build.
impl<F> Loader for F
where
    F: Fn(&UnitManager) -> Result<ModelData> + Send + Sync,
{
    fn load(&self, unit_manager: &UnitManager) -> Result<ModelData> {
        self(unit_manager)
    }
}
