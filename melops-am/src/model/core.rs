//! Acoustic model definition, lifecycle and accessors.

use crate::config::AcousticModelConfig;
use crate::error::{Error, Result};
use crate::hmm::Hmm;
use crate::loader::ModelData;
use crate::model::composite::CompositeCache;
use crate::senone::Senone;
use crate::traits::Loader;
use crate::unit::Unit;
use crate::unit_manager::UnitManager;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

/// Tied-state acoustic model.
///
/// Resolves units to HMMs, falling back through composite synthesis,
/// other word positions, silence substitution and finally the
/// context-independent HMM. Lookups take `&self` and may run on many
/// threads once [`allocate`](Self::allocate) has returned.
pub struct AcousticModel {
    loader: Arc<dyn Loader>,
    unit_manager: Arc<UnitManager>,
    config: AcousticModelConfig,
    data: OnceLock<ModelData>,
    allocation: Mutex<()>,
    pub(super) composites: CompositeCache,
}

impl AcousticModel {
    /// Create an unallocated model.
    ///
    /// # Arguments
    ///
    /// * `loader` - Source of trained model data
    /// * `unit_manager` - Unit registry shared with the loader
    /// * `config` - Resolver configuration
    pub fn new(
        loader: Arc<dyn Loader>,
        unit_manager: Arc<UnitManager>,
        config: AcousticModelConfig,
    ) -> Self {
        Self {
            loader,
            unit_manager,
            config,
            data: OnceLock::new(),
            allocation: Mutex::new(()),
            composites: CompositeCache::default(),
        }
    }

    /// Load the model. Repeated calls after a success are no-ops.
    ///
    /// A failed load leaves the model unallocated.
    pub fn allocate(&self) -> Result<()> {
        if self.data.get().is_some() {
            return Ok(());
        }

        let _guard = self.allocation.lock();

        if self.data.get().is_some() {
            return Ok(());
        }

        let data = self.loader.load(&self.unit_manager).inspect_err(|e| {
            tracing::error!(error = %e, "failed to load acoustic model");
        })?;

        tracing::info!(
            hmms = data.hmm_manager.len(),
            senones = data.senone_pool.len(),
            ci_units = data.ci_units.len(),
            "acoustic model allocated"
        );

        let _ = self.data.set(data);

        Ok(())
    }

    /// Release model resources. Currently a no-op: resources are freed when
    /// the model is dropped.
    pub fn deallocate(&self) {
        tracing::debug!("acoustic model deallocate requested");
    }

    pub fn is_allocated(&self) -> bool {
        self.data.get().is_some()
    }

    pub(super) fn data(&self) -> Result<&ModelData> {
        self.data.get().ok_or(Error::NotAllocated)
    }

    pub fn config(&self) -> &AcousticModelConfig {
        &self.config
    }

    pub fn unit_manager(&self) -> &Arc<UnitManager> {
        &self.unit_manager
    }

    /// Tied senone at `id` in the senone pool.
    pub fn senone(&self, id: usize) -> Result<Arc<Senone>> {
        let pool = &self.data()?.senone_pool;

        pool.get(id).cloned().ok_or(Error::SenoneOutOfRange {
            id,
            len: pool.len(),
        })
    }

    pub fn left_context_size(&self) -> Result<usize> {
        Ok(self.data()?.left_context_size)
    }

    pub fn right_context_size(&self) -> Result<usize> {
        Ok(self.data()?.right_context_size)
    }

    /// Iterate every registered HMM.
    ///
    /// Each call takes a fresh snapshot, so composite HMMs synthesized since
    /// the previous call are included.
    pub fn hmm_iter(&self) -> Result<impl Iterator<Item = Arc<Hmm>> + use<>> {
        Ok(self.data()?.hmm_manager.hmms().into_iter())
    }

    /// Iterate the model's context-independent units, ordered by name.
    pub fn context_independent_unit_iter(&self) -> Result<impl Iterator<Item = &Arc<Unit>>> {
        Ok(self.data()?.ci_units.values())
    }

    /// Number of registered HMMs, synthesized ones included.
    pub fn hmm_count(&self) -> Result<usize> {
        Ok(self.data()?.hmm_manager.len())
    }

    /// Number of cached composite senone sequences.
    pub fn composite_cache_len(&self) -> usize {
        self.composites.len()
    }

    /// Log model statistics.
    pub fn log_info(&self) -> Result<()> {
        self.data()?.log_info();
        tracing::info!(
            use_composites = self.config.use_composites,
            composites = self.composites.len(),
            "acoustic model resolver"
        );
        Ok(())
    }
}
