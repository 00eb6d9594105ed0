//! Unit to HMM resolution.

use crate::error::{IntegrityError, Result};
use crate::hmm::{Hmm, HmmPosition};
use crate::model::core::AcousticModel;
use crate::unit::{Context, Unit};
use std::sync::Arc;

impl AcousticModel {
    /// Registered HMM for exactly `unit` at `position`.
    pub fn lookup_hmm(&self, unit: &Unit, position: HmmPosition) -> Result<Option<Arc<Hmm>>> {
        Ok(self.data()?.hmm_manager.get(position, unit))
    }

    /// Best available HMM for `unit` at `position`.
    ///
    /// With `exact_match` the registry answer is returned as is and may be
    /// `None`. Otherwise the lookup falls back, in order, to:
    ///
    /// 1. a composite HMM synthesized from every trained HMM consistent with
    ///    the unit's constrained context (when composites are enabled)
    /// 2. the unit at any other position
    /// 3. the unit with non-silence fillers in its context replaced by silence
    /// 4. the context-independent HMM of the base phone
    ///
    /// A non-exact lookup never returns `None`. Failing the last step is an
    /// [`IntegrityError`].
    pub fn lookup_nearest_hmm(
        &self,
        unit: &Arc<Unit>,
        position: HmmPosition,
        exact_match: bool,
    ) -> Result<Option<Arc<Hmm>>> {
        let data = self.data()?;

        if let Some(hmm) = data.hmm_manager.get(position, unit) {
            return Ok(Some(hmm));
        }

        if exact_match {
            tracing::trace!(%unit, %position, "no exact hmm");
            return Ok(None);
        }

        if self.config().use_composites && unit.is_composite_candidate() {
            return self.composite_hmm(unit, position).map(Some);
        }

        if let Some(hmm) = self.hmm_at_any_position(unit)? {
            tracing::trace!(%unit, found = %hmm.position(), "resolved at another position");
            return Ok(Some(hmm));
        }

        if let Some(hmm) = self.hmm_in_silence_context(unit, position)? {
            return Ok(Some(hmm));
        }

        let hmm = self.context_independent_hmm(unit.name())?;
        tracing::debug!(%unit, %position, "backed off to context-independent hmm");

        Ok(Some(hmm))
    }

    /// Context-independent HMM of base phone `name`.
    pub(super) fn context_independent_hmm(&self, name: &str) -> Result<Arc<Hmm>> {
        let Some(unit) = self.unit_manager().context_independent(name) else {
            tracing::error!(name, "model has no context-independent unit");
            return Err(IntegrityError::MissingContextIndependentUnit {
                name: name.to_string(),
            }
            .into());
        };

        match self.data()?.hmm_manager.get(HmmPosition::Undefined, &unit) {
            Some(hmm) => Ok(hmm),
            None => {
                tracing::error!(%unit, "model has no context-independent hmm");
                Err(IntegrityError::MissingContextIndependentHmm {
                    unit: unit.to_string(),
                }
                .into())
            }
        }
    }

    /// Context-independent unit registered by the model for `name`.
    pub fn context_independent_unit(&self, name: &str) -> Result<Option<Arc<Unit>>> {
        Ok(self.data()?.ci_units.get(name).cloned())
    }

    fn composite_hmm(&self, unit: &Arc<Unit>, position: HmmPosition) -> Result<Arc<Hmm>> {
        let senones = self.composite_senone_sequence(unit, position)?;
        let ci_hmm = self.context_independent_hmm(unit.name())?;

        let hmm = Hmm::new(
            unit.clone(),
            senones,
            ci_hmm.transition_matrix().clone(),
            position,
        );

        let hmm = self.data()?.hmm_manager.put(hmm);
        tracing::debug!(%unit, %position, states = hmm.order(), "registered composite hmm");

        Ok(hmm)
    }

    fn hmm_at_any_position(&self, unit: &Unit) -> Result<Option<Arc<Hmm>>> {
        let hmm_manager = &self.data()?.hmm_manager;

        Ok(HmmPosition::ALL
            .into_iter()
            .find_map(|position| hmm_manager.get(position, unit)))
    }

    fn hmm_in_silence_context(
        &self,
        unit: &Unit,
        position: HmmPosition,
    ) -> Result<Option<Arc<Hmm>>> {
        let Context::LeftRight { left, right } = unit.context() else {
            return Ok(None);
        };

        let silence = self.unit_manager().silence();

        let needs_substitution = |side: &Option<Vec<Arc<Unit>>>| {
            side.iter()
                .flatten()
                .any(|u| u.is_filler() && **u != **silence)
        };

        if !needs_substitution(left) && !needs_substitution(right) {
            return Ok(None);
        }

        let with_silence = |side: &Option<Vec<Arc<Unit>>>| {
            side.as_ref().map(|units| {
                units
                    .iter()
                    .map(|u| {
                        if u.is_filler() {
                            silence.clone()
                        } else {
                            u.clone()
                        }
                    })
                    .collect()
            })
        };

        let context = Context::left_right(with_silence(left), with_silence(right));
        let substituted = self
            .unit_manager()
            .get_unit(unit.name(), unit.is_filler(), context);

        tracing::debug!(%unit, %substituted, "substituted silence into context");

        if let Some(hmm) = self.lookup_hmm(&substituted, position)? {
            return Ok(Some(hmm));
        }

        self.hmm_at_any_position(&substituted)
    }
}
