//! Composite senone sequence synthesis and its cache.

use crate::error::Result;
use crate::hmm::HmmPosition;
use crate::model::core::AcousticModel;
use crate::senone::{CompositeSenone, Senone, SenoneSequence};
use crate::unit::Unit;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Log weight given to every synthesized composite senone.
pub const COMPOSITE_LOG_WEIGHT: f32 = 0.0;

/// Synthesized sequences keyed by the unit's canonical string form.
#[derive(Debug, Default)]
pub(crate) struct CompositeCache {
    sequences: RwLock<HashMap<String, Arc<SenoneSequence>>>,
}

impl CompositeCache {
    pub(crate) fn get(&self, key: &str) -> Option<Arc<SenoneSequence>> {
        self.sequences.read().get(key).cloned()
    }

    /// Insert unless another thread got there first. Returns the cached
    /// sequence either way.
    pub(crate) fn insert(&self, key: String, sequence: Arc<SenoneSequence>) -> Arc<SenoneSequence> {
        self.sequences
            .write()
            .entry(key)
            .or_insert(sequence)
            .clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.sequences.read().len()
    }
}

impl AcousticModel {
    /// Merged senone sequence of every trained HMM at `position` consistent
    /// with `unit`'s constrained context.
    ///
    /// Memoized per unit identity: the first sequence built for a unit is
    /// returned for every later call, whatever the position.
    pub fn composite_senone_sequence(
        &self,
        unit: &Unit,
        position: HmmPosition,
    ) -> Result<Arc<SenoneSequence>> {
        let key = unit.to_string();

        if let Some(sequence) = self.composites.get(&key) {
            tracing::debug!(unit = %key, "composite sequence cache hit");
            return Ok(sequence);
        }

        tracing::debug!(unit = %key, %position, "composite sequence cache miss");

        let data = self.data()?;

        let mut candidates: Vec<Arc<SenoneSequence>> = data
            .hmm_manager
            .hmms()
            .into_iter()
            .filter(|hmm| {
                hmm.position() == position
                    && hmm.unit().is_partial_match(unit.name(), unit.context())
            })
            .map(|hmm| hmm.senone_sequence().clone())
            .collect();

        if candidates.is_empty() {
            let ci_hmm = self.context_independent_hmm(unit.name())?;
            candidates.push(ci_hmm.senone_sequence().clone());
        }

        let sequence = Arc::new(merge_sequences(&candidates, COMPOSITE_LOG_WEIGHT));

        tracing::debug!(
            unit = %key,
            candidates = candidates.len(),
            states = sequence.len(),
            "composite sequence synthesized"
        );

        Ok(self.composites.insert(key, sequence))
    }
}

/// Merge sequences state by state.
///
/// State `i` of the result is a composite of the distinct senones at index
/// `i` of every sequence long enough to have one. The result is as long as
/// the longest input.
pub fn merge_sequences(sequences: &[Arc<SenoneSequence>], log_weight: f32) -> SenoneSequence {
    let longest = sequences.iter().map(|s| s.len()).max().unwrap_or(0);

    let senones = (0..longest)
        .map(|i| {
            let members = sequences
                .iter()
                .filter_map(|s| s.senones().get(i))
                .cloned();

            Arc::new(Senone::Composite(CompositeSenone::new(members, log_weight)))
        })
        .collect();

    SenoneSequence::new(senones)
}
