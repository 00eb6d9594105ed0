//! HMMs and the registry that stores them by position and unit.

use crate::error::LoadError;
use crate::senone::SenoneSequence;
use crate::unit::Unit;
use ndarray::Array2;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Position of a unit within a word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HmmPosition {
    Begin,
    End,
    Single,
    Internal,
    Undefined,
}

impl HmmPosition {
    /// Every position, in the order the any-position fallback scans them.
    pub const ALL: [HmmPosition; 5] = [
        HmmPosition::Begin,
        HmmPosition::End,
        HmmPosition::Single,
        HmmPosition::Internal,
        HmmPosition::Undefined,
    ];

    /// Single-character tag used in model definitions.
    pub fn abbreviation(self) -> char {
        match self {
            HmmPosition::Begin => 'b',
            HmmPosition::End => 'e',
            HmmPosition::Single => 's',
            HmmPosition::Internal => 'i',
            HmmPosition::Undefined => '-',
        }
    }
}

impl fmt::Display for HmmPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl FromStr for HmmPosition {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HmmPosition::ALL
            .into_iter()
            .find(|p| s.len() == 1 && s.starts_with(p.abbreviation()))
            .ok_or_else(|| LoadError::UnknownPosition(s.to_string()))
    }
}

/// Hidden Markov Model for one unit at one word position.
///
/// The transition matrix is in natural-log domain with one row per emitting
/// state and one extra column for the exit transition.
#[derive(Clone, Debug)]
pub struct Hmm {
    unit: Arc<Unit>,
    senones: Arc<SenoneSequence>,
    transition_matrix: Arc<Array2<f32>>,
    position: HmmPosition,
}

impl Hmm {
    pub fn new(
        unit: Arc<Unit>,
        senones: Arc<SenoneSequence>,
        transition_matrix: Arc<Array2<f32>>,
        position: HmmPosition,
    ) -> Self {
        Self {
            unit,
            senones,
            transition_matrix,
            position,
        }
    }

    pub fn unit(&self) -> &Arc<Unit> {
        &self.unit
    }

    pub fn senone_sequence(&self) -> &Arc<SenoneSequence> {
        &self.senones
    }

    pub fn transition_matrix(&self) -> &Arc<Array2<f32>> {
        &self.transition_matrix
    }

    pub fn position(&self) -> HmmPosition {
        self.position
    }

    /// Number of emitting states.
    pub fn order(&self) -> usize {
        self.senones.len()
    }

    /// Whether this HMM merges several trained senones per state.
    pub fn is_composite(&self) -> bool {
        self.senones
            .senones()
            .iter()
            .any(|s| s.id().is_composite())
    }
}

#[derive(Debug, Default)]
struct HmmTable {
    by_position: HashMap<HmmPosition, HashMap<Arc<Unit>, Arc<Hmm>>>,
    all: Vec<Arc<Hmm>>,
}

/// HMM registry keyed by `(position, unit)`.
///
/// Reads and inserts may run concurrently. An insert never replaces an
/// existing entry, so every caller racing on the same key ends up with the
/// same HMM.
#[derive(Debug, Default)]
pub struct HmmManager {
    table: RwLock<HmmTable>,
    #[cfg(test)]
    scans: std::sync::atomic::AtomicUsize,
}

impl HmmManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, position: HmmPosition, unit: &Unit) -> Option<Arc<Hmm>> {
        self.table
            .read()
            .by_position
            .get(&position)
            .and_then(|units| units.get(unit))
            .cloned()
    }

    /// Insert `hmm` unless its key is taken; returns the registered HMM.
    pub fn put(&self, hmm: Hmm) -> Arc<Hmm> {
        let mut table = self.table.write();
        let HmmTable { by_position, all } = &mut *table;

        by_position
            .entry(hmm.position)
            .or_default()
            .entry(hmm.unit.clone())
            .or_insert_with(|| {
                let hmm = Arc::new(hmm);
                all.push(hmm.clone());
                hmm
            })
            .clone()
    }

    /// Snapshot of every registered HMM in insertion order.
    pub fn hmms(&self) -> Vec<Arc<Hmm>> {
        #[cfg(test)]
        self.scans
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        self.table.read().all.clone()
    }

    /// Number of [`hmms`](Self::hmms) snapshots taken so far.
    #[cfg(test)]
    pub(crate) fn scan_count(&self) -> usize {
        self.scans.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.table.read().all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of HMMs registered at `position`.
    pub fn count_at(&self, position: HmmPosition) -> usize {
        self.table
            .read()
            .by_position
            .get(&position)
            .map_or(0, HashMap::len)
    }

    /// Log per-position HMM counts.
    pub fn log_info(&self) {
        tracing::info!(hmms = self.len(), "hmm manager");

        for position in HmmPosition::ALL {
            tracing::info!(%position, hmms = self.count_at(position), "hmms at position");
        }
    }
}
