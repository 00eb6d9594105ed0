//! Observation models bound to HMM states.
//!
//! Gaussian evaluation lives outside this crate. The decoder computes one log
//! score per tied senone for the current frame and hands that table to
//! [`Senone::score`], which resolves composites on top of it.

use ndarray::ArrayView1;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

/// Senone identity.
///
/// Tied senones use their pool index. Composite ids carry the high bit so
/// they never collide with a tied id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SenoneId(u64);

impl SenoneId {
    const COMPOSITE_BIT: u64 = 1 << 63;

    /// Id of the tied senone at `index` in the senone pool.
    pub fn tied(index: usize) -> Self {
        Self(index as u64 & !Self::COMPOSITE_BIT)
    }

    pub fn is_composite(self) -> bool {
        self.0 & Self::COMPOSITE_BIT != 0
    }

    /// Pool index for tied senones.
    pub fn index(self) -> Option<usize> {
        (!self.is_composite()).then_some(self.0 as usize)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SenoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(index) => write!(f, "{index}"),
            None => write!(f, "c{:016x}", self.0),
        }
    }
}

/// Observation-probability model for one HMM state.
#[derive(Clone, Debug)]
pub enum Senone {
    /// Trained senone from the tied pool
    Tied(SenoneId),
    /// Merge of several senones
    Composite(CompositeSenone),
}

impl Senone {
    /// Tied senone at `index` in the senone pool.
    pub fn tied(index: usize) -> Self {
        Senone::Tied(SenoneId::tied(index))
    }

    pub fn id(&self) -> SenoneId {
        match self {
            Senone::Tied(id) => *id,
            Senone::Composite(composite) => composite.id,
        }
    }

    /// Log score of this senone given per-tied-senone frame scores.
    ///
    /// A tied senone missing from `frame_scores` scores `-inf`.
    pub fn score(&self, frame_scores: ArrayView1<f32>) -> f32 {
        match self {
            Senone::Tied(id) => id
                .index()
                .and_then(|index| frame_scores.get(index).copied())
                .unwrap_or(f32::NEG_INFINITY),
            Senone::Composite(composite) => composite.score(frame_scores),
        }
    }
}

impl PartialEq for Senone {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Senone {}

impl Hash for Senone {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

/// A set of senones acting as one observation model.
///
/// Membership is a set: duplicates collapse and insertion order does not
/// matter. The score is the best member score plus `log_weight`.
#[derive(Clone, Debug)]
pub struct CompositeSenone {
    id: SenoneId,
    members: Vec<Arc<Senone>>,
    log_weight: f32,
}

impl CompositeSenone {
    pub fn new(members: impl IntoIterator<Item = Arc<Senone>>, log_weight: f32) -> Self {
        let members: BTreeMap<SenoneId, Arc<Senone>> =
            members.into_iter().map(|s| (s.id(), s)).collect();

        let mut hasher = DefaultHasher::new();
        for id in members.keys() {
            id.hash(&mut hasher);
        }
        let id = SenoneId(hasher.finish() | SenoneId::COMPOSITE_BIT);

        Self {
            id,
            members: members.into_values().collect(),
            log_weight,
        }
    }

    pub fn id(&self) -> SenoneId {
        self.id
    }

    /// Members ordered by id.
    pub fn members(&self) -> &[Arc<Senone>] {
        &self.members
    }

    pub fn log_weight(&self) -> f32 {
        self.log_weight
    }

    pub fn contains(&self, id: SenoneId) -> bool {
        self.members.iter().any(|s| s.id() == id)
    }

    pub fn score(&self, frame_scores: ArrayView1<f32>) -> f32 {
        let best = self
            .members
            .iter()
            .map(|s| s.score(frame_scores))
            .fold(f32::NEG_INFINITY, f32::max);

        best + self.log_weight
    }
}

/// Ordered senones, one per emitting HMM state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SenoneSequence {
    senones: Vec<Arc<Senone>>,
}

impl SenoneSequence {
    pub fn new(senones: Vec<Arc<Senone>>) -> Self {
        Self { senones }
    }

    pub fn senones(&self) -> &[Arc<Senone>] {
        &self.senones
    }

    pub fn len(&self) -> usize {
        self.senones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senones.is_empty()
    }

    /// Per-state log scores for one frame.
    pub fn scores(&self, frame_scores: ArrayView1<f32>) -> Vec<f32> {
        self.senones.iter().map(|s| s.score(frame_scores)).collect()
    }
}
