//! Model loading: turns model files into registries the resolver reads.

pub mod mdef;
pub mod tmat;

use crate::error::{LoadError, Result};
use crate::hmm::{Hmm, HmmManager};
use crate::senone::{Senone, SenoneSequence};
use crate::traits::Loader;
use crate::types::ModelRepo;
use crate::unit::{Context, Unit};
use crate::unit_manager::UnitManager;
use mdef::{MdefEntry, ModelDefinition};
use ndarray::Array2;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a [`Loader`] produces.
///
/// The HMM registry stays writable after loading so the resolver can add the
/// composite HMMs it synthesizes.
#[derive(Debug, Default)]
pub struct ModelData {
    pub hmm_manager: HmmManager,
    pub senone_pool: Vec<Arc<Senone>>,
    pub ci_units: BTreeMap<String, Arc<Unit>>,
    pub left_context_size: usize,
    pub right_context_size: usize,
}

impl ModelData {
    /// Build registries from a parsed definition and log-domain transition
    /// matrices.
    pub fn build(
        definition: &ModelDefinition,
        matrices: Vec<Array2<f32>>,
        unit_manager: &UnitManager,
    ) -> std::result::Result<Self, LoadError> {
        if matrices.len() != definition.n_tied_tmat {
            return Err(LoadError::CountMismatch {
                what: "transition matrices",
                declared: definition.n_tied_tmat,
                found: matrices.len(),
            });
        }

        let matrices: Vec<Arc<Array2<f32>>> = matrices.into_iter().map(Arc::new).collect();

        let mut data = ModelData {
            senone_pool: (0..definition.n_tied_state)
                .map(|i| Arc::new(Senone::tied(i)))
                .collect(),
            ..Default::default()
        };

        for entry in definition.base_entries() {
            let unit = unit_manager.get_unit(&entry.base, entry.filler, Context::Empty);
            data.ci_units.insert(entry.base.clone(), unit);
        }

        // HMMs with identical state lists share one sequence
        let mut sequences: HashMap<&[usize], Arc<SenoneSequence>> = HashMap::new();

        for entry in &definition.entries {
            let unit = data.unit_for(entry, unit_manager)?;

            let senones = match sequences.get(entry.states.as_slice()) {
                Some(sequence) => sequence.clone(),
                None => {
                    let sequence = Arc::new(data.senone_sequence(entry, &unit)?);
                    sequences.insert(entry.states.as_slice(), sequence.clone());
                    sequence
                }
            };

            let tmat = transition_matrix(&matrices, entry, &unit)?;

            if data.hmm_manager.get(entry.position, &unit).is_some() {
                return Err(LoadError::DuplicateHmm {
                    unit: unit.to_string(),
                    position: entry.position.to_string(),
                });
            }

            data.hmm_manager
                .put(Hmm::new(unit, senones, tmat, entry.position));
        }

        let context_size = usize::from(definition.triphone_entries().next().is_some());
        data.left_context_size = context_size;
        data.right_context_size = context_size;

        Ok(data)
    }

    fn unit_for(
        &self,
        entry: &MdefEntry,
        unit_manager: &UnitManager,
    ) -> std::result::Result<Arc<Unit>, LoadError> {
        let (Some(left), Some(right)) = (&entry.left, &entry.right) else {
            return Ok(self.ci_units[&entry.base].clone());
        };

        let neighbor = |phone: &String| {
            self.ci_units
                .get(phone)
                .cloned()
                .ok_or_else(|| LoadError::UnknownContextPhone {
                    unit: format!("{}[{left},{right}]", entry.base),
                    phone: phone.clone(),
                })
        };

        let context = Context::left_right(Some(vec![neighbor(left)?]), Some(vec![neighbor(right)?]));

        Ok(unit_manager.get_unit(&entry.base, entry.filler, context))
    }

    fn senone_sequence(
        &self,
        entry: &MdefEntry,
        unit: &Unit,
    ) -> std::result::Result<SenoneSequence, LoadError> {
        let senones = entry
            .states
            .iter()
            .map(|&id| {
                self.senone_pool
                    .get(id)
                    .cloned()
                    .ok_or_else(|| LoadError::SenoneOutOfRange {
                        unit: unit.to_string(),
                        id,
                        len: self.senone_pool.len(),
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(SenoneSequence::new(senones))
    }

    /// Log model statistics.
    pub fn log_info(&self) {
        tracing::info!(
            senones = self.senone_pool.len(),
            ci_units = self.ci_units.len(),
            left_context_size = self.left_context_size,
            right_context_size = self.right_context_size,
            "acoustic model"
        );

        self.hmm_manager.log_info();
    }
}

fn transition_matrix(
    matrices: &[Arc<Array2<f32>>],
    entry: &MdefEntry,
    unit: &Unit,
) -> std::result::Result<Arc<Array2<f32>>, LoadError> {
    let tmat = matrices
        .get(entry.tmat)
        .ok_or(LoadError::TransitionMatrixOutOfRange {
            id: entry.tmat,
            len: matrices.len(),
        })?;

    let states = entry.states.len();
    let (rows, cols) = tmat.dim();

    if rows != states || cols != states + 1 {
        return Err(LoadError::TransitionMatrixShape {
            unit: unit.to_string(),
            id: entry.tmat,
            rows,
            cols,
            states,
        });
    }

    Ok(tmat.clone())
}

/// Loads a tied-state model from a [`ModelRepo`].
///
/// The repository holds an `mdef` text model definition and a
/// `transition_matrices.json` file.
#[derive(Debug)]
pub struct TiedStateLoader {
    repo: ModelRepo,
}

impl TiedStateLoader {
    /// Model definition file names, in priority order.
    pub const MDEF_FILES: &[&str] = &["mdef", "mdef.txt"];

    /// Transition matrix file names, in priority order.
    pub const TMAT_FILES: &[&str] = &["transition_matrices.json", "tmat.json"];

    pub fn new(repo: ModelRepo) -> Self {
        Self { repo }
    }

    /// Loader for a model directory on the local filesystem.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(ModelRepo::Path(dir.into()))
    }

    pub fn repo(&self) -> &ModelRepo {
        &self.repo
    }
}

impl Loader for TiedStateLoader {
    fn load(&self, unit_manager: &UnitManager) -> Result<ModelData> {
        let mdef_path = self.repo.resolve_any(Self::MDEF_FILES)?;
        let tmat_path = self.repo.resolve_any(Self::TMAT_FILES)?;

        tracing::debug!(mdef = %mdef_path.display(), tmat = %tmat_path.display(), "loading model files");

        let definition = mdef::parse(&read_to_string(&mdef_path)?)?;
        let matrices = tmat::parse(&read_to_string(&tmat_path)?)?;

        Ok(ModelData::build(&definition, matrices, unit_manager)?)
    }
}

fn read_to_string(path: &Path) -> std::result::Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::HmmPosition;

    const MDEF: &str = "\
0.3
3 n_base
2 n_tri
20 n_state_map
12 n_tied_state
9 n_tied_ci_state
3 n_tied_tmat
SIL   -   -  - filler  0    0 1 2 N
AE    -   -  - n/a     1    3 4 5 N
T     -   -  - n/a     2    6 7 8 N
AE    T   T  i n/a     1    9 10 11 N
AE    SIL T  b n/a     1    9 10 11 N
";

    fn matrices(count: usize) -> Vec<Array2<f32>> {
        (0..count).map(|_| Array2::zeros((3, 4))).collect()
    }

    fn build(mdef: &str, tmats: Vec<Array2<f32>>) -> std::result::Result<ModelData, LoadError> {
        let definition = mdef::parse(mdef)?;
        ModelData::build(&definition, tmats, &UnitManager::new())
    }

    #[test]
    fn registers_units_and_hmms() {
        let unit_manager = UnitManager::new();
        let definition = mdef::parse(MDEF).unwrap();
        let data = ModelData::build(&definition, matrices(3), &unit_manager).unwrap();

        assert_eq!(data.senone_pool.len(), 12);
        assert_eq!(data.ci_units.len(), 3);
        assert_eq!(data.hmm_manager.len(), 5);
        assert_eq!(data.left_context_size, 1);
        assert_eq!(data.right_context_size, 1);

        let sil = unit_manager.context_independent("SIL").unwrap();
        assert!(Arc::ptr_eq(&sil, unit_manager.silence()));
        assert!(data.hmm_manager.get(HmmPosition::Undefined, &sil).is_some());

        let t = unit_manager.context_independent("T").unwrap();
        let triphone = Unit::new(
            "AE",
            false,
            Context::left_right(Some(vec![t.clone()]), Some(vec![t])),
        );
        let hmm = data.hmm_manager.get(HmmPosition::Internal, &triphone).unwrap();
        assert_eq!(hmm.order(), 3);
        assert_eq!(hmm.senone_sequence().senones()[0].id().index(), Some(9));
    }

    #[test]
    fn shares_identical_senone_sequences() {
        let data = build(MDEF, matrices(3)).unwrap();

        let hmms = data.hmm_manager.hmms();
        let triphones: Vec<_> = hmms.iter().filter(|h| h.unit().is_context_dependent()).collect();

        assert!(Arc::ptr_eq(
            triphones[0].senone_sequence(),
            triphones[1].senone_sequence()
        ));
    }

    #[test]
    fn context_size_is_zero_without_triphones() {
        let mdef = "\
0.3
1 n_base
0 n_tri
4 n_state_map
3 n_tied_state
3 n_tied_ci_state
1 n_tied_tmat
AE - - - n/a 0 0 1 2 N
";
        let data = build(mdef, matrices(1)).unwrap();

        assert_eq!(data.left_context_size, 0);
        assert_eq!(data.right_context_size, 0);
    }

    #[test]
    fn rejects_missing_transition_matrices() {
        assert!(matches!(
            build(MDEF, matrices(2)),
            Err(LoadError::CountMismatch {
                what: "transition matrices",
                ..
            })
        ));
    }

    #[test]
    fn rejects_senone_out_of_range() {
        let mdef = MDEF.replace("12 n_tied_state", "11 n_tied_state");

        assert!(matches!(
            build(&mdef, matrices(3)),
            Err(LoadError::SenoneOutOfRange { id: 11, len: 11, .. })
        ));
    }

    #[test]
    fn rejects_unknown_context_phone() {
        let mdef = MDEF.replace("AE    T   T  i", "AE    K   T  i");

        assert!(matches!(
            build(&mdef, matrices(3)),
            Err(LoadError::UnknownContextPhone { phone, .. }) if phone == "K"
        ));
    }

    #[test]
    fn rejects_mismatched_transition_shape() {
        let mut tmats = matrices(3);
        tmats[2] = Array2::zeros((2, 3));

        assert!(matches!(
            build(MDEF, tmats),
            Err(LoadError::TransitionMatrixShape { id: 2, rows: 2, cols: 3, states: 3, .. })
        ));
    }

    #[test]
    fn rejects_duplicate_hmm() {
        let mdef = MDEF.replace("AE    SIL T  b", "AE    T   T  i");

        assert!(matches!(
            build(&mdef, matrices(3)),
            Err(LoadError::DuplicateHmm { .. })
        ));
    }
}
