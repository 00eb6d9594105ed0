//! Transition matrix file parser.
//!
//! The file holds linear probabilities, one matrix per transition matrix id:
//!
//! ```json
//! { "matrices": [ [[0.6, 0.4, 0.0], [0.0, 0.7, 0.3]] ] }
//! ```
//!
//! Matrices are returned in natural-log domain.

use crate::error::LoadError;
use ndarray::{Array2, ErrorKind, ShapeError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TransitionMatrixFile {
    matrices: Vec<Vec<Vec<f32>>>,
}

/// Parse transition matrices and convert them to log domain.
pub fn parse(text: &str) -> Result<Vec<Array2<f32>>, LoadError> {
    let file: TransitionMatrixFile = serde_json::from_str(text)?;

    file.matrices
        .into_iter()
        .enumerate()
        .map(|(id, rows)| to_log_matrix(id, rows))
        .collect()
}

fn to_log_matrix(id: usize, rows: Vec<Vec<f32>>) -> Result<Array2<f32>, LoadError> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);

    if rows.iter().any(|row| row.len() != n_cols) {
        return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape).into());
    }

    if let Some(&value) = rows.iter().flatten().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(LoadError::InvalidTransition { id, value });
    }

    let matrix = Array2::from_shape_vec((n_rows, n_cols), rows.into_iter().flatten().collect())?;

    Ok(matrix.mapv_into(f32::ln))
}
