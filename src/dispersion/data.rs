//! Pairwise quantities that depend only on the atomic numbers.

use ndarray::{Array1, Array2, Axis};

use super::error::Error;
use crate::reference::ReferenceDatabase;

/// Pair tables for one atomic-number vector.
///
/// Built once per composition and reused for every geometry of that
/// composition. All matrices are `N x N` and symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct PairData {
    numbers: Vec<u8>,
    /// Sum of covalent radii (Bohr).
    pub rc: Array2<f64>,
    /// C8/C6 scaling, `3 * sqrtZR4R2[i] * sqrtZR4R2[j]`.
    pub qq: Array2<f64>,
    /// Pairwise van der Waals radius (Bohr).
    pub rvdw: Array2<f64>,
}

impl PairData {
    /// # Errors
    ///
    /// Returns [`Error::EmptySystem`] for an empty vector and
    /// [`Error::UnsupportedElement`] for numbers without reference data.
    pub fn from_numbers(reference: &ReferenceDatabase, numbers: &[u8]) -> Result<Self, Error> {
        if numbers.is_empty() {
            return Err(Error::EmptySystem);
        }
        reference.check_numbers(numbers)?;

        let n = numbers.len();
        let z: Vec<usize> = numbers.iter().map(|&z| z as usize).collect();
        let radius = &reference.covalent_radius;
        let factor = &reference.sqrt_z_r4_over_r2;
        let vdw = &reference.vdw_radius;

        let rc = Array2::from_shape_fn((n, n), |(i, j)| radius[z[i]] + radius[z[j]]);
        let qq = Array2::from_shape_fn((n, n), |(i, j)| 3.0 * (factor[z[i]] * factor[z[j]]));
        let rvdw = Array2::from_shape_fn((n, n), |(i, j)| vdw[[z[i], z[j]]]);

        Ok(Self {
            numbers: numbers.to_vec(),
            rc,
            qq,
            rvdw,
        })
    }

    pub fn numbers(&self) -> &[u8] {
        &self.numbers
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Restricts the tables to the given atoms, in the given order.
    ///
    /// Rows and columns are selected from the existing matrices; nothing is
    /// looked up again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] for an index past the last atom and
    /// [`Error::EmptySystem`] for an empty selection.
    pub fn subset(&self, indices: &[usize]) -> Result<Self, Error> {
        if indices.is_empty() {
            return Err(Error::EmptySystem);
        }
        let len = self.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(Error::IndexOutOfRange { index, len });
        }
        let pick = |m: &Array2<f64>| m.select(Axis(0), indices).select(Axis(1), indices);
        Ok(Self {
            numbers: indices.iter().map(|&i| self.numbers[i]).collect(),
            rc: pick(&self.rc),
            qq: pick(&self.qq),
            rvdw: pick(&self.rvdw),
        })
    }
}

/// `true` for atoms that are not padding.
pub fn real_atoms(numbers: &[u8]) -> Array1<bool> {
    numbers.iter().map(|&z| z > 0).collect()
}

/// Pairs of distinct real atoms.
pub fn real_pairs(numbers: &[u8]) -> Array2<bool> {
    let n = numbers.len();
    Array2::from_shape_fn((n, n), |(i, j)| i != j && numbers[i] > 0 && numbers[j] > 0)
}

/// Pairs of real atoms in different cells; an atom interacts with its own images.
pub fn image_pairs(numbers: &[u8]) -> Array2<bool> {
    let n = numbers.len();
    Array2::from_shape_fn((n, n), |(i, j)| numbers[i] > 0 && numbers[j] > 0)
}
