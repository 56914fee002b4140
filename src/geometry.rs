//! Pairwise geometry under free or periodic boundary conditions.
//!
//! The dispersion model only consumes interatomic distances. A [`Boundary`]
//! reduces the displacement between two positions and lists the lattice
//! translations that can place an image within a cutoff; [`image_distances`]
//! applies both to every atom pair for one translation.

use nalgebra::{Matrix3, Matrix3xX, Vector3};
use ndarray::{Array2, Zip};

use crate::dispersion::Error;

/// Displacement convention between two points.
pub trait Boundary: Send + Sync {
    /// Vector pointing from `b` to `a`, reduced into the home cell.
    fn displacement(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64>;

    /// Lattice translations, one per column, covering every image of a
    /// reduced displacement that can lie within `cutoff`. Always contains
    /// the zero translation.
    fn translations(&self, cutoff: f64) -> Matrix3xX<f64>;
}

/// Open boundaries: plain Cartesian differences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreeBoundary;

impl Boundary for FreeBoundary {
    #[inline]
    fn displacement(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
        a - b
    }

    fn translations(&self, _cutoff: f64) -> Matrix3xX<f64> {
        Matrix3xX::zeros(1)
    }
}

/// Periodic boundaries in a general triclinic cell.
///
/// Every lattice translation within the cutoff contributes, so cells
/// narrower than the cutoff are summed correctly.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicBoundary {
    /// Lattice vectors as columns.
    cell: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

impl PeriodicBoundary {
    /// Creates a periodic boundary from lattice vectors given as rows (Bohr).
    ///
    /// # Errors
    ///
    /// Returns [`Error::SingularLattice`] if the vectors are not finite or
    /// do not span a cell of non-zero volume.
    pub fn new(lattice: [[f64; 3]; 3]) -> Result<Self, Error> {
        if lattice.iter().flatten().any(|x| !x.is_finite()) {
            return Err(Error::SingularLattice);
        }
        let cell = Matrix3::from_columns(&lattice.map(Vector3::from));
        let scale: f64 = cell.column_iter().map(|v| v.norm()).product();
        if scale == 0.0 || cell.determinant().abs() <= 1e-12 * scale {
            return Err(Error::SingularLattice);
        }
        let inverse = cell.try_inverse().ok_or(Error::SingularLattice)?;
        Ok(Self { cell, inverse })
    }

    /// Lattice vectors as rows.
    pub fn lattice(&self) -> [[f64; 3]; 3] {
        [0, 1, 2].map(|k| {
            let v = self.cell.column(k);
            [v[0], v[1], v[2]]
        })
    }

    pub fn volume(&self) -> f64 {
        self.cell.determinant().abs()
    }

    /// Distances between opposite faces, one per lattice vector.
    ///
    /// Rows of the inverse cell are the reciprocal vectors, and the spacing
    /// of the planes they span is the inverse of their length.
    pub fn widths(&self) -> [f64; 3] {
        [0, 1, 2].map(|k| 1.0 / self.inverse.row(k).norm())
    }
}

impl Boundary for PeriodicBoundary {
    fn displacement(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
        let frac = self.inverse * (a - b);
        self.cell * frac.map(|f| f - f.round())
    }

    fn translations(&self, cutoff: f64) -> Matrix3xX<f64> {
        // A reduced displacement sits within half a cell of the origin along
        // each reciprocal direction.
        let reps = self.widths().map(|w| (cutoff / w + 0.5).ceil() as i64);
        let reach = cutoff + 0.5 * self.cell.column_iter().map(|v| v.norm()).sum::<f64>();
        let mut points = Vec::new();
        for i in -reps[0]..=reps[0] {
            for j in -reps[1]..=reps[1] {
                for k in -reps[2]..=reps[2] {
                    let t = self.cell * Vector3::new(i as f64, j as f64, k as f64);
                    if t.norm() <= reach {
                        points.push(t);
                    }
                }
            }
        }
        Matrix3xX::from_columns(points.as_slice())
    }
}

/// Pairwise distances `|d(r_i, r_j) + t|` for one lattice translation `t`.
///
/// Rows are filled in parallel. For the zero translation the diagonal is
/// zero.
pub fn image_distances<B: Boundary + ?Sized>(
    boundary: &B,
    positions: &[[f64; 3]],
    translation: &Vector3<f64>,
) -> Array2<f64> {
    let points: Vec<Vector3<f64>> = positions.iter().map(|&p| Vector3::from(p)).collect();
    let n = points.len();
    let mut distances = Array2::zeros((n, n));
    Zip::indexed(&mut distances).par_for_each(|(i, j), d| {
        *d = (boundary.displacement(&points[i], &points[j]) + translation).norm();
    });
    distances
}

/// Pairwise distances within the home cell.
pub fn distance_matrix<B: Boundary + ?Sized>(boundary: &B, positions: &[[f64; 3]]) -> Array2<f64> {
    image_distances(boundary, positions, &Vector3::zeros())
}

/// `true` for the zero translation.
#[inline]
pub fn is_origin(translation: &Vector3<f64>) -> bool {
    translation.iter().all(|&x| x == 0.0)
}
