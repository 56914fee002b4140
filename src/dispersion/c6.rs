//! Coordination-dependent atomic C6 coefficients.

use ndarray::{Array2, ArrayView2, ArrayView4, s};
use rayon::prelude::*;

/// Interpolated C6 coefficient for every atom pair.
///
/// `C6[i,j] = Σ_ab w[i,a] w[j,b] C6ref[Z_i, Z_j, a, b]`. Only the upper
/// triangle is evaluated; the lower triangle is a copy, so the result is
/// exactly symmetric.
pub fn atomic_c6(
    weights: ArrayView2<'_, f64>,
    numbers: &[u8],
    reference_c6: ArrayView4<'_, f64>,
) -> Array2<f64> {
    let n = numbers.len();
    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let zi = numbers[i] as usize;
            let wi = weights.row(i);
            (i..n)
                .map(|j| {
                    let zj = numbers[j] as usize;
                    let block = reference_c6.slice(s![zi, zj, .., ..]);
                    let wj = weights.row(j);
                    wi.dot(&block.dot(&wj))
                })
                .collect()
        })
        .collect();

    let mut c6 = Array2::zeros((n, n));
    for (i, row) in upper.into_iter().enumerate() {
        for (offset, value) in row.into_iter().enumerate() {
            let j = i + offset;
            c6[[i, j]] = value;
            c6[[j, i]] = value;
        }
    }
    c6
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispersion::weights::{DEFAULT_WEIGHTING, reference_weights};
    use crate::testing;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn c6_is_exactly_symmetric() {
        let db = testing::fixture();
        let numbers = [8, 1, 1, 6, 1, 7, 0];
        let cn = array![2.01, 0.98, 1.02, 3.9, 0.97, 2.4, 0.0];
        let w = reference_weights(cn.view(), &numbers, db.reference_cn.view(), DEFAULT_WEIGHTING);
        let c6 = atomic_c6(w.view(), &numbers, db.reference_c6.view());
        assert_eq!(c6, c6.t());
        assert!(c6.row(6).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn single_reference_weight_picks_tabulated_value() {
        let db = testing::fixture();
        let numbers = [1, 8];
        let mut w = Array2::zeros((2, db.max_references()));
        w[[0, 1]] = 1.0;
        w[[1, 2]] = 1.0;
        let c6 = atomic_c6(w.view(), &numbers, db.reference_c6.view());
        let block = db.reference_c6(1, 8).unwrap();
        assert_relative_eq!(c6[[0, 1]], block[[1, 2]], max_relative = 1e-14);
    }

    #[test]
    fn c6_is_bilinear_in_weights() {
        let db = testing::fixture();
        let numbers = [6, 6];
        let mut w = Array2::zeros((2, db.max_references()));
        w[[0, 0]] = 0.25;
        w[[0, 3]] = 0.75;
        w[[1, 2]] = 1.0;
        let c6 = atomic_c6(w.view(), &numbers, db.reference_c6.view());
        let block = db.reference_c6(6, 6).unwrap();
        let expected = 0.25 * block[[0, 2]] + 0.75 * block[[3, 2]];
        assert_relative_eq!(c6[[0, 1]], expected, max_relative = 1e-14);
    }
}
