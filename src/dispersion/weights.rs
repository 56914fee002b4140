//! Gaussian weights over the reference environments of each atom.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};

/// Spread factor of the Gaussian weighting.
pub const DEFAULT_WEIGHTING: f64 = 4.0;

/// Normalized reference weights, one row per atom.
///
/// `reference_cn` is the padded `(119, R)` table; slots with a negative
/// coordination number get weight zero. Rows of padding atoms are all zero.
pub fn reference_weights(
    cn: ArrayView1<'_, f64>,
    numbers: &[u8],
    reference_cn: ArrayView2<'_, f64>,
    factor: f64,
) -> Array2<f64> {
    let numbers = Array1::from_iter(numbers.iter().map(|&z| z as usize));
    let mut weights = Array2::zeros((cn.len(), reference_cn.ncols()));

    Zip::from(weights.rows_mut())
        .and(&cn)
        .and(&numbers)
        .par_for_each(|mut row, &cn, &z| {
            let refs = reference_cn.row(z);
            Zip::from(&mut row).and(&refs).for_each(|w, &ref_cn| {
                let valid = ref_cn >= 0.0;
                let delta = if valid { ref_cn - cn } else { 0.0 };
                *w = if valid { (-factor * delta * delta).exp() } else { 0.0 };
            });
            let norm = row.sum() + f64::EPSILON;
            row.mapv_inplace(|w| w / norm);
        });
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn weights_sum_to_one_for_real_atoms() {
        let db = testing::fixture();
        let numbers = [8, 1, 1, 6, 7];
        let cn = array![1.98, 0.99, 0.5, 3.7, 2.2];
        let w = reference_weights(cn.view(), &numbers, db.reference_cn.view(), DEFAULT_WEIGHTING);
        for row in w.rows() {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 10.0 * f64::EPSILON);
            assert!(row.iter().all(|&x| x >= 0.0));
        }
    }

    #[test]
    fn unused_slots_have_zero_weight() {
        let db = testing::fixture();
        let cn = array![0.9];
        let w = reference_weights(cn.view(), &[1], db.reference_cn.view(), DEFAULT_WEIGHTING);
        let h_refs = db.reference_cn(1).unwrap();
        for (slot, &ref_cn) in h_refs.iter().enumerate() {
            if ref_cn < 0.0 {
                assert_eq!(w[[0, slot]], 0.0);
            }
        }
        // closest reference dominates
        assert!(w[[0, 0]] > w[[0, 1]]);
    }

    #[test]
    fn padding_rows_are_zero() {
        let db = testing::fixture();
        let cn = array![1.0, 0.0];
        let w = reference_weights(cn.view(), &[8, 0], db.reference_cn.view(), DEFAULT_WEIGHTING);
        assert!(w.row(1).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn far_off_coordination_does_not_produce_nan() {
        let db = testing::fixture();
        let cn = array![1.0e3];
        let w = reference_weights(cn.view(), &[6], db.reference_cn.view(), DEFAULT_WEIGHTING);
        assert!(w.iter().all(|x| x.is_finite()));
        assert_eq!(w.sum(), 0.0);
    }
}
