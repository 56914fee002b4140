//! Fractional coordination numbers.
//!
//! Each neighbour contributes through a smooth counting function of the
//! distance relative to the covalent-radius sum. The counting function
//! saturates at 1 for a bonded pair, so the sum over all `j != i` is the
//! coordination number directly.

use ndarray::{Array1, ArrayView2, Zip};

use super::cutoff::Switching;

/// Steepness of the counting function.
pub const DEFAULT_STEEPNESS: f64 = 16.0;

/// Exponential counting function, `1 / (1 + exp(-k (rc/r - 1)))`.
#[inline]
pub fn counting(r: f64, rc: f64, steepness: f64) -> f64 {
    1.0 / (1.0 + (-steepness * (rc / r - 1.0)).exp())
}

/// Coordination number of every atom.
///
/// Pairs outside `mask` contribute exactly zero; their distance is never
/// passed to the counting function.
pub fn coordination_numbers(
    distances: ArrayView2<'_, f64>,
    rc: ArrayView2<'_, f64>,
    mask: ArrayView2<'_, bool>,
    steepness: f64,
    switching: Switching,
) -> Array1<f64> {
    let count = switching.multiplicative(move |r: f64, rc: f64| counting(r, rc, steepness));
    let mut cn = Array1::zeros(distances.nrows());
    Zip::from(&mut cn)
        .and(distances.rows())
        .and(rc.rows())
        .and(mask.rows())
        .par_for_each(|cn, r, rc, mask| {
            *cn = Zip::from(&r)
                .and(&rc)
                .and(&mask)
                .fold(0.0, |acc, &r, &rc, &real| {
                    let r = if real { r } else { 1.0 };
                    let g = count(r, rc);
                    acc + if real { g } else { 0.0 }
                });
        });
    cn
}
