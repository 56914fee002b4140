//! Damped pairwise dispersion energies.

use ndarray::{Array2, ArrayView2, Zip};

use super::config::{Damping, RationalDamping, ZeroDamping};
use super::cutoff::Switching;

/// Pair quantities entering the damping functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairTerms {
    pub c6: f64,
    pub qq: f64,
    pub rvdw: f64,
}

/// Energy of a single atom pair at distance `r`, before switching.
pub trait PairEnergy: Sync {
    fn pair_energy(&self, r: f64, terms: PairTerms) -> f64;
}

impl PairEnergy for RationalDamping {
    #[inline]
    fn pair_energy(&self, r: f64, terms: PairTerms) -> f64 {
        let r0 = self.a1 * terms.qq.sqrt() + self.a2;
        let r0_2 = r0 * r0;
        let r0_6 = r0_2 * r0_2 * r0_2;
        let r0_8 = r0_6 * r0_2;

        let r2 = r * r;
        let r6 = r2 * r2 * r2;
        let r8 = r6 * r2;

        -terms.c6 * (self.s6 / (r6 + r0_6) + self.s8 * terms.qq / (r8 + r0_8))
    }
}

impl PairEnergy for ZeroDamping {
    #[inline]
    fn pair_energy(&self, r: f64, terms: PairTerms) -> f64 {
        let ratio = terms.rvdw / r;
        let f6 = self.s6 / (1.0 + 6.0 * (self.rs6 * ratio).powf(self.alp));
        let f8 = self.s8 / (1.0 + 6.0 * (self.rs8 * ratio).powf(self.alp + 2.0));

        let r2 = r * r;
        let r6 = r2 * r2 * r2;
        let r8 = r6 * r2;

        -terms.c6 * (f6 / r6 + terms.qq * f8 / r8)
    }
}

/// Switched pair energies for all atom pairs.
///
/// The damping variant is matched once; the pair loop runs on the
/// concrete parameter type.
pub fn pair_energies<'a>(
    damping: &Damping,
    switching: Switching,
    distances: ArrayView2<'a, f64>,
    c6: ArrayView2<'a, f64>,
    qq: ArrayView2<'a, f64>,
    rvdw: ArrayView2<'a, f64>,
    mask: ArrayView2<'a, bool>,
) -> Array2<f64> {
    let inputs = PairInputs {
        distances,
        c6,
        qq,
        rvdw,
        mask,
    };
    match damping {
        Damping::Rational(params) => evaluate_pairs(params, switching, inputs),
        Damping::Zero(params) => evaluate_pairs(params, switching, inputs),
    }
}

struct PairInputs<'a> {
    distances: ArrayView2<'a, f64>,
    c6: ArrayView2<'a, f64>,
    qq: ArrayView2<'a, f64>,
    rvdw: ArrayView2<'a, f64>,
    mask: ArrayView2<'a, bool>,
}

fn evaluate_pairs<P: PairEnergy>(params: &P, switching: Switching, inputs: PairInputs<'_>) -> Array2<f64> {
    let energy = switching.multiplicative(|r: f64, terms: PairTerms| params.pair_energy(r, terms));
    let mut out = Array2::zeros(inputs.distances.raw_dim());
    Zip::from(&mut out)
        .and(&inputs.distances)
        .and(&inputs.c6)
        .and(&inputs.qq)
        .and(&inputs.rvdw)
        .and(&inputs.mask)
        .par_for_each(|e, &r, &c6, &qq, &rvdw, &real| {
            let r = if real { r } else { 1.0 };
            let value = energy(r, PairTerms { c6, qq, rvdw });
            *e = if real { value } else { 0.0 };
        });
    out
}
