use nalgebra::Vector3;
use ndarray::{Array1, Array2};
use rayon::prelude::*;

use super::c6::atomic_c6;
use super::config::{DampingScheme, DispersionConfig, ParameterSet};
use super::cutoff::Switching;
use super::damping::pair_energies;
use super::data::{PairData, image_pairs, real_atoms, real_pairs};
use super::error::Error;
use super::ncoord::coordination_numbers;
use super::weights::reference_weights;
use crate::geometry::{Boundary, FreeBoundary, PeriodicBoundary, image_distances, is_origin};
use crate::model::system::System;
use crate::reference::{self, ReferenceDatabase};

/// Intermediate and final quantities of one evaluation.
#[derive(Debug, Clone)]
pub struct DispersionResult {
    /// Fractional coordination number per atom.
    pub coordination_numbers: Array1<f64>,
    /// Reference weights, `N x R`.
    pub weights: Array2<f64>,
    /// Interpolated C6 coefficients, `N x N` (Hartree Bohr⁶).
    pub c6: Array2<f64>,
    /// Switched pair energies summed over lattice images; each unordered
    /// pair appears twice.
    pub pair_energies: Array2<f64>,
    /// Per-atom share of the energy, half of each pair to either partner.
    pub atomic_energies: Array1<f64>,
    /// Total dispersion energy (Hartree).
    pub energy: f64,
}

/// Dispersion model for one composition.
///
/// Pair tables and switching envelopes are set up once; every evaluation
/// then only depends on the positions.
#[derive(Debug, Clone)]
pub struct Dispersion<'a> {
    reference: &'a ReferenceDatabase,
    data: PairData,
    real: Array1<bool>,
    mask: Array2<bool>,
    image_mask: Array2<bool>,
    config: DispersionConfig,
    cn_switching: Switching,
    disp_switching: Switching,
    cell: Option<PeriodicBoundary>,
}

impl<'a> Dispersion<'a> {
    /// # Errors
    ///
    /// Fails for an empty or unsupported composition and for invalid
    /// cutoffs or model constants.
    pub fn new(
        reference: &'a ReferenceDatabase,
        numbers: &[u8],
        config: DispersionConfig,
    ) -> Result<Self, Error> {
        let data = PairData::from_numbers(reference, numbers)?;
        Self::with_data(reference, data, config, None)
    }

    /// Model for a [`System`], periodic if the system has box vectors.
    pub fn from_system(
        reference: &'a ReferenceDatabase,
        system: &System,
        config: DispersionConfig,
    ) -> Result<Self, Error> {
        let data = PairData::from_numbers(reference, &system.atomic_numbers())?;
        let cell = system.box_vectors.map(PeriodicBoundary::new).transpose()?;
        Self::with_data(reference, data, config, cell)
    }

    fn with_data(
        reference: &'a ReferenceDatabase,
        data: PairData,
        config: DispersionConfig,
        cell: Option<PeriodicBoundary>,
    ) -> Result<Self, Error> {
        let cn_switching = config.cutoff.coordination()?;
        let disp_switching = config.cutoff.dispersion()?;
        config.model.validate()?;

        let real = real_atoms(data.numbers());
        let mask = real_pairs(data.numbers());
        let image_mask = image_pairs(data.numbers());
        log::debug!(
            "dispersion model: {} atoms ({} real), {} damping, {}",
            data.len(),
            real.iter().filter(|r| **r).count(),
            config.damping.scheme(),
            if cell.is_some() { "periodic" } else { "free boundary" }
        );

        Ok(Self {
            reference,
            data,
            real,
            mask,
            image_mask,
            config,
            cn_switching,
            disp_switching,
            cell,
        })
    }

    /// Model restricted to the given atoms, in the given order.
    pub fn subset(&self, indices: &[usize]) -> Result<Self, Error> {
        let data = self.data.subset(indices)?;
        Self::with_data(self.reference, data, self.config, self.cell.clone())
    }

    pub fn numbers(&self) -> &[u8] {
        self.data.numbers()
    }

    pub fn pair_data(&self) -> &PairData {
        &self.data
    }

    pub fn config(&self) -> &DispersionConfig {
        &self.config
    }

    pub fn cell(&self) -> Option<&PeriodicBoundary> {
        self.cell.as_ref()
    }

    /// Total energy in Hartree. Positions are in Bohr.
    pub fn energy(&self, positions: &[[f64; 3]]) -> Result<f64, Error> {
        self.analyze(positions).map(|result| result.energy)
    }

    /// Per-atom energies; they sum to [`energy`](Self::energy).
    pub fn atomic_energies(&self, positions: &[[f64; 3]]) -> Result<Vec<f64>, Error> {
        self.analyze(positions)
            .map(|result| result.atomic_energies.to_vec())
    }

    /// Total energy with distances and lattice images taken from an explicit
    /// boundary.
    pub fn energy_in<B: Boundary + ?Sized>(
        &self,
        positions: &[[f64; 3]],
        boundary: &B,
    ) -> Result<f64, Error> {
        self.analyze_in(positions, boundary).map(|result| result.energy)
    }

    /// Energies of independent frames of this composition, evaluated in parallel.
    pub fn energy_batch<P>(&self, frames: &[P]) -> Result<Vec<f64>, Error>
    where
        P: AsRef<[[f64; 3]]> + Sync,
    {
        frames
            .par_iter()
            .map(|frame| self.energy(frame.as_ref()))
            .collect()
    }

    /// Full evaluation under the model's own boundary.
    pub fn analyze(&self, positions: &[[f64; 3]]) -> Result<DispersionResult, Error> {
        match &self.cell {
            Some(cell) => self.analyze_in(positions, cell),
            None => self.analyze_in(positions, &FreeBoundary),
        }
    }

    pub fn analyze_in<B: Boundary + ?Sized>(
        &self,
        positions: &[[f64; 3]],
        boundary: &B,
    ) -> Result<DispersionResult, Error> {
        self.check_positions(positions)?;

        let numbers = self.data.numbers();
        let model = self.config.model;

        let cn_images = boundary.translations(self.cn_switching.cutoff());
        let mut cn = Array1::zeros(numbers.len());
        for translation in cn_images.column_iter() {
            let (distances, mask) = self.image(boundary, positions, &translation.into_owned())?;
            cn += &coordination_numbers(
                distances.view(),
                self.data.rc.view(),
                mask.view(),
                model.steepness,
                self.cn_switching,
            );
        }

        let weights = reference_weights(
            cn.view(),
            numbers,
            self.reference.reference_cn.view(),
            model.weighting,
        );
        let c6 = atomic_c6(weights.view(), numbers, self.reference.reference_c6.view());

        let disp_images = boundary.translations(self.disp_switching.cutoff());
        let mut pairs = Array2::zeros((numbers.len(), numbers.len()));
        for translation in disp_images.column_iter() {
            let (distances, mask) = self.image(boundary, positions, &translation.into_owned())?;
            pairs += &pair_energies(
                &self.config.damping,
                self.disp_switching,
                distances.view(),
                c6.view(),
                self.data.qq.view(),
                self.data.rvdw.view(),
                mask.view(),
            );
        }
        log::trace!(
            "summed {} coordination and {} dispersion images",
            cn_images.ncols(),
            disp_images.ncols()
        );

        let atomic: Array1<f64> = pairs
            .rows()
            .into_iter()
            .map(|row| 0.5 * row.iter().sum::<f64>())
            .collect();
        let energy: f64 = atomic.iter().sum();
        log::trace!("dispersion energy {:.10e} Eh for {} atoms", energy, numbers.len());

        Ok(DispersionResult {
            coordination_numbers: cn,
            weights,
            c6,
            pair_energies: pairs,
            atomic_energies: atomic,
            energy,
        })
    }

    fn check_positions(&self, positions: &[[f64; 3]]) -> Result<(), Error> {
        if positions.len() != self.data.len() {
            return Err(Error::LengthMismatch {
                positions: positions.len(),
                numbers: self.data.len(),
            });
        }
        match positions
            .iter()
            .zip(&self.real)
            .position(|(p, &real)| real && p.iter().any(|x| !x.is_finite()))
        {
            Some(index) => Err(Error::NonFinitePosition { index }),
            None => Ok(()),
        }
    }

    /// Distances for one lattice translation and the pairs interacting across it.
    fn image<B: Boundary + ?Sized>(
        &self,
        boundary: &B,
        positions: &[[f64; 3]],
        translation: &Vector3<f64>,
    ) -> Result<(Array2<f64>, &Array2<bool>), Error> {
        let distances = image_distances(boundary, positions, translation);
        let mask = if is_origin(translation) {
            &self.mask
        } else {
            &self.image_mask
        };
        check_distances(&distances, mask)?;
        Ok((distances, mask))
    }
}

fn check_distances(distances: &Array2<f64>, mask: &Array2<bool>) -> Result<(), Error> {
    let degenerate = distances
        .indexed_iter()
        .zip(mask)
        .find(|&((_, &d), &real)| real && !resolvable(d));
    match degenerate {
        Some((((i, j), &distance), _)) => Err(Error::DegenerateGeometry {
            i: i.min(j),
            j: i.max(j),
            distance,
        }),
        None => Ok(()),
    }
}

// The damped terms divide by r^6 and r^8; both must stay representable.
fn resolvable(r: f64) -> bool {
    let r2 = r * r;
    let r8 = r2 * r2 * r2 * r2;
    r.is_finite() && r8 > 0.0
}

/// Dispersion energy with the global reference database and default cutoffs.
///
/// Damping parameters are checked before anything else is done.
pub fn evaluate(
    positions: &[[f64; 3]],
    numbers: &[u8],
    parameters: &ParameterSet,
    scheme: DampingScheme,
) -> Result<f64, Error> {
    let damping = parameters.resolve(scheme)?;
    let reference = reference::global()?;
    Dispersion::new(reference, numbers, DispersionConfig::new(damping))?.energy(positions)
}

/// Per-atom variant of [`evaluate`].
pub fn evaluate_per_atom(
    positions: &[[f64; 3]],
    numbers: &[u8],
    parameters: &ParameterSet,
    scheme: DampingScheme,
) -> Result<Vec<f64>, Error> {
    let damping = parameters.resolve(scheme)?;
    let reference = reference::global()?;
    Dispersion::new(reference, numbers, DispersionConfig::new(damping))?
        .atomic_energies(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispersion::config::Damping;
    use crate::testing;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn configs() -> [DispersionConfig; 2] {
        [
            DispersionConfig::new(Damping::for_functional("pbe", DampingScheme::Rational).unwrap()),
            DispersionConfig::new(Damping::for_functional("pbe", DampingScheme::Zero).unwrap()),
        ]
    }

    fn fragment_positions(shift: f64) -> Vec<[f64; 3]> {
        testing::FRAGMENT_POSITIONS
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if i < testing::FRAGMENT_SPLIT {
                    *p
                } else {
                    [p[0] + shift, p[1], p[2]]
                }
            })
            .collect()
    }

    #[test]
    fn water_energy_is_negative_and_finite() {
        let db = testing::fixture();
        for config in configs() {
            let model = Dispersion::new(&db, &testing::WATER_NUMBERS, config).unwrap();
            let result = model.analyze(&testing::WATER_POSITIONS).unwrap();
            assert!(result.energy < 0.0 && result.energy.is_finite());
            assert_relative_eq!(result.atomic_energies.sum(), result.energy, max_relative = 1e-12);
            assert_relative_eq!(result.coordination_numbers[0], 1.987786559300864, max_relative = 1e-9);
        }
    }

    #[test]
    fn energy_is_translation_invariant() {
        let db = testing::fixture();
        let numbers = testing::FRAGMENT_NUMBERS;
        let positions = fragment_positions(0.0);
        let moved: Vec<[f64; 3]> = positions
            .iter()
            .map(|p| [p[0] + 13.7, p[1] - 4.2, p[2] + 250.0])
            .collect();
        for config in configs() {
            let model = Dispersion::new(&db, &numbers, config).unwrap();
            let e0 = model.energy(&positions).unwrap();
            let e1 = model.energy(&moved).unwrap();
            assert_relative_eq!(e0, e1, max_relative = 1e-10);
        }
    }

    #[test]
    fn energy_is_permutation_invariant() {
        let db = testing::fixture();
        let numbers = testing::FRAGMENT_NUMBERS;
        let positions = fragment_positions(0.0);
        let order = [4, 8, 0, 2, 6, 1, 5, 3, 7];
        let shuffled_numbers: Vec<u8> = order.iter().map(|&i| numbers[i]).collect();
        let shuffled_positions: Vec<[f64; 3]> = order.iter().map(|&i| positions[i]).collect();
        for config in configs() {
            let e0 = Dispersion::new(&db, &numbers, config)
                .unwrap()
                .energy(&positions)
                .unwrap();
            let e1 = Dispersion::new(&db, &shuffled_numbers, config)
                .unwrap()
                .energy(&shuffled_positions)
                .unwrap();
            assert_relative_eq!(e0, e1, max_relative = 1e-10);
        }
    }

    #[test]
    fn separated_fragments_are_additive() {
        let db = testing::fixture();
        let numbers = testing::FRAGMENT_NUMBERS;
        let split = testing::FRAGMENT_SPLIT;
        let positions = fragment_positions(100.0);
        let first: Vec<usize> = (0..split).collect();
        let second: Vec<usize> = (split..numbers.len()).collect();

        for config in configs() {
            let model = Dispersion::new(&db, &numbers, config).unwrap();
            let together = model.energy(&positions).unwrap();
            let ea = model.subset(&first).unwrap().energy(&positions[..split]).unwrap();
            let eb = model.subset(&second).unwrap().energy(&positions[split..]).unwrap();
            assert_abs_diff_eq!(together, ea + eb, epsilon = 1e-12);
            assert!(together < 0.0);
        }
    }

    #[test]
    fn padding_atoms_contribute_nothing() {
        let db = testing::fixture();
        let mut numbers = testing::WATER_NUMBERS.to_vec();
        let mut positions = testing::WATER_POSITIONS.to_vec();
        numbers.extend([0, 0, 0]);
        positions.extend([positions[0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]]);

        for config in configs() {
            let bare = Dispersion::new(&db, &testing::WATER_NUMBERS, config)
                .unwrap()
                .analyze(&testing::WATER_POSITIONS)
                .unwrap();
            let padded = Dispersion::new(&db, &numbers, config)
                .unwrap()
                .analyze(&positions)
                .unwrap();
            assert_eq!(padded.energy, bare.energy);
            for i in 0..3 {
                assert_eq!(padded.coordination_numbers[i], bare.coordination_numbers[i]);
                assert_eq!(padded.atomic_energies[i], bare.atomic_energies[i]);
            }
            for i in 3..6 {
                assert_eq!(padded.coordination_numbers[i], 0.0);
                assert_eq!(padded.atomic_energies[i], 0.0);
                assert!(padded.weights.row(i).iter().all(|&w| w == 0.0));
            }
        }
    }

    #[test]
    fn c6_and_pair_energies_are_symmetric() {
        let db = testing::fixture();
        let model = Dispersion::new(&db, &testing::FRAGMENT_NUMBERS, configs()[0]).unwrap();
        let result = model.analyze(&fragment_positions(0.0)).unwrap();
        assert_eq!(result.c6, result.c6.t());
        assert_eq!(result.pair_energies, result.pair_energies.t());
        for row in result.weights.rows() {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 10.0 * f64::EPSILON);
        }
    }

    #[test]
    fn batch_equals_sequential() {
        let db = testing::fixture();
        let model = Dispersion::new(&db, &testing::FRAGMENT_NUMBERS, configs()[1]).unwrap();
        let frames: Vec<Vec<[f64; 3]>> = [0.0, 2.5, 10.0, 100.0]
            .iter()
            .map(|&shift| fragment_positions(shift))
            .collect();
        let batch = model.energy_batch(&frames).unwrap();
        for (frame, energy) in frames.iter().zip(&batch) {
            assert_eq!(*energy, model.energy(frame).unwrap());
        }
    }

    #[test]
    fn subset_equals_fresh_model() {
        let db = testing::fixture();
        let config = configs()[0];
        let positions = fragment_positions(0.0);
        let model = Dispersion::new(&db, &testing::FRAGMENT_NUMBERS, config).unwrap();
        let picked = [5, 6, 7, 8, 3];
        let sub_positions: Vec<[f64; 3]> = picked.iter().map(|&i| positions[i]).collect();
        let sub_numbers: Vec<u8> = picked.iter().map(|&i| testing::FRAGMENT_NUMBERS[i]).collect();

        let from_subset = model.subset(&picked).unwrap().energy(&sub_positions).unwrap();
        let fresh = Dispersion::new(&db, &sub_numbers, config)
            .unwrap()
            .energy(&sub_positions)
            .unwrap();
        assert_eq!(from_subset, fresh);
    }

    fn water_system() -> System {
        let mut system = System::new();
        for (z, p) in testing::WATER_NUMBERS.iter().zip(testing::WATER_POSITIONS) {
            let element = crate::model::types::Element::from_atomic_number(*z).unwrap();
            system.atoms.push(crate::model::atom::Atom::new(element, p));
        }
        system
    }

    #[test]
    fn box_vectors_make_the_model_periodic() {
        let db = testing::fixture();
        let config = configs()[0];
        let mut system = water_system();
        let free = Dispersion::from_system(&db, &system, config).unwrap();
        assert!(free.cell().is_none());

        // narrower than both cutoffs along x
        system.box_vectors = Some([[4.0, 0.0, 0.0], [0.0, 30.0, 0.0], [0.0, 0.0, 30.0]]);
        let periodic = Dispersion::from_system(&db, &system, config).unwrap();
        assert!(periodic.cell().is_some());

        let positions = system.positions();
        let e_free = free.energy(&positions).unwrap();
        let e_periodic = periodic.energy(&positions).unwrap();
        assert!(e_periodic.is_finite() && e_periodic < e_free);
        assert_eq!(free.energy_in(&positions, &FreeBoundary).unwrap(), e_free);
    }

    #[test]
    fn lone_atom_interacts_with_its_images() {
        let db = testing::fixture();
        let a = 30.0;
        let cell = PeriodicBoundary::new([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]).unwrap();

        // every image within the dispersion cutoff sits in the first shell
        let mut supercell = Vec::new();
        for i in -1..=1 {
            for j in -1..=1 {
                for k in -1..=1 {
                    supercell.push([i as f64 * a, j as f64 * a, k as f64 * a]);
                }
            }
        }
        let centre = 13;
        assert_eq!(supercell[centre], [0.0, 0.0, 0.0]);

        for config in configs() {
            let periodic = Dispersion::new(&db, &[8], config)
                .unwrap()
                .analyze_in(&[[0.0, 0.0, 0.0]], &cell)
                .unwrap();
            let explicit = Dispersion::new(&db, &[8; 27], config)
                .unwrap()
                .atomic_energies(&supercell)
                .unwrap();
            assert!(periodic.energy < 0.0);
            assert_eq!(periodic.coordination_numbers[0], 0.0);
            assert_relative_eq!(periodic.energy, explicit[centre], max_relative = 1e-10);
        }
    }

    #[test]
    fn periodic_energy_ignores_which_image_is_stored() {
        let db = testing::fixture();
        let a = 12.0;
        let cell = PeriodicBoundary::new([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]).unwrap();
        let positions = testing::WATER_POSITIONS.to_vec();
        let mut shifted = positions.clone();
        shifted[1][0] += a;
        shifted[2][2] -= 2.0 * a;

        for config in configs() {
            let model = Dispersion::new(&db, &testing::WATER_NUMBERS, config).unwrap();
            let e0 = model.energy_in(&positions, &cell).unwrap();
            let e1 = model.energy_in(&shifted, &cell).unwrap();
            assert!(e0 < model.energy(&positions).unwrap());
            assert_relative_eq!(e0, e1, max_relative = 1e-10);
        }
    }

    #[test]
    fn vanishing_distances_are_rejected_for_both_schemes() {
        let db = testing::fixture();
        let positions = [[0.0, 0.0, 0.0], [1e-60, 0.0, 0.0]];
        for config in configs() {
            let model = Dispersion::new(&db, &[1, 1], config).unwrap();
            assert!(matches!(
                model.energy(&positions),
                Err(Error::DegenerateGeometry { i: 0, j: 1, .. })
            ));
        }
    }

    #[test]
    fn atoms_on_top_of_an_image_are_rejected() {
        let db = testing::fixture();
        let cell = PeriodicBoundary::new([[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]])
            .unwrap();
        let model = Dispersion::new(&db, &[1, 1], configs()[0]).unwrap();
        assert!(matches!(
            model.energy_in(&[[0.0, 0.0, 0.0], [0.0, 10.0, 0.0]], &cell),
            Err(Error::DegenerateGeometry { i: 0, j: 1, .. })
        ));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let db = testing::fixture();
        let config = configs()[0];
        let model = Dispersion::new(&db, &testing::WATER_NUMBERS, config).unwrap();

        assert!(matches!(
            model.energy(&testing::WATER_POSITIONS[..2]),
            Err(Error::LengthMismatch { positions: 2, numbers: 3 })
        ));

        let mut nan = testing::WATER_POSITIONS.to_vec();
        nan[1][2] = f64::NAN;
        assert!(matches!(model.energy(&nan), Err(Error::NonFinitePosition { index: 1 })));

        let mut stacked = testing::WATER_POSITIONS.to_vec();
        stacked[2] = stacked[1];
        assert!(matches!(
            model.energy(&stacked),
            Err(Error::DegenerateGeometry { i: 1, j: 2, .. })
        ));

        assert!(matches!(
            Dispersion::new(&db, &[], config),
            Err(Error::EmptySystem)
        ));
        assert!(matches!(
            Dispersion::new(&db, &[8, 1, 1, 35], config),
            Err(Error::UnsupportedElement { index: 3, number: 35 })
        ));
    }

    #[test]
    fn global_entry_points() {
        testing::install_fixture();
        let params = ParameterSet::preset("pbe0", DampingScheme::Rational).unwrap();
        let total = evaluate(
            &testing::WATER_POSITIONS,
            &testing::WATER_NUMBERS,
            &params,
            DampingScheme::Rational,
        )
        .unwrap();
        let per_atom = evaluate_per_atom(
            &testing::WATER_POSITIONS,
            &testing::WATER_NUMBERS,
            &params,
            DampingScheme::Rational,
        )
        .unwrap();
        assert_eq!(per_atom.len(), 3);
        assert_relative_eq!(per_atom.iter().sum::<f64>(), total, max_relative = 1e-12);
    }

    #[test]
    fn missing_parameters_fail_before_evaluation() {
        let params = ParameterSet {
            s6: Some(1.0),
            s8: Some(1.0),
            ..Default::default()
        };
        // empty input would fail later; the parameter error comes first
        assert!(matches!(
            evaluate(&[], &[], &params, DampingScheme::Zero),
            Err(Error::MissingParameter { name: "rs6", .. })
        ));
    }
}
