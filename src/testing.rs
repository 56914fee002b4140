//! Shared fixtures for unit tests.
//!
//! The reference tables here cover H, C, N and O with the usual number of
//! reference environments and realistic magnitudes. Their C6 blocks are
//! geometric means of per-environment values, which keeps them symmetric
//! and positive; they are not fitted to any reference calculation.

use crate::reference::{self, ElementEntry, PairEntry, ReferenceDatabase, ReferenceTables};

const ELEMENTS: [(u8, &[f64], &[f64], f64); 4] = [
    (1, &[0.9118, 0.0], &[3.09, 7.59], 2.2),
    (
        6,
        &[0.0, 0.9868, 1.9985, 2.9987, 3.9844],
        &[49.11, 43.25, 29.36, 25.78, 18.21],
        2.8,
    ),
    (7, &[0.0, 0.9935, 1.9886, 2.9864], &[33.43, 26.09, 21.74, 15.58], 2.7),
    (8, &[0.0, 0.9925, 1.9887], &[22.22, 16.19, 12.80], 2.6),
];

pub const WATER_NUMBERS: [u8; 3] = [8, 1, 1];

pub const WATER_POSITIONS: [[f64; 3]; 3] = [
    [0.0, 0.0, -0.73578586109551],
    [1.44183152868459, 0.0, 0.36789293054775],
    [-1.44183152868459, 0.0, 0.36789293054775],
];

/// Two hydrogen-bonded fragments: a water molecule and methanol.
pub const FRAGMENT_NUMBERS: [u8; 9] = [8, 1, 1, 8, 1, 6, 1, 1, 1];

/// Atoms before this index form the first fragment.
pub const FRAGMENT_SPLIT: usize = 3;

pub const FRAGMENT_POSITIONS: [[f64; 3]; 9] = [
    [-4.224363834, 0.270465696, 0.527578960],
    [-5.011768887, 1.780116228, 1.143194385],
    [-2.468758653, 0.479766200, 0.982905589],
    [1.146167671, 0.452771215, 1.257722311],
    [1.841554378, -0.628298322, 2.538065200],
    [2.024899840, -0.438480095, -1.127412563],
    [1.210773578, 0.791908575, -2.550591723],
    [4.077073644, -0.342495506, -1.267841745],
    [1.404422261, -2.365753991, -1.503620411],
];

pub fn tables() -> ReferenceTables {
    let elements = ELEMENTS
        .iter()
        .map(|&(number, cn, _, _)| ElementEntry {
            number,
            reference_cn: cn.to_vec(),
            covalent_radius: None,
            r4_over_r2: None,
        })
        .collect();

    let mut pairs = Vec::new();
    for (k, &(za, _, ca, ra)) in ELEMENTS.iter().enumerate() {
        for &(zb, _, cb, rb) in &ELEMENTS[k..] {
            let c6 = ca
                .iter()
                .map(|a| cb.iter().map(|b| (a * b).sqrt()).collect())
                .collect();
            pairs.push(PairEntry {
                numbers: [za, zb],
                rvdw: ra + rb,
                c6,
            });
        }
    }

    ReferenceTables {
        version: Some("test-fixture".to_string()),
        elements,
        pairs,
    }
}

pub fn fixture() -> ReferenceDatabase {
    ReferenceDatabase::from_tables(tables()).expect("fixture tables are valid")
}

/// Installs the fixture as the global database unless one is already set.
pub fn install_fixture() {
    let _ = reference::install(fixture());
}
