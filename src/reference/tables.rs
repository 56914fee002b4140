//! Per-element constants compiled into the crate.
//!
//! Index 0 is the padding slot and holds zero in every table.

use std::sync::LazyLock;

use super::MAX_ELEMENT;
use crate::model::units::ANGSTROM_TO_BOHR;

/// Covalent radii in Ångström (Pyykkö and Atsumi, Chem. Eur. J. 15, 2009,
/// 188-197), metal values decreased by 10 %.
#[rustfmt::skip]
pub const COVALENT_RADII_2009: [f64; MAX_ELEMENT + 1] = [
    0.00, // padding
    0.32, 0.46, // H-He
    1.20, 0.94, 0.77, 0.75, 0.71, 0.63, 0.64, 0.67, // Li-Ne
    1.40, 1.25, 1.13, 1.04, 1.10, 1.02, 0.99, 0.96, // Na-Ar
    1.76, 1.54, // K-Ca
    1.33, 1.22, 1.21, 1.10, 1.07, 1.04, 1.00, 0.99, 1.01, 1.09, // Sc-Zn
    1.12, 1.09, 1.15, 1.10, 1.14, 1.17, // Ga-Kr
    1.89, 1.67, // Rb-Sr
    1.47, 1.39, 1.32, 1.24, 1.15, 1.13, 1.13, 1.08, 1.15, 1.23, // Y-Cd
    1.28, 1.26, 1.26, 1.23, 1.32, 1.31, // In-Xe
    2.09, 1.76, // Cs-Ba
    1.62, 1.47, 1.58, 1.57, 1.56, 1.55, 1.51, // La-Eu
    1.52, 1.51, 1.50, 1.49, 1.49, 1.48, 1.53, // Gd-Yb
    1.46, 1.37, 1.31, 1.23, 1.18, 1.16, 1.11, 1.12, 1.13, 1.32, // Lu-Hg
    1.30, 1.30, 1.36, 1.31, 1.38, 1.42, // Tl-Rn
    2.01, 1.81, // Fr-Ra
    1.67, 1.58, 1.52, 1.53, 1.54, 1.55, 1.49, // Ac-Am
    1.49, 1.51, 1.51, 1.48, 1.50, 1.56, 1.58, // Cm-No
    1.45, 1.41, 1.34, 1.29, 1.27, 1.21, 1.16, 1.15, 1.09, 1.22, // Lr-Cn
    1.36, 1.43, 1.46, 1.58, 1.48, 1.57, // Nh-Og
];

/// Expectation values ⟨r⁴⟩/⟨r²⟩ from PBE0/def2-QZVP atomic calculations, rare
/// gases from PBE0/aug-cc-pVQZ and the superheavy elements from 4c-PBE/Dyall-AE4Z.
#[rustfmt::skip]
pub const R4_OVER_R2: [f64; MAX_ELEMENT + 1] = [
    0.0000, // padding
    8.0589, 3.4698, // H-He
    29.0974, 14.8517, 11.8799, 7.8715, 5.5588, 4.7566, 3.8025, 3.1036, // Li-Ne
    26.1552, 17.2304, 17.7210, 12.7442, 9.5361, 8.1652, 6.7463, 5.6004, // Na-Ar
    29.2012, 22.3934, // K-Ca
    19.0598, 16.8590, 15.4023, 12.5589, 13.4788, 12.2309, 11.2809, 10.5569, 10.1428, 9.4907, // Sc-Zn
    13.4606, 10.8544, 8.9386, 8.1350, 7.1251, 6.1971, // Ga-Kr
    30.0162, 24.4103, // Rb-Sr
    20.3537, 17.4780, 13.5528, 11.8451, 11.0355, 10.1997, 9.5414, 9.0061, 8.6417, 8.9975, // Y-Cd
    14.0834, 11.8333, 10.0179, 9.3844, 8.4110, 7.5152, // In-Xe
    32.7622, 27.5708, // Cs-Ba
    23.1671, 21.6003, 20.9615, 20.4562, 20.1010, 19.7475, 19.4828, // La-Eu
    15.6013, 19.2362, 17.4717, 17.8321, 17.4237, 17.1954, 17.1631, // Gd-Yb
    14.5716, 15.8758, 13.8989, 12.4834, 11.4421, 10.2671, 8.3549, 7.8496, 7.3278, 7.4820, // Lu-Hg
    13.5124, 11.6554, 10.0959, 9.7340, 8.8584, 8.0125, // Tl-Rn
    29.8135, 26.3157, // Fr-Ra
    19.1885, 15.8542, 16.1305, 15.6161, 15.1226, 16.1576, 14.6510, // Ac-Am
    14.7178, 13.9108, 13.5623, 13.2326, 12.9189, 12.6133, 12.3142, // Cm-No
    14.8326, 12.3771, 10.6378, 9.3638, 8.2297, 7.5667, 6.9456, 6.3946, 5.9159, 5.4929, // Lr-Cn
    6.7286, 6.5144, 10.9169, 10.3600, 9.4723, 8.6641, // Nh-Og
];

/// Covalent radii used by the coordination number, in Bohr (4/3 of the 2009 radii).
pub static COVALENT_RADII_D3: LazyLock<[f64; MAX_ELEMENT + 1]> = LazyLock::new(|| {
    COVALENT_RADII_2009.map(|r| 4.0 / 3.0 * r * ANGSTROM_TO_BOHR)
});

/// `sqrt(0.5 * r4/r2 * sqrt(Z))`, the per-element factor of the C8/C6 ratio.
#[inline]
pub fn sqrt_z_r4_over_r2(number: usize, r4_over_r2: f64) -> f64 {
    (0.5 * r4_over_r2 * (number as f64).sqrt()).sqrt()
}
