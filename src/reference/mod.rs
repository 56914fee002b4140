//! Static reference data for the D3 model.
//!
//! The [`ReferenceDatabase`] holds everything the dispersion model looks up
//! by atomic number: covalent radii, r⁴/r² factors, pairwise van der Waals
//! radii, and the reference environments of each element with their
//! coordination numbers and C6 coefficients.
//!
//! Reference environments are stored padded to a common width. Unused slots
//! carry a negative coordination number and zero C6 coefficients, so every
//! element can be processed uniformly. Index 0 is the padding atom: all of its
//! entries are zero and it has no valid reference environment.
//!
//! A process-wide database is available through [`global`]. It is either set
//! explicitly with [`install`] or read lazily from the file named by the
//! `D3FORGE_REFERENCE` environment variable.

mod source;
pub mod tables;

pub use source::{ElementEntry, PairEntry, ReferenceTables};

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use ndarray::{Array1, Array2, Array4, ArrayView1, ArrayView2, s};

use crate::dispersion::Error;

/// Highest atomic number covered by the built-in tables.
pub const MAX_ELEMENT: usize = 118;

/// Largest number of reference environments accepted per element.
pub const MAX_REFERENCES: usize = 7;

/// Environment variable naming a reference data file for [`global`].
pub const REFERENCE_ENV: &str = "D3FORGE_REFERENCE";

/// Coordination number marking an unused reference slot.
pub const UNUSED_REFERENCE: f64 = -1.0;

const SYMMETRY_TOLERANCE: f64 = 1e-10;

static GLOBAL: OnceLock<ReferenceDatabase> = OnceLock::new();

/// Immutable reference tables indexed by atomic number.
pub struct ReferenceDatabase {
    version: Option<String>,
    max_references: usize,
    supported: Vec<bool>,
    pub(crate) covalent_radius: Array1<f64>,
    pub(crate) sqrt_z_r4_over_r2: Array1<f64>,
    pub(crate) vdw_radius: Array2<f64>,
    pub(crate) reference_cn: Array2<f64>,
    pub(crate) reference_c6: Array4<f64>,
}

impl ReferenceDatabase {
    /// Validates raw tables and lays them out for evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReference`] if an element is declared twice or
    /// outside 1..=118, has no or too many reference environments, if a pair
    /// is missing, duplicated or refers to an undeclared element, if a C6
    /// block has the wrong shape or a same-element block is not symmetric, or
    /// if any value is negative or not finite.
    pub fn from_tables(tables: ReferenceTables) -> Result<Self, Error> {
        let mut supported = vec![false; MAX_ELEMENT + 1];
        let mut counts = vec![0usize; MAX_ELEMENT + 1];

        if tables.elements.is_empty() {
            return Err(Error::invalid_reference("no elements declared"));
        }

        for entry in &tables.elements {
            let z = entry.number as usize;
            if z == 0 || z > MAX_ELEMENT {
                return Err(Error::invalid_reference(format!(
                    "element number {} is outside 1..={}",
                    z, MAX_ELEMENT
                )));
            }
            if supported[z] {
                return Err(Error::invalid_reference(format!(
                    "element {} is declared more than once",
                    z
                )));
            }
            let n_ref = entry.reference_cn.len();
            if n_ref == 0 || n_ref > MAX_REFERENCES {
                return Err(Error::invalid_reference(format!(
                    "element {} has {} reference environments (expected 1..={})",
                    z, n_ref, MAX_REFERENCES
                )));
            }
            if let Some(cn) = entry
                .reference_cn
                .iter()
                .find(|cn| !cn.is_finite() || **cn < 0.0)
            {
                return Err(Error::invalid_reference(format!(
                    "element {} has invalid reference coordination number {}",
                    z, cn
                )));
            }
            for (name, value) in [
                ("covalent_radius", entry.covalent_radius),
                ("r4_over_r2", entry.r4_over_r2),
            ] {
                if let Some(v) = value.filter(|v| !v.is_finite() || *v <= 0.0) {
                    return Err(Error::invalid_reference(format!(
                        "element {} has invalid {} {}",
                        z, name, v
                    )));
                }
            }
            supported[z] = true;
            counts[z] = n_ref;
        }

        let max_references = counts.iter().copied().max().unwrap_or(0);
        let size = MAX_ELEMENT + 1;

        let mut covalent_radius = Array1::from(tables::COVALENT_RADII_D3.to_vec());
        let mut r4_over_r2 = Array1::from(tables::R4_OVER_R2.to_vec());
        let mut reference_cn = Array2::from_elem((size, max_references), UNUSED_REFERENCE);

        for entry in &tables.elements {
            let z = entry.number as usize;
            if let Some(r) = entry.covalent_radius {
                covalent_radius[z] = r;
            }
            if let Some(r) = entry.r4_over_r2 {
                r4_over_r2[z] = r;
            }
            for (slot, &cn) in entry.reference_cn.iter().enumerate() {
                reference_cn[[z, slot]] = cn;
            }
        }

        let sqrt_z_r4_over_r2 =
            Array1::from_shape_fn(size, |z| tables::sqrt_z_r4_over_r2(z, r4_over_r2[z]));

        let mut vdw_radius = Array2::zeros((size, size));
        let mut reference_c6 = Array4::zeros((size, size, max_references, max_references));
        let mut seen = HashSet::new();

        for pair in &tables.pairs {
            let [za, zb] = pair.numbers.map(|z| z as usize);
            for z in [za, zb] {
                if z > MAX_ELEMENT || !supported[z] {
                    return Err(Error::invalid_reference(format!(
                        "pair {}-{} refers to undeclared element {}",
                        za, zb, z
                    )));
                }
            }
            if !seen.insert((za.min(zb), za.max(zb))) {
                return Err(Error::invalid_reference(format!(
                    "pair {}-{} is declared more than once",
                    za, zb
                )));
            }
            if !pair.rvdw.is_finite() || pair.rvdw <= 0.0 {
                return Err(Error::invalid_reference(format!(
                    "pair {}-{} has invalid van der Waals radius {}",
                    za, zb, pair.rvdw
                )));
            }
            validate_c6_block(za, zb, &pair.c6, counts[za], counts[zb])?;

            vdw_radius[[za, zb]] = pair.rvdw;
            vdw_radius[[zb, za]] = pair.rvdw;
            for (a, row) in pair.c6.iter().enumerate() {
                for (b, &c6) in row.iter().enumerate() {
                    reference_c6[[za, zb, a, b]] = c6;
                    reference_c6[[zb, za, b, a]] = c6;
                }
            }
        }

        let declared: Vec<usize> = (1..size).filter(|&z| supported[z]).collect();
        for (k, &za) in declared.iter().enumerate() {
            for &zb in &declared[k..] {
                if !seen.contains(&(za, zb)) {
                    return Err(Error::invalid_reference(format!(
                        "missing pair data for elements {}-{}",
                        za, zb
                    )));
                }
            }
        }

        log::debug!(
            "reference data '{}': {} elements, up to {} reference environments",
            tables.version.as_deref().unwrap_or("unversioned"),
            declared.len(),
            max_references
        );

        Ok(Self {
            version: tables.version,
            max_references,
            supported,
            covalent_radius,
            sqrt_z_r4_over_r2,
            vdw_radius,
            reference_cn,
            reference_c6,
        })
    }

    /// Parses and validates reference data in TOML format.
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let tables: ReferenceTables = toml::from_str(content).map_err(Error::ReferenceParse)?;
        Self::from_tables(tables)
    }

    /// Reads, parses and validates a reference data file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::ReferenceIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Width of the padded reference-environment axis.
    #[inline]
    pub fn max_references(&self) -> usize {
        self.max_references
    }

    /// `true` for atomic numbers with reference data. The padding number 0 is not supported.
    #[inline]
    pub fn is_supported(&self, number: u8) -> bool {
        self.supported
            .get(number as usize)
            .copied()
            .unwrap_or(false)
    }

    pub fn supported_elements(&self) -> impl Iterator<Item = u8> + '_ {
        self.supported
            .iter()
            .enumerate()
            .filter(|(_, supported)| **supported)
            .map(|(z, _)| z as u8)
    }

    /// Checks that every number is either padding (0) or covered by the tables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedElement`] for the first offending atom.
    pub fn check_numbers(&self, numbers: &[u8]) -> Result<(), Error> {
        match numbers
            .iter()
            .position(|&z| z != 0 && !self.is_supported(z))
        {
            Some(index) => Err(Error::UnsupportedElement {
                index,
                number: numbers[index],
            }),
            None => Ok(()),
        }
    }

    fn lookup(&self, number: u8) -> Result<usize, Error> {
        if number == 0 || self.is_supported(number) {
            Ok(number as usize)
        } else {
            Err(Error::UnknownElement(number))
        }
    }

    /// D3 covalent radius in Bohr.
    pub fn covalent_radius(&self, number: u8) -> Result<f64, Error> {
        Ok(self.covalent_radius[self.lookup(number)?])
    }

    /// `sqrt(0.5 * r4/r2 * sqrt(Z))` for the element.
    pub fn sqrt_z_r4_over_r2(&self, number: u8) -> Result<f64, Error> {
        Ok(self.sqrt_z_r4_over_r2[self.lookup(number)?])
    }

    /// Van der Waals cutoff radius of an element pair in Bohr.
    pub fn vdw_radius(&self, a: u8, b: u8) -> Result<f64, Error> {
        Ok(self.vdw_radius[[self.lookup(a)?, self.lookup(b)?]])
    }

    /// Reference coordination numbers, padded with [`UNUSED_REFERENCE`].
    pub fn reference_cn(&self, number: u8) -> Result<ArrayView1<'_, f64>, Error> {
        let z = self.lookup(number)?;
        Ok(self.reference_cn.row(z))
    }

    /// Reference C6 block with rows for the environments of `a` and columns for those of `b`.
    pub fn reference_c6(&self, a: u8, b: u8) -> Result<ArrayView2<'_, f64>, Error> {
        let (za, zb) = (self.lookup(a)?, self.lookup(b)?);
        Ok(self.reference_c6.slice(s![za, zb, .., ..]))
    }
}

impl fmt::Debug for ReferenceDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceDatabase")
            .field("version", &self.version)
            .field("elements", &self.supported_elements().collect::<Vec<_>>())
            .field("max_references", &self.max_references)
            .finish_non_exhaustive()
    }
}

fn validate_c6_block(
    za: usize,
    zb: usize,
    block: &[Vec<f64>],
    rows: usize,
    cols: usize,
) -> Result<(), Error> {
    if block.len() != rows || block.iter().any(|row| row.len() != cols) {
        return Err(Error::invalid_reference(format!(
            "C6 block for pair {}-{} must be {}x{}",
            za, zb, rows, cols
        )));
    }
    if let Some(c6) = block.iter().flatten().find(|c| !c.is_finite() || **c < 0.0) {
        return Err(Error::invalid_reference(format!(
            "C6 block for pair {}-{} contains invalid value {}",
            za, zb, c6
        )));
    }
    if za == zb {
        for a in 0..rows {
            for b in 0..a {
                let (x, y) = (block[a][b], block[b][a]);
                if (x - y).abs() > SYMMETRY_TOLERANCE * x.abs().max(y.abs()).max(1.0) {
                    return Err(Error::invalid_reference(format!(
                        "C6 block for pair {}-{} is not symmetric at ({}, {})",
                        za, zb, a, b
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Installs the process-wide reference database.
///
/// Returns the database back if one is already installed.
pub fn install(database: ReferenceDatabase) -> Result<(), ReferenceDatabase> {
    GLOBAL.set(database)
}

/// Returns the process-wide reference database.
///
/// If none was installed, the file named by `D3FORGE_REFERENCE` is loaded
/// once and kept for the lifetime of the process.
///
/// # Errors
///
/// Returns [`Error::ReferenceUnavailable`] if nothing is installed and the
/// variable is unset, or the loading error of the named file.
pub fn global() -> Result<&'static ReferenceDatabase, Error> {
    if let Some(database) = GLOBAL.get() {
        return Ok(database);
    }
    let path = std::env::var_os(REFERENCE_ENV)
        .map(PathBuf::from)
        .ok_or(Error::ReferenceUnavailable)?;
    let database = ReferenceDatabase::from_path(&path)?;
    log::debug!("loaded global reference data from {}", path.display());
    Ok(GLOBAL.get_or_init(|| database))
}
