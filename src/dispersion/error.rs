//! Error types for dispersion evaluation.
//!
//! Errors are grouped by source: reference data, input validation,
//! and damping/cutoff configuration. Every error is fatal to the single
//! evaluation that raised it; evaluations are deterministic, so retrying
//! reproduces the same failure.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading reference data, configuring a model,
/// or evaluating a dispersion energy.
#[derive(Debug, Error)]
pub enum Error {
    /// An atomic number has no entry in the reference database.
    #[error("atomic number {number} (atom {index}) is not covered by the reference database")]
    UnsupportedElement {
        /// Position of the offending atom in the input.
        index: usize,
        /// The atomic number that failed the lookup.
        number: u8,
    },

    /// A direct table lookup for an atomic number without reference data.
    #[error("atomic number {0} is not covered by the reference database")]
    UnknownElement(u8),

    /// No reference database was installed and none could be located.
    #[error(
        "no reference database available: install one or set the D3FORGE_REFERENCE environment variable"
    )]
    ReferenceUnavailable,

    /// Failed to read a reference data file.
    #[error("failed to read reference data from '{}': {source}", path.display())]
    ReferenceIo {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Reference data file is not valid TOML for the expected layout.
    #[error("failed to parse reference data: {0}")]
    ReferenceParse(#[source] toml::de::Error),

    /// Reference data parsed but violates the table contract.
    #[error("invalid reference data: {0}")]
    InvalidReference(String),

    /// The input contains no atoms.
    #[error("input system is empty: at least one atom is required")]
    EmptySystem,

    /// Positions and atomic numbers disagree in length.
    #[error("got {positions} positions but {numbers} atomic numbers")]
    LengthMismatch {
        /// Number of positions supplied.
        positions: usize,
        /// Number of atomic numbers supplied.
        numbers: usize,
    },

    /// A coordinate is NaN or infinite.
    #[error("position of atom {index} is not finite")]
    NonFinitePosition {
        /// Index of the atom.
        index: usize,
    },

    /// Two real atoms coincide, so the pair functions are undefined.
    #[error("atoms {i} and {j} are at distance {distance}, which is not a valid geometry")]
    DegenerateGeometry {
        /// First atom index.
        i: usize,
        /// Second atom index.
        j: usize,
        /// The offending distance in Bohr.
        distance: f64,
    },

    /// A subset index does not refer to an atom of the system.
    #[error("atom index {index} is out of range for a system of {len} atoms")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of atoms available.
        len: usize,
    },

    /// A damping parameter required by the selected scheme was not given.
    #[error("missing damping parameter '{name}' for {scheme} damping")]
    MissingParameter {
        /// Damping scheme name.
        scheme: &'static str,
        /// Name of the missing parameter.
        name: &'static str,
    },

    /// A model parameter has a value outside its domain.
    #[error("invalid value {value} for parameter '{name}'")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// No preset is known under this functional name.
    #[error("no damping parameters known for functional '{0}'")]
    UnknownFunctional(String),

    /// A cutoff envelope whose onset is not strictly inside the cutoff.
    #[error("invalid cutoff envelope: onset {onset} must satisfy 0 < onset < cutoff ({cutoff})")]
    InvalidCutoff {
        /// Onset radius in Bohr.
        onset: f64,
        /// Cutoff radius in Bohr.
        cutoff: f64,
    },

    /// Configuration file is not valid TOML for the expected layout.
    #[error("failed to parse dispersion configuration: {0}")]
    ConfigParse(#[source] toml::de::Error),

    /// Box vectors do not span three dimensions.
    #[error("lattice vectors are linearly dependent")]
    SingularLattice,
}

impl Error {
    /// Creates an [`InvalidReference`](Error::InvalidReference) error.
    pub fn invalid_reference(details: impl Into<String>) -> Self {
        Self::InvalidReference(details.into())
    }

    /// Creates a [`MissingParameter`](Error::MissingParameter) error.
    pub fn missing_parameter(scheme: &'static str, name: &'static str) -> Self {
        Self::MissingParameter { scheme, name }
    }
}
