//! A pure Rust implementation of the D3 dispersion correction.
//! It estimates fractional coordination numbers, interpolates coordination-dependent
//! C6 coefficients from reference environments, and sums damped pairwise energies
//! with smooth real-space cutoffs.
//!
//! # Features
//!
//! - **Coordination numbers** — Smooth exponential counting with a switched cutoff
//! - **C6 interpolation** — Gaussian weighting over padded reference environments
//! - **Damping** — Rational (Becke–Johnson) and zero damping, with embedded
//!   parameters for common functionals
//! - **Boundaries** — Free molecules and periodic cells (lattice sums)
//! - **Parallel evaluation** — Row-parallel pair loops and batched frames via rayon
//! - **Structure input** — Multi-frame and extended XYZ
//!
//! # Quick Start
//!
//! Reference data is supplied as a TOML file (see [`reference`]). Once loaded,
//! a [`Dispersion`] model is built for a fixed composition and evaluated for
//! any number of geometries:
//!
//! ```
//! use d3_forge::{Damping, DampingScheme, Dispersion, DispersionConfig, DispersionError};
//! use d3_forge::ReferenceDatabase;
//!
//! let reference = ReferenceDatabase::from_toml(r#"
//!     [[element]]
//!     number = 1
//!     reference_cn = [0.9118, 0.0]
//!
//!     [[pair]]
//!     numbers = [1, 1]
//!     rvdw = 3.1
//!     c6 = [[3.09, 4.84], [4.84, 7.59]]
//! "#)?;
//!
//! let damping = Damping::for_functional("pbe", DampingScheme::Rational)?;
//! let model = Dispersion::new(&reference, &[1, 1], DispersionConfig::new(damping))?;
//!
//! // H₂ at 1.4 Bohr
//! let result = model.analyze(&[[0.0, 0.0, 0.0], [0.0, 0.0, 1.4]])?;
//! assert!(result.energy < 0.0);
//! assert!((result.coordination_numbers[0] - 1.0).abs() < 0.1);
//! # Ok::<(), DispersionError>(())
//! ```
//!
//! With a database installed through [`reference::install`] or named by the
//! `D3FORGE_REFERENCE` environment variable, [`evaluate`] and
//! [`evaluate_per_atom`] compute an energy in a single call.
//!
//! # Module Organization
//!
//! - [`reference`] — Reference tables, their file format and the global database
//! - [`dispersion`] — Coordination numbers, weights, C6, damping, and the [`Dispersion`] model
//! - [`geometry`] — Free and periodic boundaries, distance matrices
//! - [`io`] — XYZ structure input
//!
//! # Data Types
//!
//! ## Input Structures
//!
//! - [`System`] — Atoms with optional periodic box vectors
//! - [`Atom`] — Single atom with element and Cartesian coordinates (Bohr)
//! - [`Element`] — Chemical element (H through Og)
//!
//! ## Results
//!
//! - [`DispersionResult`] — Coordination numbers, weights, C6 matrix, pair,
//!   per-atom and total energies
//!
//! ## Configuration
//!
//! - [`DispersionConfig`] — Damping, cutoffs and model constants
//! - [`DampingScheme`] — Rational or zero damping
//! - [`ParameterSet`] — Partial damping parameters, layered and resolved
//! - [`Damping`] — Resolved damping function
//! - [`RealspaceCutoff`] — Switching radii
//! - [`ModelConstants`] — Counting steepness and weighting factor

pub mod dispersion;
pub mod geometry;
pub mod io;
mod model;
pub mod reference;

#[cfg(test)]
pub(crate) mod testing;

pub use model::atom::Atom;
pub use model::system::System;
pub use model::types::{Element, ParseElementError};
pub use model::units::{ANGSTROM_TO_BOHR, BOHR_TO_ANGSTROM, LengthUnit};

pub use dispersion::{
    ConfigFile, Damping, DampingScheme, Dispersion, DispersionConfig, DispersionResult,
    ModelConstants, ParameterSet, RationalDamping, RealspaceCutoff, ZeroDamping, evaluate,
    evaluate_per_atom,
};
pub use geometry::{Boundary, FreeBoundary, PeriodicBoundary};
pub use reference::ReferenceDatabase;

pub use dispersion::Error as DispersionError;
