//! The D3 dispersion model.
//!
//! Evaluation proceeds in stages, each a pure function of its inputs:
//!
//! 1. [`data`] — pair tables for the composition (covalent-radius sums,
//!    C8/C6 scaling, van der Waals radii).
//! 2. [`ncoord`] — fractional coordination numbers.
//! 3. [`weights`] — Gaussian weights over reference environments.
//! 4. [`c6`] — interpolated atomic C6 coefficients.
//! 5. [`damping`] — damped, switched pair energies.
//!
//! [`Dispersion`] ties the stages together for a fixed composition.

pub mod c6;
mod config;
pub mod cutoff;
pub mod damping;
pub mod data;
mod error;
pub mod ncoord;
pub mod params;
mod pipeline;
pub mod weights;

pub use config::{
    ConfigFile, Damping, DampingScheme, DampingSection, DispersionConfig, ModelConstants,
    ParameterSet, RationalDamping, RealspaceCutoff, ZeroDamping,
};
pub use error::Error;
pub use pipeline::{Dispersion, DispersionResult, evaluate, evaluate_per_atom};
