//! Core data structures describing the structures being evaluated.
//!
//! - [`atom`] – Minimal atom representation with element and Cartesian coordinates.
//! - [`types`] – Periodic table elements.
//! - [`system`] – Collections of atoms with optional periodic box vectors.
//! - [`units`] – Bohr/Ångström conversion factors.
//!
//! All lengths inside the crate are in Bohr and all energies in Hartree.

pub mod atom;
pub mod system;
pub mod types;
pub mod units;
