//! Structure file input.
//!
//! Only the XYZ family is read: plain multi-frame XYZ and the extended
//! variant whose comment line carries a `Lattice="..."` entry.

use std::fmt;

pub mod error;
pub mod xyz;

pub use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Xyz,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Xyz => write!(f, "XYZ"),
        }
    }
}
