//! Serialized layout of reference data files.
//!
//! A data file declares the elements it covers together with their reference
//! coordination numbers, and one `[[pair]]` table for every unordered pair of
//! declared elements (including each element with itself):
//!
//! ```toml
//! version = "example"
//!
//! [[element]]
//! number = 1
//! reference_cn = [0.9118, 0.0]
//!
//! [[pair]]
//! numbers = [1, 1]
//! rvdw = 3.0
//! c6 = [[3.0, 4.5], [4.5, 7.5]]
//! ```
//!
//! `c6` rows follow the reference environments of `numbers[0]`, columns those
//! of `numbers[1]`. Covalent radii and r⁴/r² values default to the built-in
//! tables and may be overridden per element (`covalent_radius` in Bohr,
//! `r4_over_r2`).

use serde::Deserialize;

/// Raw reference tables as read from a data file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceTables {
    /// Free-form provenance label.
    #[serde(default)]
    pub version: Option<String>,
    /// Elements covered by the tables.
    #[serde(default, rename = "element")]
    pub elements: Vec<ElementEntry>,
    /// Pairwise van der Waals radii and reference C6 blocks.
    #[serde(default, rename = "pair")]
    pub pairs: Vec<PairEntry>,
}

/// Per-element reference data.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementEntry {
    pub number: u8,
    /// Coordination numbers of the reference environments, in table order.
    pub reference_cn: Vec<f64>,
    /// Override for the D3 covalent radius (Bohr).
    #[serde(default)]
    pub covalent_radius: Option<f64>,
    /// Override for the ⟨r⁴⟩/⟨r²⟩ expectation value.
    #[serde(default)]
    pub r4_over_r2: Option<f64>,
}

/// Reference data for one unordered element pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PairEntry {
    pub numbers: [u8; 2],
    /// Van der Waals cutoff radius (Bohr).
    pub rvdw: f64,
    /// Reference C6 block, rows for `numbers[0]` and columns for `numbers[1]`.
    pub c6: Vec<Vec<f64>>,
}
