//! Length conversion factors.

/// Bohr radius in Ångström (CODATA 2018).
pub const BOHR_TO_ANGSTROM: f64 = 0.529177210903;

/// Ångström to Bohr.
pub const ANGSTROM_TO_BOHR: f64 = 1.0 / BOHR_TO_ANGSTROM;

/// Length unit of coordinates read from or written to files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    #[default]
    Angstrom,
    Bohr,
}

impl LengthUnit {
    /// Factor converting a length in this unit to Bohr.
    pub fn to_bohr(self) -> f64 {
        match self {
            LengthUnit::Angstrom => ANGSTROM_TO_BOHR,
            LengthUnit::Bohr => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_factors_are_inverse() {
        assert!((ANGSTROM_TO_BOHR * BOHR_TO_ANGSTROM - 1.0).abs() < 1e-15);
        assert_eq!(LengthUnit::Bohr.to_bohr(), 1.0);
        assert_eq!(LengthUnit::default(), LengthUnit::Angstrom);
    }
}
