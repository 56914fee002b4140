use super::atom::Atom;
use super::units::ANGSTROM_TO_BOHR;

/// A molecular or periodic structure.
///
/// Positions and box vectors are in Bohr. `box_vectors` holds the three
/// lattice vectors as rows; `None` means free boundary conditions.
#[derive(Debug, Clone, Default)]
pub struct System {
    pub atoms: Vec<Atom>,
    pub box_vectors: Option<[[f64; 3]; 3]>,
}

impl System {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a system from coordinates given in Ångström.
    pub fn from_angstrom(atoms: Vec<Atom>) -> Self {
        let atoms = atoms
            .into_iter()
            .map(|atom| Atom {
                position: atom.position.map(|x| x * ANGSTROM_TO_BOHR),
                ..atom
            })
            .collect();
        Self {
            atoms,
            box_vectors: None,
        }
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn is_periodic(&self) -> bool {
        self.box_vectors.is_some()
    }

    pub fn positions(&self) -> Vec<[f64; 3]> {
        self.atoms.iter().map(|atom| atom.position).collect()
    }

    pub fn atomic_numbers(&self) -> Vec<u8> {
        self.atoms
            .iter()
            .map(|atom| atom.element.atomic_number())
            .collect()
    }
}
