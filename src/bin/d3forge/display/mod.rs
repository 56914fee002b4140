mod banner;
mod error;
mod progress;
mod tables;

pub use banner::{banner_for_help, print_banner};
pub use error::print_error;
pub use progress::{Progress, Stage};
pub use tables::{print_damping, print_element_distribution, print_energies, print_structure_info};
