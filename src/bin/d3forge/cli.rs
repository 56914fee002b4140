use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use d3_forge::{DampingScheme, LengthUnit, ParameterSet};

#[derive(Parser)]
#[command(
    name = "d3forge",
    about = "D3 dispersion energies for molecules and periodic cells",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute dispersion energies for every frame of an XYZ file
    #[command(visible_alias = "e")]
    Energy(EnergyArgs),

    /// List functionals with built-in damping parameters
    #[command(visible_alias = "f")]
    Functionals(FunctionalsArgs),
}

/// I/O options.
#[derive(Args)]
pub struct IoOptions {
    /// Input XYZ file (stdin if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct EnergyArgs {
    #[command(flatten)]
    pub io: IoOptions,

    /// Reference data file (TOML)
    #[arg(long, value_name = "FILE", env = "D3FORGE_REFERENCE")]
    pub reference: Option<PathBuf>,

    #[command(flatten)]
    pub damping: DampingOptions,

    #[command(flatten)]
    pub output: OutputOptions,
}

/// Damping selection. Values are layered: functional preset, then the
/// configuration file, then individual parameter flags.
#[derive(Args)]
#[command(next_help_heading = "Damping")]
pub struct DampingOptions {
    /// Functional whose damping parameters to use
    #[arg(short, long, value_name = "NAME")]
    pub functional: Option<String>,

    /// Damping function
    #[arg(short, long, value_name = "SCHEME")]
    pub damping: Option<Scheme>,

    /// Configuration file with [damping], [cutoff] and [model] tables
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Scaling of the C6 term
    #[arg(long, value_name = "S6", allow_hyphen_values = true)]
    pub s6: Option<f64>,

    /// Scaling of the C8 term
    #[arg(long, value_name = "S8", allow_hyphen_values = true)]
    pub s8: Option<f64>,

    /// Rational damping: scaling of the critical radius
    #[arg(long, value_name = "A1", allow_hyphen_values = true)]
    pub a1: Option<f64>,

    /// Rational damping: offset of the critical radius (Bohr)
    #[arg(long, value_name = "A2", allow_hyphen_values = true)]
    pub a2: Option<f64>,

    /// Zero damping: radius scaling of the C6 term
    #[arg(long, value_name = "RS6", allow_hyphen_values = true)]
    pub rs6: Option<f64>,

    /// Zero damping: radius scaling of the C8 term
    #[arg(long, value_name = "RS8", allow_hyphen_values = true)]
    pub rs8: Option<f64>,

    /// Zero damping: exponent of the C6 term
    #[arg(long, value_name = "ALP", allow_hyphen_values = true)]
    pub alp: Option<f64>,
}

impl DampingOptions {
    pub fn overrides(&self) -> ParameterSet {
        ParameterSet {
            s6: self.s6,
            s8: self.s8,
            a1: self.a1,
            a2: self.a2,
            rs6: self.rs6,
            rs8: self.rs8,
            alp: self.alp,
        }
    }
}

#[derive(Args)]
#[command(next_help_heading = "Output")]
pub struct OutputOptions {
    /// Length unit of the input coordinates
    #[arg(short, long, value_name = "UNIT", default_value = "angstrom")]
    pub unit: Unit,

    /// Also write coordination numbers and per-atom energies
    #[arg(long)]
    pub per_atom: bool,
}

#[derive(Args)]
pub struct FunctionalsArgs {
    /// Only list functionals parameterized for this damping
    #[arg(short, long, value_name = "SCHEME")]
    pub damping: Option<Scheme>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum Scheme {
    /// Rational (Becke–Johnson) damping
    #[default]
    #[value(alias = "bj")]
    Rational,
    /// Zero damping
    Zero,
}

impl From<Scheme> for DampingScheme {
    fn from(scheme: Scheme) -> Self {
        match scheme {
            Scheme::Rational => DampingScheme::Rational,
            Scheme::Zero => DampingScheme::Zero,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum Unit {
    /// Ångström
    #[default]
    #[value(alias = "a")]
    Angstrom,
    /// Bohr
    Bohr,
}

impl From<Unit> for LengthUnit {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Angstrom => LengthUnit::Angstrom,
            Unit::Bohr => LengthUnit::Bohr,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
