//! Configuration types for dispersion evaluation.
//!
//! # Overview
//!
//! - [`DispersionConfig`] — Main configuration struct
//! - [`DampingScheme`] — Rational (Becke–Johnson) or zero damping
//! - [`ParameterSet`] — Possibly incomplete damping parameters, as read from
//!   presets, files or command-line flags
//! - [`Damping`] — Fully resolved damping with validated parameters
//! - [`RealspaceCutoff`] — Switching radii for coordination numbers and energies
//! - [`ModelConstants`] — Counting steepness and Gaussian weighting factor

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::cutoff::Switching;
use super::error::Error;
use super::ncoord::DEFAULT_STEEPNESS;
use super::params;
use super::weights::DEFAULT_WEIGHTING;

/// Damping function family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DampingScheme {
    /// Rational (Becke–Johnson) damping with parameters `s6`, `s8`, `a1`, `a2`.
    #[default]
    #[serde(alias = "bj")]
    Rational,

    /// Zero damping with parameters `s6`, `s8`, `rs6`, `rs8`, `alp`.
    Zero,
}

impl DampingScheme {
    pub fn name(&self) -> &'static str {
        match self {
            DampingScheme::Rational => "rational",
            DampingScheme::Zero => "zero",
        }
    }
}

impl fmt::Display for DampingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DampingScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rational" | "bj" => Ok(DampingScheme::Rational),
            "zero" => Ok(DampingScheme::Zero),
            other => Err(format!("unknown damping scheme '{}'", other)),
        }
    }
}

/// Damping parameters of which any subset may be known.
///
/// Sets are layered with [`merge`](Self::merge), typically a functional
/// preset first and explicit values on top, and then checked against a
/// scheme with [`resolve`](Self::resolve).
///
/// # Examples
///
/// ```
/// use d3_forge::{DampingScheme, ParameterSet};
///
/// let preset = ParameterSet::preset("pbe", DampingScheme::Rational).unwrap();
/// let tuned = preset.merge(&ParameterSet { s8: Some(0.8), ..Default::default() });
/// assert_eq!(tuned.s8, Some(0.8));
/// assert!(tuned.resolve(DampingScheme::Rational).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterSet {
    pub s6: Option<f64>,
    pub s8: Option<f64>,
    pub a1: Option<f64>,
    pub a2: Option<f64>,
    pub rs6: Option<f64>,
    pub rs8: Option<f64>,
    pub alp: Option<f64>,
}

impl ParameterSet {
    /// Parameters of a named functional from the embedded presets.
    pub fn preset(functional: &str, scheme: DampingScheme) -> Result<Self, Error> {
        params::lookup(functional, scheme)
    }

    /// Returns a set where every value given in `other` replaces the one in `self`.
    pub fn merge(&self, other: &ParameterSet) -> ParameterSet {
        ParameterSet {
            s6: other.s6.or(self.s6),
            s8: other.s8.or(self.s8),
            a1: other.a1.or(self.a1),
            a2: other.a2.or(self.a2),
            rs6: other.rs6.or(self.rs6),
            rs8: other.rs8.or(self.rs8),
            alp: other.alp.or(self.alp),
        }
    }

    /// Checks that the scheme's parameters are all present and valid.
    ///
    /// Values belonging to the other scheme are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameter`] for the first absent parameter and
    /// [`Error::InvalidParameter`] for negative, zero-where-forbidden or
    /// non-finite values.
    pub fn resolve(&self, scheme: DampingScheme) -> Result<Damping, Error> {
        let name = scheme.name();
        let require = |value: Option<f64>, key: &'static str| -> Result<f64, Error> {
            value.ok_or_else(|| Error::missing_parameter(name, key))
        };

        match scheme {
            DampingScheme::Rational => {
                let damping = RationalDamping {
                    s6: require(self.s6, "s6")?,
                    s8: require(self.s8, "s8")?,
                    a1: require(self.a1, "a1")?,
                    a2: require(self.a2, "a2")?,
                };
                non_negative("s6", damping.s6)?;
                non_negative("s8", damping.s8)?;
                non_negative("a1", damping.a1)?;
                non_negative("a2", damping.a2)?;
                if damping.a1 == 0.0 && damping.a2 == 0.0 {
                    return Err(Error::InvalidParameter {
                        name: "a2",
                        value: damping.a2,
                    });
                }
                Ok(Damping::Rational(damping))
            }
            DampingScheme::Zero => {
                let damping = ZeroDamping {
                    s6: require(self.s6, "s6")?,
                    s8: require(self.s8, "s8")?,
                    rs6: require(self.rs6, "rs6")?,
                    rs8: require(self.rs8, "rs8")?,
                    alp: require(self.alp, "alp")?,
                };
                non_negative("s6", damping.s6)?;
                non_negative("s8", damping.s8)?;
                positive("rs6", damping.rs6)?;
                positive("rs8", damping.rs8)?;
                positive("alp", damping.alp)?;
                Ok(Damping::Zero(damping))
            }
        }
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter { name, value })
    }
}

/// Rational (Becke–Johnson) damping parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RationalDamping {
    pub s6: f64,
    pub s8: f64,
    pub a1: f64,
    /// Offset of the critical radius in Bohr.
    pub a2: f64,
}

/// Zero-damping parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeroDamping {
    pub s6: f64,
    pub s8: f64,
    pub rs6: f64,
    pub rs8: f64,
    /// Exponent of the C6 damping term; the C8 term uses `alp + 2`.
    pub alp: f64,
}

/// A damping function with a complete, validated parameter set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Damping {
    Rational(RationalDamping),
    Zero(ZeroDamping),
}

impl Damping {
    pub fn scheme(&self) -> DampingScheme {
        match self {
            Damping::Rational(_) => DampingScheme::Rational,
            Damping::Zero(_) => DampingScheme::Zero,
        }
    }

    /// Parameters of a named functional, resolved for `scheme`.
    pub fn for_functional(functional: &str, scheme: DampingScheme) -> Result<Self, Error> {
        ParameterSet::preset(functional, scheme)?.resolve(scheme)
    }
}

/// Onset and cutoff radii of the two switching envelopes (Bohr).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RealspaceCutoff {
    pub cn_onset: f64,
    pub cn_cutoff: f64,
    pub disp_onset: f64,
    pub disp_cutoff: f64,
}

impl Default for RealspaceCutoff {
    fn default() -> Self {
        Self {
            cn_onset: 20.0,
            cn_cutoff: 25.0,
            disp_onset: 55.0,
            disp_cutoff: 60.0,
        }
    }
}

impl RealspaceCutoff {
    pub fn coordination(&self) -> Result<Switching, Error> {
        Switching::new(self.cn_onset, self.cn_cutoff)
    }

    pub fn dispersion(&self) -> Result<Switching, Error> {
        Switching::new(self.disp_onset, self.disp_cutoff)
    }
}

/// Tunable constants of the coordination number and weighting model.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConstants {
    /// Steepness `k` of the counting function.
    pub steepness: f64,
    /// Spread factor of the Gaussian reference weights.
    pub weighting: f64,
}

impl Default for ModelConstants {
    fn default() -> Self {
        Self {
            steepness: DEFAULT_STEEPNESS,
            weighting: DEFAULT_WEIGHTING,
        }
    }
}

impl ModelConstants {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        positive("steepness", self.steepness)?;
        positive("weighting", self.weighting)
    }
}

/// Main configuration for dispersion evaluation.
///
/// # Examples
///
/// ```
/// use d3_forge::{Damping, DampingScheme, DispersionConfig, RealspaceCutoff};
///
/// let damping = Damping::for_functional("b3lyp", DampingScheme::Zero).unwrap();
/// let config = DispersionConfig {
///     cutoff: RealspaceCutoff { disp_onset: 40.0, disp_cutoff: 45.0, ..Default::default() },
///     ..DispersionConfig::new(damping)
/// };
/// assert_eq!(config.damping.scheme(), DampingScheme::Zero);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersionConfig {
    pub damping: Damping,
    pub cutoff: RealspaceCutoff,
    pub model: ModelConstants,
}

impl DispersionConfig {
    /// Configuration with default cutoffs and model constants.
    pub fn new(damping: Damping) -> Self {
        Self {
            damping,
            cutoff: RealspaceCutoff::default(),
            model: ModelConstants::default(),
        }
    }

    /// Reads a configuration file and resolves it.
    ///
    /// `overrides` are layered on top of the file's damping parameters, and
    /// `scheme` replaces the file's scheme when given.
    ///
    /// ```toml
    /// [damping]
    /// scheme = "rational"
    /// functional = "pbe0"
    /// s8 = 1.2
    ///
    /// [cutoff]
    /// disp_cutoff = 50.0
    ///
    /// [model]
    /// steepness = 16.0
    /// ```
    pub fn from_toml(
        content: &str,
        scheme: Option<DampingScheme>,
        overrides: &ParameterSet,
    ) -> Result<Self, Error> {
        ConfigFile::from_toml(content)?.resolve(scheme, overrides)
    }
}

/// Serialized configuration layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub damping: DampingSection,
    #[serde(default)]
    pub cutoff: RealspaceCutoff,
    #[serde(default)]
    pub model: ModelConstants,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DampingSection {
    #[serde(default)]
    pub scheme: Option<DampingScheme>,
    #[serde(default)]
    pub functional: Option<String>,
    #[serde(flatten)]
    pub parameters: ParameterSet,
}

impl ConfigFile {
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(Error::ConfigParse)
    }

    pub fn resolve(
        &self,
        scheme: Option<DampingScheme>,
        overrides: &ParameterSet,
    ) -> Result<DispersionConfig, Error> {
        let scheme = scheme.or(self.damping.scheme).unwrap_or_default();
        let base = match &self.damping.functional {
            Some(name) => ParameterSet::preset(name, scheme)?,
            None => ParameterSet::default(),
        };
        let damping = base
            .merge(&self.damping.parameters)
            .merge(overrides)
            .resolve(scheme)?;

        self.cutoff.coordination()?;
        self.cutoff.dispersion()?;
        self.model.validate()?;

        Ok(DispersionConfig {
            damping,
            cutoff: self.cutoff,
            model: self.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> ParameterSet {
        ParameterSet {
            s6: Some(1.0),
            s8: Some(0.7875),
            a1: Some(0.4289),
            a2: Some(4.4407),
            rs6: Some(1.217),
            rs8: Some(1.0),
            alp: Some(14.0),
        }
    }

    #[test]
    fn default_config_values() {
        let cutoff = RealspaceCutoff::default();
        assert_eq!((cutoff.cn_onset, cutoff.cn_cutoff), (20.0, 25.0));
        assert_eq!((cutoff.disp_onset, cutoff.disp_cutoff), (55.0, 60.0));
        let model = ModelConstants::default();
        assert_eq!(model.steepness, 16.0);
        assert_eq!(model.weighting, 4.0);
        assert_eq!(DampingScheme::default(), DampingScheme::Rational);
    }

    #[test]
    fn scheme_parses_names() {
        assert_eq!("BJ".parse::<DampingScheme>(), Ok(DampingScheme::Rational));
        assert_eq!("zero".parse::<DampingScheme>(), Ok(DampingScheme::Zero));
        assert!("mbj".parse::<DampingScheme>().is_err());
        assert_eq!(DampingScheme::Zero.to_string(), "zero");
    }

    #[test]
    fn resolve_picks_scheme_parameters() {
        let set = full();
        match set.resolve(DampingScheme::Rational).unwrap() {
            Damping::Rational(p) => assert_eq!((p.a1, p.a2), (0.4289, 4.4407)),
            other => panic!("unexpected damping {:?}", other),
        }
        match set.resolve(DampingScheme::Zero).unwrap() {
            Damping::Zero(p) => assert_eq!((p.rs6, p.alp), (1.217, 14.0)),
            other => panic!("unexpected damping {:?}", other),
        }
    }

    #[test]
    fn missing_parameters_are_named() {
        let set = ParameterSet {
            a1: None,
            ..full()
        };
        match set.resolve(DampingScheme::Rational) {
            Err(Error::MissingParameter { scheme, name }) => {
                assert_eq!(scheme, "rational");
                assert_eq!(name, "a1");
            }
            other => panic!("unexpected result {:?}", other),
        }
        // the zero scheme does not need a1
        assert!(set.resolve(DampingScheme::Zero).is_ok());

        let empty = ParameterSet::default();
        assert!(matches!(
            empty.resolve(DampingScheme::Zero),
            Err(Error::MissingParameter { name: "s6", .. })
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let negative = ParameterSet {
            s8: Some(-1.0),
            ..full()
        };
        assert!(matches!(
            negative.resolve(DampingScheme::Rational),
            Err(Error::InvalidParameter { name: "s8", .. })
        ));
        let zero_alp = ParameterSet {
            alp: Some(0.0),
            ..full()
        };
        assert!(matches!(
            zero_alp.resolve(DampingScheme::Zero),
            Err(Error::InvalidParameter { name: "alp", .. })
        ));
        let degenerate = ParameterSet {
            a1: Some(0.0),
            a2: Some(0.0),
            ..full()
        };
        assert!(degenerate.resolve(DampingScheme::Rational).is_err());
    }

    #[test]
    fn merge_prefers_explicit_values() {
        let base = full();
        let merged = base.merge(&ParameterSet {
            s8: Some(2.0),
            ..Default::default()
        });
        assert_eq!(merged.s8, Some(2.0));
        assert_eq!(merged.a1, base.a1);
    }

    #[test]
    fn config_file_layers_preset_file_and_overrides() {
        let content = r#"
            [damping]
            scheme = "bj"
            functional = "pbe"
            s8 = 1.5

            [cutoff]
            disp_onset = 40.0
            disp_cutoff = 45.0
        "#;
        let overrides = ParameterSet {
            a2: Some(5.0),
            ..Default::default()
        };
        let config = DispersionConfig::from_toml(content, None, &overrides).unwrap();
        match config.damping {
            Damping::Rational(p) => {
                assert_eq!(p.s8, 1.5);
                assert_eq!(p.a2, 5.0);
                assert_eq!(p.a1, 0.4289);
            }
            other => panic!("unexpected damping {:?}", other),
        }
        assert_eq!(config.cutoff.disp_cutoff, 45.0);
        assert_eq!(config.cutoff.cn_cutoff, 25.0);
        assert_eq!(config.model, ModelConstants::default());
    }

    #[test]
    fn config_file_errors() {
        let bad_cutoff = "[cutoff]\ncn_onset = 30.0\n";
        assert!(matches!(
            DispersionConfig::from_toml(bad_cutoff, None, &full()),
            Err(Error::InvalidCutoff { .. })
        ));
        assert!(matches!(
            DispersionConfig::from_toml("[model]\nsteepness = 'x'\n", None, &full()),
            Err(Error::ConfigParse(_))
        ));
        assert!(matches!(
            DispersionConfig::from_toml("[damping]\nfunctional = 'nope'\n", None, &full()),
            Err(Error::UnknownFunctional(_))
        ));
        assert!(matches!(
            DispersionConfig::from_toml("", Some(DampingScheme::Zero), &ParameterSet::default()),
            Err(Error::MissingParameter { .. })
        ));
    }
}
