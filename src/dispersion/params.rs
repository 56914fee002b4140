use super::config::{DampingScheme, ParameterSet};
use super::error::Error;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

const FUNCTIONALS_TOML: &str = include_str!("../../resources/functionals.toml");

static FUNCTIONALS: OnceLock<FunctionalPresets> = OnceLock::new();

/// Damping parameters per functional, one table per damping scheme.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionalPresets {
    #[serde(default)]
    pub rational: BTreeMap<String, ParameterSet>,
    #[serde(default)]
    pub zero: BTreeMap<String, ParameterSet>,
}

impl FunctionalPresets {
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(Error::ConfigParse)
    }

    pub fn table(&self, scheme: DampingScheme) -> &BTreeMap<String, ParameterSet> {
        match scheme {
            DampingScheme::Rational => &self.rational,
            DampingScheme::Zero => &self.zero,
        }
    }

    pub fn get(&self, functional: &str, scheme: DampingScheme) -> Result<ParameterSet, Error> {
        self.table(scheme)
            .get(&normalize(functional))
            .copied()
            .ok_or_else(|| Error::UnknownFunctional(functional.to_string()))
    }
}

pub fn functionals() -> &'static FunctionalPresets {
    FUNCTIONALS.get_or_init(|| {
        FunctionalPresets::from_toml(FUNCTIONALS_TOML)
            .expect("Failed to parse embedded functional presets. This is a library bug.")
    })
}

pub fn lookup(functional: &str, scheme: DampingScheme) -> Result<ParameterSet, Error> {
    functionals().get(functional, scheme)
}

/// Names with presets for `scheme`, sorted.
pub fn available(scheme: DampingScheme) -> impl Iterator<Item = &'static str> {
    functionals().table(scheme).keys().map(String::as_str)
}

// "B97-D", "b97d" and "b97_d" name the same functional.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}
