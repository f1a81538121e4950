use crate::store::VariableStore;
use crate::value::Value;

pub const MATH_PI: f64 = 3.14159265358979323846;
pub const MATH_TAU: f64 = 6.28318530717958647692;
pub const MATH_E: f64 = 2.71828182845904523536;
pub const MATH_GOLDEN_RATIO: f64 = 1.61803398874989484820;
pub const MATH_SILVER_RATIO: f64 = 2.41421356237309504880;
pub const MATH_SUPERGOLDEN_RATIO: f64 = 1.46557123187676802665;
/// Metres per second.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
/// Kilometres per hour.
pub const SPEED_OF_LIGHT_KMH: f64 = 1_080_000_000.0;
/// Miles per second.
pub const SPEED_OF_LIGHT_MIH: f64 = 186_000.0;
/// N·m²/kg².
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-11;
/// dyn·cm²/g².
pub const GRAVITATIONAL_CONSTANT_DYN: f64 = 6.67430e-8;

const CONSTANTS: &[(&str, f64)] = &[
    ("pi", MATH_PI),
    ("π", MATH_PI),
    ("tau", MATH_TAU),
    ("τ", MATH_TAU),
    ("e", MATH_E),
    ("goldenRatio", MATH_GOLDEN_RATIO),
    ("silverRatio", MATH_SILVER_RATIO),
    ("supergoldenRatio", MATH_SUPERGOLDEN_RATIO),
    ("speedOfLight", SPEED_OF_LIGHT),
    ("speedOfLight.kmh", SPEED_OF_LIGHT_KMH),
    ("speedOfLight.mih", SPEED_OF_LIGHT_MIH),
    ("gravitationalConstant", GRAVITATIONAL_CONSTANT),
    ("gravitationalConstant.dyncm2g2", GRAVITATIONAL_CONSTANT_DYN),
];

/// Reserved names always win over variables of the same name.
pub fn resolve_constant(name: &str) -> Option<f64> {
    CONSTANTS
        .iter()
        .find(|(constant, _)| *constant == name)
        .map(|(_, value)| *value)
}

pub fn is_reserved(name: &str) -> bool {
    resolve_constant(name).is_some() || matches!(name, "true" | "false")
}

pub fn resolve_variable<'s>(name: &str, vars: &'s VariableStore) -> Option<&'s Value> {
    vars.lookup(name)
}
