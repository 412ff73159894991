use std::fmt;
use std::str::FromStr;

use crate::names;
use crate::ToolkitError;

/// Toolkit-level tolerance for k-means and Gaussian mixture fits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ToleranceConfig {
    /// Library defaults apply.
    #[default]
    None,
    Fixed(f64),
}

impl ToleranceConfig {
    pub fn value(self) -> Option<f64> {
        match self {
            ToleranceConfig::None => None,
            ToleranceConfig::Fixed(tol) => Some(tol),
        }
    }
}

impl From<f64> for ToleranceConfig {
    fn from(tol: f64) -> Self {
        ToleranceConfig::Fixed(tol)
    }
}

impl From<Option<f64>> for ToleranceConfig {
    fn from(tol: Option<f64>) -> Self {
        tol.map_or(ToleranceConfig::None, ToleranceConfig::Fixed)
    }
}

/// Accepts anything `f64` parses, surrounding whitespace ignored. NaN is
/// rejected because no fit can converge against it.
impl FromStr for ToleranceConfig {
    type Err = ToolkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<f64>() {
            Ok(tol) if !tol.is_nan() => Ok(ToleranceConfig::Fixed(tol)),
            _ => Err(ToolkitError::InvalidTolerance(s.to_string())),
        }
    }
}

/// Which toolkit a [`crate::Toolkit`] presents itself as.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Variant {
    /// Library defaults; tolerance is never overridden.
    #[default]
    Default,
    /// Tolerance fixed when the toolkit is built.
    Tolerance(ToleranceConfig),
    /// Reserved. Every algorithm operation fails with
    /// [`ToolkitError::Unsupported`].
    Fast,
}

impl Variant {
    /// Resolves a registry name. The tolerance is used only by
    /// [`names::TOOLKIT_TOLERANCE`].
    pub fn from_name(name: &str, tolerance: ToleranceConfig) -> Result<Self, ToolkitError> {
        match name {
            names::TOOLKIT_VANILLA => Ok(Variant::Default),
            names::TOOLKIT_TOLERANCE => Ok(Variant::Tolerance(tolerance)),
            names::TOOLKIT_FAST => Ok(Variant::Fast),
            other => Err(ToolkitError::UnknownToolkit(other.to_string())),
        }
    }

    pub fn toolkit_name(self) -> &'static str {
        match self {
            Variant::Default => names::TOOLKIT_VANILLA,
            Variant::Tolerance(_) => names::TOOLKIT_TOLERANCE,
            Variant::Fast => names::TOOLKIT_FAST,
        }
    }

    pub fn tolerance(self) -> Option<f64> {
        match self {
            Variant::Tolerance(tol) => tol.value(),
            Variant::Default | Variant::Fast => None,
        }
    }

    pub fn is_implemented(self) -> bool {
        !matches!(self, Variant::Fast)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.toolkit_name())
    }
}
