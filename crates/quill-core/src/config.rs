use crate::errors::CompilationError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

bitflags! {
    /// Individual optimizer rewrites, combinable with `|`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OptimizationFlags: u8 {
        const NONE = 0b0000;
        /// Fold constant-string prints and hoist block/parent output
        const PRINT = 0b0001;
        /// Only build loop metadata for loops that use it
        const FOR = 0b0010;
        /// Drop `raw` filters once escaping has been decided
        const RAW_FILTER = 0b0100;
        /// Merge sibling text nodes
        const TEXT_NODES = 0b1000;
    }
}

impl OptimizationFlags {
    /// Spelling of each flag in configuration files
    const CONFIG_NAMES: [(Self, &'static str); 4] = [
        (Self::PRINT, "print"),
        (Self::FOR, "for"),
        (Self::RAW_FILTER, "raw_filter"),
        (Self::TEXT_NODES, "text_nodes"),
    ];

    pub fn from_config_name(name: &str) -> Option<Self> {
        Self::CONFIG_NAMES
            .iter()
            .find(|(_, config_name)| *config_name == name)
            .map(|(flag, _)| *flag)
    }

    pub fn config_names(self) -> Vec<&'static str> {
        Self::CONFIG_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

/// The set of rewrites the optimizer applies.
///
/// `All` also covers rewrites added after a configuration was written, which
/// is what the `-1` mask means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Optimizations {
    #[default]
    All,
    Only(OptimizationFlags),
}

impl Optimizations {
    pub const ALL_MASK: i64 = -1;

    pub const NONE: Self = Optimizations::Only(OptimizationFlags::NONE);

    /// Validate an integer mask
    pub fn from_mask(mask: i64) -> Result<Self, CompilationError> {
        if mask == Self::ALL_MASK {
            return Ok(Optimizations::All);
        }
        u8::try_from(mask)
            .ok()
            .and_then(OptimizationFlags::from_bits)
            .map(Optimizations::Only)
            .ok_or(CompilationError::InvalidOptimizations(mask))
    }

    pub fn mask(self) -> i64 {
        match self {
            Optimizations::All => Self::ALL_MASK,
            Optimizations::Only(flags) => i64::from(flags.bits()),
        }
    }

    /// Whether `flag` is enabled. Asking about `OptimizationFlags::NONE` is always true.
    pub fn is_enabled(self, flag: OptimizationFlags) -> bool {
        match self {
            Optimizations::All => true,
            Optimizations::Only(flags) => flags.contains(flag),
        }
    }

    pub fn is_none(self) -> bool {
        matches!(self, Optimizations::Only(flags) if flags.is_empty())
    }
}

impl From<OptimizationFlags> for Optimizations {
    fn from(flags: OptimizationFlags) -> Self {
        Optimizations::Only(flags)
    }
}

impl fmt::Display for Optimizations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Optimizations::All => write!(f, "all"),
            Optimizations::Only(flags) if flags.is_empty() => write!(f, "none"),
            Optimizations::Only(flags) => write!(f, "{}", flags.config_names().join("|")),
        }
    }
}

/// How optimizations are written in a configuration file: a raw mask,
/// `"all"`/`"none"`/a single flag name, or a list of flag names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptimizationsSetting {
    Mask(i64),
    Named(String),
    List(Vec<String>),
}

impl Default for OptimizationsSetting {
    fn default() -> Self {
        OptimizationsSetting::Named("all".to_string())
    }
}

impl TryFrom<&OptimizationsSetting> for Optimizations {
    type Error = CompilationError;

    fn try_from(setting: &OptimizationsSetting) -> Result<Self, Self::Error> {
        match setting {
            OptimizationsSetting::Mask(mask) => Optimizations::from_mask(*mask),
            OptimizationsSetting::Named(name) => match name.as_str() {
                "all" => Ok(Optimizations::All),
                "none" => Ok(Optimizations::NONE),
                other => OptimizationFlags::from_config_name(other)
                    .map(Optimizations::Only)
                    .ok_or_else(|| CompilationError::UnknownOptimization(other.to_string())),
            },
            OptimizationsSetting::List(names) => {
                let mut flags = OptimizationFlags::NONE;
                for name in names {
                    flags |= OptimizationFlags::from_config_name(name)
                        .ok_or_else(|| CompilationError::UnknownOptimization(name.clone()))?;
                }
                Ok(Optimizations::Only(flags))
            }
        }
    }
}

impl From<Optimizations> for OptimizationsSetting {
    fn from(optimizations: Optimizations) -> Self {
        match optimizations {
            Optimizations::All => OptimizationsSetting::Named("all".to_string()),
            Optimizations::Only(flags) if flags.is_empty() => {
                OptimizationsSetting::Named("none".to_string())
            }
            Optimizations::Only(flags) => OptimizationsSetting::List(
                flags.config_names().into_iter().map(String::from).collect(),
            ),
        }
    }
}

/// Options that shape how an [`Environment`](crate::Environment) compiles templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentOptions {
    /// Optimizer rewrites to apply (default: all)
    #[serde(default)]
    pub optimizations: OptimizationsSetting,
}

impl EnvironmentOptions {
    pub fn with_optimizations(optimizations: Optimizations) -> Self {
        Self {
            optimizations: optimizations.into(),
        }
    }

    pub fn optimizations(&self) -> Result<Optimizations, CompilationError> {
        Optimizations::try_from(&self.optimizations)
    }
}

/// Main configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuillConfig {
    #[serde(default)]
    pub environment: EnvironmentOptions,
}

impl QuillConfig {
    /// Load configuration from a YAML (`.yaml`/`.yml`) or JSON file
    pub fn from_file(path: &Path) -> Result<Self, CompilationError> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            serde_yaml::from_str(&content)
                .map_err(|e| CompilationError::ConfigError(e.to_string()))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| CompilationError::ConfigError(e.to_string()))?
        };
        Ok(config)
    }

    /// Write the default configuration as YAML
    pub fn init_file(path: &Path) -> Result<(), CompilationError> {
        let yaml = serde_yaml::to_string(&QuillConfig::default())
            .map_err(|e| CompilationError::ConfigError(e.to_string()))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}
