use crate::domain::property::PropertyInfo;
use crate::utils::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key rendering policy for `to_array` / `to_json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casing {
    /// `stockLevel` is rendered as `stock_level`.
    #[default]
    #[serde(alias = "underscore")]
    Snake,
    /// Keys are rendered exactly as declared.
    #[serde(alias = "declared")]
    AsDeclared,
}

impl Casing {
    pub fn key<'a>(&self, info: &'a PropertyInfo) -> &'a str {
        match self {
            Casing::Snake => info.alternate_name(),
            Casing::AsDeclared => info.name(),
        }
    }
}

impl fmt::Display for Casing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Casing::Snake => write!(f, "snake"),
            Casing::AsDeclared => write!(f, "as_declared"),
        }
    }
}

impl FromStr for Casing {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "snake" | "snake_case" | "underscore" => Ok(Casing::Snake),
            "as_declared" | "declared" | "none" => Ok(Casing::AsDeclared),
            other => Err(ModelError::ConfigError {
                message: format!(
                    "Unknown casing '{}'. Valid values: snake, as_declared",
                    other
                ),
            }),
        }
    }
}
