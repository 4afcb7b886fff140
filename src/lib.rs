pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::{CliConfig, OutputFormat};

pub use crate::config::schema_config::SchemaConfig;
pub use crate::core::{cast::cast, casing::Casing, model::Model};
pub use crate::domain::{
    collection::PropertyCollection,
    ports::Schema,
    property::{ModelRef, PropertyInfo, PropertyKind},
    value::{RawMap, Value},
};
pub use crate::utils::error::{ModelError, Result};
