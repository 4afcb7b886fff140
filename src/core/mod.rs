pub mod cast;
pub mod casing;
pub mod codec;
pub mod model;
pub mod registry;

pub use crate::domain::collection::PropertyCollection;
pub use crate::domain::ports::Schema;
pub use crate::domain::property::{ModelRef, PropertyInfo, PropertyKind};
pub use crate::domain::value::{RawMap, Value};
pub use crate::utils::error::Result;
