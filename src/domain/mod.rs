// Domain layer: property metadata, dynamic values and the schema port.

pub mod collection;
pub mod ports;
pub mod property;
pub mod value;
