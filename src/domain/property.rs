use crate::core::registry;
use crate::domain::collection::PropertyCollection;
use crate::domain::ports::Schema;
use crate::domain::value::Value;
use crate::utils::error::{ModelError, Result};
use convert_case::{Boundary, Case, Casing};
use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

type CollectionLoader = fn() -> Result<Arc<PropertyCollection>>;

/// Word breaks for the snake_case alternate. Digits stay attached, so
/// `address1` keeps its spelling.
const SNAKE_BOUNDARIES: &[Boundary] = &[
    Boundary::Underscore,
    Boundary::LowerUpper,
    Boundary::DigitUpper,
    Boundary::Acronym,
];

/// Reference from a property to the model type it nests.
///
/// Statically declared types carry a loader so the nested collection can be
/// resolved even if that type was never constructed directly. References
/// parsed from schema files resolve by name through the registry.
///
/// Two references are equal when they name the same model and, for static
/// types, the same Rust type.
#[derive(Clone)]
pub struct ModelRef {
    name: Cow<'static, str>,
    type_id: Option<TypeId>,
    loader: Option<CollectionLoader>,
}

impl ModelRef {
    pub fn of<T: Schema>() -> Self {
        Self {
            name: Cow::Borrowed(T::NAME),
            type_id: Some(TypeId::of::<T>()),
            loader: Some(registry::resolve::<T> as CollectionLoader),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            type_id: None,
            loader: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolve(&self) -> Result<Arc<PropertyCollection>> {
        match self.loader {
            Some(load) => load(),
            None => registry::lookup(&self.name)
                .ok_or_else(|| ModelError::schema(format!("Unknown model type '{}'", self.name))),
        }
    }
}

impl PartialEq for ModelRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.type_id == other.type_id
    }
}

impl Eq for ModelRef {}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelRef").field(&self.name).finish()
    }
}

/// Declared kind of a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    Int,
    Float,
    Bool,
    Text,
    DateTime,
    Model(ModelRef),
    Models(ModelRef),
    Any,
}

impl PropertyKind {
    pub fn model<T: Schema>() -> Self {
        PropertyKind::Model(ModelRef::of::<T>())
    }

    pub fn models<T: Schema>() -> Self {
        PropertyKind::Models(ModelRef::of::<T>())
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            PropertyKind::Int | PropertyKind::Float | PropertyKind::Bool | PropertyKind::Text
        )
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, PropertyKind::Model(_) | PropertyKind::Models(_))
    }

    pub fn model_ref(&self) -> Option<&ModelRef> {
        match self {
            PropertyKind::Model(r) | PropertyKind::Models(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::Int => write!(f, "int"),
            PropertyKind::Float => write!(f, "float"),
            PropertyKind::Bool => write!(f, "bool"),
            PropertyKind::Text => write!(f, "string"),
            PropertyKind::DateTime => write!(f, "datetime"),
            PropertyKind::Model(r) => write!(f, "{}", r.name()),
            PropertyKind::Models(r) => write!(f, "{}[]", r.name()),
            PropertyKind::Any => write!(f, "any"),
        }
    }
}

impl FromStr for PropertyKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let kind = match trimmed.to_ascii_lowercase().as_str() {
            "int" | "integer" => PropertyKind::Int,
            "float" | "double" => PropertyKind::Float,
            "bool" | "boolean" => PropertyKind::Bool,
            "string" | "text" => PropertyKind::Text,
            "datetime" | "date" => PropertyKind::DateTime,
            "any" | "mixed" => PropertyKind::Any,
            _ => {
                let (name, many) = match trimmed.strip_suffix("[]") {
                    Some(name) => (name.trim(), true),
                    None => (trimmed, false),
                };
                if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    return Err(ModelError::schema(format!("Invalid property type '{}'", s)));
                }
                if many {
                    PropertyKind::Models(ModelRef::named(name))
                } else {
                    PropertyKind::Model(ModelRef::named(name))
                }
            }
        };
        Ok(kind)
    }
}

/// Immutable descriptor of one declared property.
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    name: String,
    alternate_name: String,
    kind: PropertyKind,
    default: Value,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, kind: PropertyKind, default: impl Into<Value>) -> Self {
        let name = name.into();
        let mut default = default.into();
        if default.is_null() && matches!(kind, PropertyKind::Models(_)) {
            default = Value::List(Vec::new());
        }
        Self {
            alternate_name: name.set_boundaries(SNAKE_BOUNDARIES).to_case(Case::Snake),
            name,
            kind,
            default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The snake_case spelling of the name, used as lookup fallback on
    /// construction and as the key under `Casing::Snake`.
    pub fn alternate_name(&self) -> &str {
        &self.alternate_name
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }
}

impl PartialEq for PropertyInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl Eq for PropertyInfo {}
