use crate::core::cast::cast;
use crate::core::casing::Casing;
use crate::core::codec;
use crate::domain::collection::PropertyCollection;
use crate::domain::ports::Schema;
use crate::domain::property::PropertyInfo;
use crate::domain::value::{RawMap, Value};
use crate::utils::error::{ModelError, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

static NULL: Value = Value::Null;

/// One instance of a declared-property model.
///
/// The value store holds exactly one slot per declared property, in
/// declaration order, so undeclared keys can never be created.
#[derive(Clone)]
pub struct Model {
    properties: Arc<PropertyCollection>,
    values: Vec<Value>,
}

impl Model {
    /// Builds an instance from a raw mapping.
    ///
    /// Each property is looked up by its declared name, then by its snake_case
    /// alternate. Missing properties take their default; only values that
    /// cannot be cast fail the construction.
    pub fn from_raw(properties: Arc<PropertyCollection>, mut raw: RawMap) -> Result<Self> {
        let mut values = Vec::with_capacity(properties.count());
        for info in properties.iter() {
            let found = raw
                .shift_remove(info.name())
                .or_else(|| raw.shift_remove(info.alternate_name()));
            values.push(cast(found, info)?);
        }

        if !raw.is_empty() {
            tracing::debug!(
                "Ignoring {} undeclared keys while building '{}'",
                raw.len(),
                properties.name()
            );
        }

        Ok(Self { properties, values })
    }

    /// Builds an instance from decoded JSON, which must be an object.
    pub fn from_json(properties: Arc<PropertyCollection>, json: serde_json::Value) -> Result<Self> {
        match Value::from(json) {
            Value::Map(raw) => Self::from_raw(properties, raw),
            other => Err(ModelError::invalid_cast(
                properties.name(),
                "object",
                other.to_string(),
            )),
        }
    }

    /// Assembles an instance whose values are already cast, one per property.
    pub(crate) fn from_parts(properties: Arc<PropertyCollection>, values: Vec<Value>) -> Self {
        debug_assert_eq!(properties.count(), values.len());
        Self { properties, values }
    }

    pub fn type_name(&self) -> &str {
        self.properties.name()
    }

    pub fn is<T: Schema>(&self) -> bool {
        self.type_name() == T::NAME
    }

    /// Wraps this instance in its typed form when the type names match.
    pub fn into_typed<T: Schema>(self) -> Option<T> {
        self.is::<T>().then(|| T::from_model(self))
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &Arc<PropertyCollection> {
        &self.properties
    }

    /// Declared properties paired with their current values.
    pub fn values(&self) -> impl Iterator<Item = (&PropertyInfo, &Value)> {
        self.properties.iter().zip(self.values.iter())
    }

    /// Current value of a declared property; `None` for undeclared names.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties
            .position(name)
            .map(|index| &self.values[index])
    }

    /// Casts and stores `value`. Writing an undeclared name is a no-op.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let Some(index) = self.properties.position(name) else {
            tracing::debug!("Ignoring write to undeclared '{}' on '{}'", name, self.type_name());
            return Ok(());
        };
        let info = &self.properties.all()[index];
        self.values[index] = cast(Some(value.into()), info)?;
        Ok(())
    }

    /// Resets a declared property to its default. Undeclared names are ignored.
    pub fn unset(&mut self, name: &str) {
        if let Some(index) = self.properties.position(name) {
            self.values[index] = self.properties.all()[index].default_value().clone();
        }
    }

    pub fn to_array(&self, casing: Casing) -> serde_json::Map<String, serde_json::Value> {
        self.values()
            .map(|(info, value)| (casing.key(info).to_string(), render(value, casing)))
            .collect()
    }

    pub fn to_json(&self, casing: Casing) -> Result<String> {
        Ok(serde_json::to_string(&self.to_array(casing))?)
    }

    pub fn to_json_pretty(&self, casing: Casing) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_array(casing))?)
    }

    /// Human readable rendering for logs: compact JSON with default casing.
    pub fn to_text(&self) -> String {
        serde_json::Value::Object(self.to_array(Casing::default())).to_string()
    }

    /// Encodes the whole value store into a versioned blob.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        codec::encode(self)
    }

    /// Restores an instance of any registered type from a blob.
    pub fn deserialize(blob: &[u8]) -> Result<Self> {
        codec::decode(blob)
    }
}

fn render(value: &Value, casing: Casing) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::DateTime(dt) => serde_json::Value::String(Value::format_datetime(dt)),
        Value::List(items) => {
            serde_json::Value::Array(items.iter().map(|item| render(item, casing)).collect())
        }
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), render(item, casing)))
                .collect(),
        ),
        Value::Model(model) => serde_json::Value::Object(model.to_array(casing)),
    }
}

impl<'a> Index<&'a str> for Model {
    type Output = Value;

    /// Bracket read; undeclared names read as `Value::Null`.
    fn index(&self, name: &'a str) -> &Value {
        self.get(name).unwrap_or(&NULL)
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.values == other.values
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.type_name());
        for (info, value) in self.values() {
            out.field(info.name(), value);
        }
        out.finish()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_array(Casing::default()).serialize(serializer)
    }
}
