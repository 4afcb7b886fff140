use crate::core::model::Model;
use chrono::{DateTime, FixedOffset, Utc};
use indexmap::IndexMap;
use std::fmt;

/// Raw input mapping handed to model construction. Keeps insertion order.
pub type RawMap = IndexMap<String, Value>;

/// Display format for date-time values: millisecond precision, explicit offset.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// A dynamically typed property value.
///
/// Raw input decoded from JSON converts into `Value` losslessly; the cast
/// engine then narrows it to the kind a property declares.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(DateTime<FixedOffset>),
    List(Vec<Value>),
    Map(RawMap),
    Model(Box<Model>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&RawMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Value::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Short name of the variant, used in cast diagnostics.
    pub fn type_label(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Model(_) => "model",
        }
    }

    /// Renders a date-time in the display format used by `to_array`/`to_json`.
    pub fn format_datetime(dt: &DateTime<FixedOffset>) -> String {
        dt.format(DATETIME_FORMAT).to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::DateTime(dt) => write!(f, "{}", Value::format_datetime(dt)),
            Value::List(items) => write!(f, "list of {} items", items.len()),
            Value::Map(map) => write!(f, "map of {} entries", map.len()),
            Value::Model(model) => write!(f, "{} model", model.type_name()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                // u64 beyond i64::MAX and real numbers both land here
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Map(
                obj.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::DateTime(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value.fixed_offset())
    }
}

impl From<Model> for Value {
    fn from(value: Model) -> Self {
        Value::Model(Box::new(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<RawMap> for Value {
    fn from(value: RawMap) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_json_keeps_integer_and_float_apart() {
        let value = Value::from(serde_json::json!({"count": 4, "ratio": 0.5, "tags": ["a"]}));
        let map = value.as_map().unwrap();

        assert_eq!(map.get("count"), Some(&Value::Int(4)));
        assert_eq!(map.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(
            map.get("tags"),
            Some(&Value::List(vec![Value::Text("a".to_string())]))
        );
    }

    #[test]
    fn test_map_keeps_input_key_order() {
        let value = Value::from(serde_json::json!({"zebra": 1, "apple": 2, "mango": 3}));
        let keys: Vec<&str> = value.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_format_datetime_uses_milliseconds_and_offset() {
        let dt = Utc
            .with_ymd_and_hms(2019, 3, 20, 8, 30, 31)
            .unwrap()
            .fixed_offset()
            + chrono::Duration::milliseconds(461);

        assert_eq!(Value::format_datetime(&dt), "2019-03-20T08:30:31.461+00:00");
    }

    #[test]
    fn test_option_none_becomes_null() {
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
    }
}
