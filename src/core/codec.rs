//! Versioned blob encoding of a model's full value store.
//!
//! The blob is a JSON envelope carrying a format marker and version. Values
//! are adjacently tagged so every variant survives the trip: floats travel as
//! their IEEE-754 bit pattern and date-times as RFC 3339 with nanoseconds and
//! their original offset. Decoding either yields a complete instance or fails.

use crate::core::cast::parse_datetime;
use crate::core::model::Model;
use crate::core::registry;
use crate::domain::collection::PropertyCollection;
use crate::domain::property::{ModelRef, PropertyInfo, PropertyKind};
use crate::domain::value::Value;
use crate::utils::error::{ModelError, Result};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

pub const FORMAT: &str = "model-cast";
pub const VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    format: String,
    version: u32,
    model: EncodedModel,
}

#[derive(Debug, Serialize, Deserialize)]
struct EncodedModel {
    #[serde(rename = "type")]
    type_name: String,
    values: Vec<(String, Encoded)>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "t", content = "v", rename_all = "snake_case")]
enum Encoded {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Text(String),
    DateTime(String),
    List(Vec<Encoded>),
    Map(Vec<(String, Encoded)>),
    Model(EncodedModel),
}

pub fn encode(model: &Model) -> Result<Vec<u8>> {
    let envelope = Envelope {
        format: FORMAT.to_string(),
        version: VERSION,
        model: encode_model(model),
    };
    Ok(serde_json::to_vec(&envelope)?)
}

fn encode_model(model: &Model) -> EncodedModel {
    EncodedModel {
        type_name: model.type_name().to_string(),
        values: model
            .values()
            .map(|(info, value)| (info.name().to_string(), encode_value(value)))
            .collect(),
    }
}

fn encode_value(value: &Value) -> Encoded {
    match value {
        Value::Null => Encoded::Null,
        Value::Bool(b) => Encoded::Bool(*b),
        Value::Int(i) => Encoded::Int(*i),
        Value::Float(f) => Encoded::Float(f.to_bits()),
        Value::Text(s) => Encoded::Text(s.clone()),
        Value::DateTime(dt) => {
            Encoded::DateTime(dt.to_rfc3339_opts(SecondsFormat::Nanos, false))
        }
        Value::List(items) => Encoded::List(items.iter().map(encode_value).collect()),
        Value::Map(map) => Encoded::Map(
            map.iter()
                .map(|(key, item)| (key.clone(), encode_value(item)))
                .collect(),
        ),
        Value::Model(model) => Encoded::Model(encode_model(model)),
    }
}

/// Decodes a blob, resolving its model type through the registry.
pub fn decode(blob: &[u8]) -> Result<Model> {
    let envelope = open(blob)?;
    let properties = registry::lookup(&envelope.model.type_name).ok_or_else(|| {
        reject(format!(
            "Model type '{}' is not registered",
            envelope.model.type_name
        ))
    })?;
    decode_model(envelope.model, properties)
}

/// Decodes a blob that must hold an instance of `properties`' type.
pub fn decode_as(properties: &Arc<PropertyCollection>, blob: &[u8]) -> Result<Model> {
    let envelope = open(blob)?;
    decode_model(envelope.model, Arc::clone(properties))
}

fn reject(message: impl Into<String>) -> ModelError {
    let message = message.into();
    tracing::warn!("Rejected blob: {}", message);
    ModelError::deserialization(message)
}

fn resolve(model_ref: &ModelRef) -> Result<Arc<PropertyCollection>> {
    model_ref.resolve().map_err(|e| reject(e.to_string()))
}

fn open(blob: &[u8]) -> Result<Envelope> {
    let envelope: Envelope = serde_json::from_slice(blob)
        .map_err(|e| reject(format!("Malformed blob: {}", e)))?;

    if envelope.format != FORMAT {
        return Err(reject(format!("Foreign blob format '{}'", envelope.format)));
    }
    if envelope.version != VERSION {
        return Err(reject(format!(
            "Unsupported blob version {} (expected {})",
            envelope.version, VERSION
        )));
    }
    Ok(envelope)
}

fn decode_model(encoded: EncodedModel, properties: Arc<PropertyCollection>) -> Result<Model> {
    if encoded.type_name != properties.name() {
        return Err(reject(format!(
            "Blob holds a '{}' model, expected '{}'",
            encoded.type_name,
            properties.name()
        )));
    }

    let mut slots: Vec<Option<Value>> = vec![None; properties.count()];
    let mut seen = HashSet::with_capacity(encoded.values.len());
    for (name, value) in encoded.values {
        let index = properties.position(&name).ok_or_else(|| {
            reject(format!(
                "Property '{}' is not declared on '{}'",
                name,
                properties.name()
            ))
        })?;
        if !seen.insert(index) {
            return Err(reject(format!("Property '{}' appears more than once", name)));
        }
        slots[index] = Some(decode_declared(value, &properties.all()[index])?);
    }

    let values = slots
        .into_iter()
        .zip(properties.iter())
        .map(|(slot, info)| {
            slot.ok_or_else(|| reject(format!("Property '{}' is missing", info.name())))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Model::from_parts(properties, values))
}

/// Decodes the value of a declared property and checks it fits the kind.
fn decode_declared(encoded: Encoded, info: &PropertyInfo) -> Result<Value> {
    let mismatch = |found: &str| {
        reject(format!(
            "Property '{}' declared as {} holds {}",
            info.name(),
            info.kind(),
            found
        ))
    };

    match (info.kind(), encoded) {
        (_, Encoded::Null) => Ok(Value::Null),
        (PropertyKind::Model(model_ref), Encoded::Model(nested)) => {
            decode_model(nested, resolve(model_ref)?).map(Value::from)
        }
        (PropertyKind::Model(_), other) => Err(mismatch(other.label())),
        (PropertyKind::Models(model_ref), Encoded::List(items)) => {
            let properties = resolve(model_ref)?;
            items
                .into_iter()
                .map(|item| match item {
                    Encoded::Model(nested) => {
                        decode_model(nested, Arc::clone(&properties)).map(Value::from)
                    }
                    other => Err(mismatch(other.label())),
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::List)
        }
        (PropertyKind::Models(_), other) => Err(mismatch(other.label())),
        (PropertyKind::Any, other) => decode_value(other),
        (kind, other) => {
            let value = decode_value(other)?;
            let fits = matches!(
                (kind, &value),
                (PropertyKind::Int, Value::Int(_))
                    | (PropertyKind::Float, Value::Float(_))
                    | (PropertyKind::Bool, Value::Bool(_))
                    | (PropertyKind::Text, Value::Text(_))
                    | (PropertyKind::DateTime, Value::DateTime(_))
            );
            if fits {
                Ok(value)
            } else {
                Err(mismatch(value.type_label()))
            }
        }
    }
}

/// Decodes a value with no declared kind to check against.
fn decode_value(encoded: Encoded) -> Result<Value> {
    let value = match encoded {
        Encoded::Null => Value::Null,
        Encoded::Bool(b) => Value::Bool(b),
        Encoded::Int(i) => Value::Int(i),
        Encoded::Float(bits) => Value::Float(f64::from_bits(bits)),
        Encoded::Text(s) => Value::Text(s),
        Encoded::DateTime(s) => Value::DateTime(
            parse_datetime(&s).ok_or_else(|| reject(format!("Invalid date-time '{}'", s)))?,
        ),
        Encoded::List(items) => Value::List(
            items
                .into_iter()
                .map(decode_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        Encoded::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(key, item)| decode_value(item).map(|value| (key, value)))
                .collect::<Result<_>>()?,
        ),
        Encoded::Model(nested) => {
            let properties = registry::lookup(&nested.type_name).ok_or_else(|| {
                reject(format!("Model type '{}' is not registered", nested.type_name))
            })?;
            Value::from(decode_model(nested, properties)?)
        }
    };
    Ok(value)
}

impl Encoded {
    fn label(&self) -> &'static str {
        match self {
            Encoded::Null => "null",
            Encoded::Bool(_) => "bool",
            Encoded::Int(_) => "int",
            Encoded::Float(_) => "float",
            Encoded::Text(_) => "string",
            Encoded::DateTime(_) => "datetime",
            Encoded::List(_) => "list",
            Encoded::Map(_) => "map",
            Encoded::Model(_) => "model",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value::RawMap;

    fn reading_properties() -> Arc<PropertyCollection> {
        registry::register(
            PropertyCollection::new(
                "CodecTestReading",
                vec![
                    PropertyInfo::new("value", PropertyKind::Float, 0.0),
                    PropertyInfo::new("takenAt", PropertyKind::DateTime, Value::Null),
                    PropertyInfo::new("extra", PropertyKind::Any, Value::Null),
                ],
            )
            .unwrap(),
        )
        .unwrap()
    }

    fn reading() -> Model {
        let mut raw = RawMap::new();
        raw.insert("value".to_string(), Value::Float(0.1 + 0.2));
        raw.insert(
            "takenAt".to_string(),
            "2021-06-01T12:00:00.123456789+05:30".into(),
        );
        raw.insert(
            "extra".to_string(),
            Value::List(vec![Value::Int(1), Value::Map(RawMap::new())]),
        );
        Model::from_raw(reading_properties(), raw).unwrap()
    }

    #[test]
    fn test_round_trip_keeps_exact_values() {
        let original = reading();
        let restored = decode(&encode(&original).unwrap()).unwrap();

        assert_eq!(restored, original);
        assert_eq!(restored["value"], Value::Float(0.1 + 0.2));
        let taken_at = restored["takenAt"].as_datetime().unwrap();
        assert_eq!(taken_at.offset().local_minus_utc(), 5 * 3600 + 30 * 60);
        assert_eq!(taken_at.timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn test_rejects_garbage_and_foreign_format() {
        assert!(matches!(
            decode(b"not a blob").unwrap_err(),
            ModelError::Deserialization { .. }
        ));

        let foreign = serde_json::json!({
            "format": "other",
            "version": 1,
            "model": {"type": "CodecTestReading", "values": []}
        });
        let err = decode(&serde_json::to_vec(&foreign).unwrap()).unwrap_err();
        assert!(matches!(err, ModelError::Deserialization { .. }));
    }

    #[test]
    fn test_rejects_other_version() {
        let mut blob: serde_json::Value = serde_json::from_slice(&encode(&reading()).unwrap()).unwrap();
        blob["version"] = serde_json::json!(VERSION + 1);

        let err = decode(&serde_json::to_vec(&blob).unwrap()).unwrap_err();
        assert!(err.to_string().contains("Unsupported blob version"));
    }

    #[test]
    fn test_rejects_missing_and_mistyped_properties() {
        let mut blob: serde_json::Value = serde_json::from_slice(&encode(&reading()).unwrap()).unwrap();
        let values = blob["model"]["values"].as_array_mut().unwrap();
        values.retain(|pair| pair[0] != "extra");
        let err = decode(&serde_json::to_vec(&blob).unwrap()).unwrap_err();
        assert!(err.to_string().contains("missing"));

        let mut blob: serde_json::Value = serde_json::from_slice(&encode(&reading()).unwrap()).unwrap();
        blob["model"]["values"][0][1] = serde_json::json!({"t": "text", "v": "0.3"});
        let err = decode(&serde_json::to_vec(&blob).unwrap()).unwrap_err();
        assert!(matches!(err, ModelError::Deserialization { .. }));
    }

    #[test]
    fn test_decode_as_checks_type_name() {
        let other = Arc::new(
            PropertyCollection::new("CodecTestOther", vec![]).unwrap(),
        );
        let err = decode_as(&other, &encode(&reading()).unwrap()).unwrap_err();
        assert!(matches!(err, ModelError::Deserialization { .. }));
    }
}
