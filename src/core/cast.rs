//! Coercion of raw values into the kind a property declares.

use crate::core::model::Model;
use crate::domain::property::{ModelRef, PropertyInfo, PropertyKind};
use crate::domain::value::Value;
use crate::utils::error::{ModelError, Result};
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;

/// Fallback layout for offsets written without a colon, e.g. `+0000`.
const COMPACT_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Casts `raw` to the kind declared by `info`.
///
/// An absent or null value yields the property's default. Any value that has
/// no sensible reading as the declared kind fails with
/// [`ModelError::InvalidCast`].
pub fn cast(raw: Option<Value>, info: &PropertyInfo) -> Result<Value> {
    let raw = match raw {
        None | Some(Value::Null) => return Ok(info.default_value().clone()),
        Some(raw) => raw,
    };

    tracing::trace!(
        "Casting {} to {} for '{}'",
        raw.type_label(),
        info.kind(),
        info.name()
    );

    match info.kind() {
        PropertyKind::Int => to_int(raw, info).map(Value::Int),
        PropertyKind::Float => to_float(raw, info).map(Value::Float),
        PropertyKind::Bool => to_bool(raw, info).map(Value::Bool),
        PropertyKind::Text => to_text(raw, info).map(Value::Text),
        PropertyKind::DateTime => to_datetime(raw, info).map(Value::DateTime),
        PropertyKind::Model(model_ref) => to_model(raw, model_ref, info).map(Value::from),
        PropertyKind::Models(model_ref) => match raw {
            Value::List(items) => items
                .into_iter()
                .map(|item| to_model(item, model_ref, info).map(Value::from))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            other => Err(invalid(info, &other)),
        },
        PropertyKind::Any => Ok(raw),
    }
}

fn invalid(info: &PropertyInfo, raw: &Value) -> ModelError {
    tracing::warn!(
        "Rejected {} value for '{}' declared as {}",
        raw.type_label(),
        info.name(),
        info.kind()
    );
    ModelError::invalid_cast(info.name(), info.kind(), raw.to_string())
}

fn truncate(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    // i64::MAX is not representable as f64; the bound is exclusive
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Some(truncated as i64)
    } else {
        None
    }
}

fn to_int(raw: Value, info: &PropertyInfo) -> Result<i64> {
    let parsed = match &raw {
        Value::Int(i) => Some(*i),
        Value::Float(f) => truncate(*f),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate))
        }
        _ => None,
    };
    parsed.ok_or_else(|| invalid(info, &raw))
}

fn to_float(raw: Value, info: &PropertyInfo) -> Result<f64> {
    let parsed = match &raw {
        Value::Float(f) => Some(*f),
        Value::Int(i) => Some(*i as f64),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    // NaN and infinities have no JSON form
    parsed
        .filter(|f| f.is_finite())
        .ok_or_else(|| invalid(info, &raw))
}

fn to_bool(raw: Value, info: &PropertyInfo) -> Result<bool> {
    let parsed = match &raw {
        Value::Bool(b) => Some(*b),
        Value::Int(i) => Some(*i != 0),
        Value::Float(f) => Some(*f != 0.0),
        Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed.ok_or_else(|| invalid(info, &raw))
}

fn to_text(raw: Value, info: &PropertyInfo) -> Result<String> {
    match raw {
        Value::Text(s) => Ok(s),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::DateTime(dt) => Ok(Value::format_datetime(&dt)),
        other => Err(invalid(info, &other)),
    }
}

/// Parses an ISO-8601 timestamp with optional fractional seconds and an
/// explicit offset.
pub fn parse_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, COMPACT_OFFSET_FORMAT))
        .ok()
}

fn to_datetime(raw: Value, info: &PropertyInfo) -> Result<DateTime<FixedOffset>> {
    match raw {
        Value::DateTime(dt) => Ok(dt),
        Value::Text(ref s) => parse_datetime(s).ok_or_else(|| invalid(info, &raw)),
        other => Err(invalid(info, &other)),
    }
}

fn to_model(raw: Value, model_ref: &ModelRef, info: &PropertyInfo) -> Result<Model> {
    match raw {
        Value::Map(map) => Model::from_raw(model_ref.resolve()?, map),
        Value::Model(model) => {
            let expected = model_ref.resolve()?;
            let same = Arc::ptr_eq(model.properties(), &expected)
                || **model.properties() == *expected;
            if same {
                Ok(*model)
            } else {
                Err(invalid(info, &Value::Model(model)))
            }
        }
        other => Err(invalid(info, &other)),
    }
}
