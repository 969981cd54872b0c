//! Coercion of loosely-typed form values.
//!
//! Browsers send multipart forms with string values only, and JSON clients are not always strict
//! either. These functions convert such values to the stored types.

use chrono::NaiveDate;
use serde_json::{Map, Number, Value};

/// `true` only for boolean `true` or the string `true` (case-insensitive).
pub fn strict_bool(value: &Value) -> bool {
    match value {
        Value::Bool(v) => *v,
        Value::String(v) => v.to_lowercase() == "true",
        _ => false,
    }
}

/// `true` for boolean `true`, non-zero numbers, or `true`/`on`/`1` strings (case-insensitive).
pub fn loose_bool(value: &Value) -> bool {
    match value {
        Value::Bool(v) => *v,
        Value::Number(v) => v.as_f64().unwrap_or(0.0) != 0.0,
        Value::String(v) => {
            let v = v.to_lowercase();
            v == "true" || v == "on" || v == "1"
        }
        _ => false,
    }
}

/// To parse a number. Strings may contain `$` and `,`. Empty strings and invalid values get
/// `None`.
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(v) => v.as_f64(),
        Value::String(v) => {
            let v: String = v.chars().filter(|c| *c != '$' && *c != ',').collect();
            let v = v.trim();
            match v.len() {
                0 => None,
                _ => v.parse::<f64>().ok().filter(|v| v.is_finite()),
            }
        }
        _ => None,
    }
}

/// To parse a number and convert it to the JSON value (`null` for invalid values).
pub fn number_value(value: &Value) -> Value {
    match number(value).and_then(Number::from_f64) {
        None => Value::Null,
        Some(v) => Value::Number(v),
    }
}

/// To parse a `YYYY-MM-DD` or `DD/MM/YYYY` date.
pub fn date(value: &Value) -> Option<NaiveDate> {
    let v = match value {
        Value::String(v) => v.trim(),
        _ => return None,
    };
    match NaiveDate::parse_from_str(v, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => NaiveDate::parse_from_str(v, "%d/%m/%Y").ok(),
    }
}

/// To parse a `YYYY-MM-DD` date only.
pub fn iso_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(v) => NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// To get an object from the object itself or its JSON string. Other values get an empty object.
pub fn object(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(v) => v.clone(),
        Value::String(v) => match serde_json::from_str::<Value>(v.as_str()) {
            Ok(Value::Object(v)) => v,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

/// To get an array from the array itself or its JSON string.
pub fn array(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(v) => Some(v.clone()),
        Value::String(v) => match serde_json::from_str::<Value>(v.as_str()) {
            Ok(Value::Array(v)) => Some(v),
            _ => None,
        },
        _ => None,
    }
}

/// To get the string value. Numbers are converted and empty strings get `None`.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(v) if v.len() > 0 => Some(v.clone()),
        Value::Number(v) => Some(v.to_string()),
        _ => None,
    }
}

/// To get the value of a dotted path such as `financialDetails.paymentTerms`.
pub fn get_path<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut keys = path.split('.');
    let mut value = map.get(keys.next()?)?;
    for key in keys {
        value = value.as_object()?.get(key)?;
    }
    Some(value)
}

/// Python-like truthiness: `null`, `false`, `0`, empty strings, arrays and objects are falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(v)) => *v,
        Some(Value::Number(v)) => v.as_f64().unwrap_or(0.0) != 0.0,
        Some(Value::String(v)) => v.len() > 0,
        Some(Value::Array(v)) => v.len() > 0,
        Some(Value::Object(v)) => v.len() > 0,
    }
}
