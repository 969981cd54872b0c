//! MongoDB implementations of all models.

pub mod activity_log;
pub mod company;
pub mod conn;
pub mod contact;
pub mod document_rules;
pub mod dropdown;
pub mod expense;
pub mod record;
pub mod user;

use bson::{Bson, DateTime, Document, Regex, oid::ObjectId};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde_json::{Map, Number, Value};

use invoice_corelib::strings;

/// To parse the hexadecimal identifier. Invalid identifiers get `None`.
fn parse_id(value: &str) -> Option<ObjectId> {
    ObjectId::parse_str(value).ok()
}

/// To store a calendar date as the midnight of UTC.
fn date_to_bson(date: &NaiveDate) -> DateTime {
    DateTime::from_chrono(date.and_time(NaiveTime::MIN).and_utc())
}

fn bson_to_date(value: &DateTime) -> NaiveDate {
    value.to_chrono().date_naive()
}

/// The case-insensitive sub-string pattern of the user input.
fn contains_regex(value: &str) -> Regex {
    Regex {
        pattern: regex::escape(value),
        options: "i".to_string(),
    }
}

/// Transforms a JSON value to the BSON value. Integers that fit in `i64` stay integers.
fn json_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(v) => Bson::Boolean(*v),
        Value::Number(v) => match v.as_i64() {
            Some(v) => Bson::Int64(v),
            None => Bson::Double(v.as_f64().unwrap_or_default()),
        },
        Value::String(v) => Bson::String(v.clone()),
        Value::Array(v) => Bson::Array(v.iter().map(json_to_bson).collect()),
        Value::Object(v) => Bson::Document(json_to_doc(v, &[])),
    }
}

/// Transforms a JSON object to the BSON document without the skipped keys.
fn json_to_doc(map: &Map<String, Value>, skip_keys: &[&str]) -> Document {
    let mut document = Document::new();
    for (k, v) in map.iter() {
        if skip_keys.contains(&k.as_str()) {
            continue;
        }
        document.insert(k.as_str(), json_to_bson(v));
    }
    document
}

/// Transforms a BSON value to the JSON value. Object identifiers become hexadecimal strings and
/// date times become RFC 3339 strings.
fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(v) => Value::Bool(v),
        Bson::Int32(v) => Value::Number(v.into()),
        Bson::Int64(v) => Value::Number(v.into()),
        Bson::Double(v) => match Number::from_f64(v) {
            None => Value::Null,
            Some(v) => Value::Number(v),
        },
        Bson::String(v) => Value::String(v),
        Bson::ObjectId(v) => Value::String(v.to_hex()),
        Bson::DateTime(v) => Value::String(strings::time_str(&v.to_chrono())),
        Bson::Array(v) => Value::Array(v.into_iter().map(bson_to_json).collect()),
        Bson::Document(v) => Value::Object(doc_to_json(v, &[])),
        v => v.into_relaxed_extjson(),
    }
}

/// Transforms a BSON document to the JSON object without the skipped keys.
fn doc_to_json(document: Document, skip_keys: &[&str]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in document.into_iter() {
        if skip_keys.contains(&k.as_str()) {
            continue;
        }
        map.insert(k, bson_to_json(v));
    }
    map
}

/// To get a date time metadata field. A missing or invalid field gets the current time.
fn get_datetime(document: &Document, key: &str) -> chrono::DateTime<Utc> {
    match document.get_datetime(key) {
        Err(_) => Utc::now(),
        Ok(v) => v.to_chrono(),
    }
}

/// To get an optional string metadata field.
fn get_opt_str(document: &Document, key: &str) -> Option<String> {
    match document.get_str(key) {
        Err(_) => None,
        Ok(v) => Some(v.to_string()),
    }
}
