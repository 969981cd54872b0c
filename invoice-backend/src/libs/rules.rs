//! Company information validation with the global business rules.
//!
//! Each business rule describes PAN, GSTIN and TAN requirements of one organization type in plain
//! text. A rule text containing `required` makes the number mandatory. PAN rules may also state a
//! length (`10-character`) or pin one character (`4th character must be 'C'`).

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::{Map, Value};

use invoice_corelib::strings;

use crate::models::document_rules::DocumentRules;

/// A validation error of one field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    /// The rule text that the field violates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

const PAN_PATTERN: &'static str = "^[A-Z]{5}[0-9]{4}[A-Z]$";
const GSTIN_PATTERN: &'static str = "^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$";
const TAN_PATTERN: &'static str = "^[A-Z]{4}[0-9]{5}[A-Z]$";
const PAN_LEN: usize = 10;

/// To validate the company information. An empty list means valid.
///
/// Validation stops at `organizationType` when it is missing.
pub fn validate(data: &Map<String, Value>, rules: &DocumentRules) -> Vec<FieldError> {
    let mut errors = vec![];

    let org_type = match text(data, "organizationType") {
        None => {
            errors.push(field_error(
                "organizationType",
                "Organization Type is a required field.",
                None,
            ));
            return errors;
        }
        Some(org_type) => org_type,
    };

    if let Some(rule) = rules.business_rules.iter().find(|r| r.name == org_type) {
        let pan_rule = rule.pan_rules.as_str();
        match text(data, "panNumber") {
            None => {
                if is_required(pan_rule) {
                    errors.push(field_error(
                        "panNumber",
                        "PAN Number is required.",
                        Some(pan_rule),
                    ));
                }
            }
            Some(pan) => {
                if !is_match(pan_pattern(pan_rule).as_str(), pan) {
                    errors.push(field_error(
                        "panNumber",
                        "Invalid PAN format.",
                        Some(pan_rule),
                    ));
                }
            }
        }

        if is_true(data.get("gstRegistered")) {
            let gst_rule = rule.gstin_rules.as_str();
            match text(data, "gstNumber") {
                None => {
                    if is_required(gst_rule) {
                        errors.push(field_error(
                            "gstNumber",
                            "GST Number is required.",
                            Some(gst_rule),
                        ));
                    }
                }
                Some(gst) => {
                    if !is_match(GSTIN_PATTERN, gst) {
                        errors.push(field_error(
                            "gstNumber",
                            "Invalid GSTIN format.",
                            Some(gst_rule),
                        ));
                    }
                }
            }
        }

        if is_true(data.get("tdsTcsEnabled")) {
            let tan_rule = rule.tan_rules.as_str();
            match text(data, "tanNumber") {
                None => {
                    if is_required(tan_rule) {
                        errors.push(field_error(
                            "tanNumber",
                            "TAN Number is required.",
                            Some(tan_rule),
                        ));
                    }
                }
                Some(tan) => {
                    if !is_match(TAN_PATTERN, tan) {
                        errors.push(field_error(
                            "tanNumber",
                            "Invalid TAN format.",
                            Some(tan_rule),
                        ));
                    }
                }
            }
        }
    }

    if text(data, "mobileNumber").is_none() {
        errors.push(field_error(
            "mobileNumber",
            "Mobile Number is required.",
            None,
        ));
    }
    match text(data, "email") {
        None => errors.push(field_error("email", "E-mail is required.", None)),
        Some(email) => {
            if !strings::is_email(email) {
                errors.push(field_error(
                    "email",
                    "A valid E-mail format is required.",
                    None,
                ));
            }
        }
    }

    errors
}

/// To build the PAN pattern from the rule text.
///
/// A pinned character takes precedence over the length rule and keeps the default PAN shape.
pub fn pan_pattern(rule: &str) -> String {
    let char_regex = RegexBuilder::new(r"(\d+)(?:st|nd|rd|th) character must be '([A-Z])'")
        .case_insensitive(true)
        .build();
    if let Ok(regex) = char_regex {
        if let Some(caps) = regex.captures(rule) {
            let pos = caps[1].parse::<usize>().unwrap_or(0);
            if pos >= 1 && pos <= PAN_LEN {
                let mut parts: Vec<String> = (0..PAN_LEN)
                    .map(|i| match i {
                        0..=4 | 9 => "[A-Z]".to_string(),
                        _ => "[0-9]".to_string(),
                    })
                    .collect();
                parts[pos - 1] = caps[2].to_string();
                return format!("^{}$", parts.concat());
            }
        }
    }
    if let Ok(regex) = Regex::new(r"(\d+)-character") {
        if let Some(caps) = regex.captures(rule) {
            return format!("^.{{{}}}$", &caps[1]);
        }
    }
    PAN_PATTERN.to_string()
}

fn is_required(rule: &str) -> bool {
    rule.to_lowercase().contains("required")
}

fn is_match(pattern: &str, value: &str) -> bool {
    match Regex::new(pattern) {
        Err(_) => false,
        Ok(regex) => regex.is_match(value),
    }
}

/// Returns the non-empty string value of the field.
fn text<'a>(data: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    match data.get(key) {
        Some(Value::String(v)) if v.len() > 0 => Some(v.as_str()),
        _ => None,
    }
}

fn is_true(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(v)) => *v,
        Some(Value::String(v)) => {
            let v = v.to_lowercase();
            v == "true" || v == "on" || v == "1"
        }
        Some(Value::Number(v)) => v.as_f64().unwrap_or(0.0) != 0.0,
        _ => false,
    }
}

fn field_error(field: &str, message: &str, rule: Option<&str>) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.to_string(),
        rule: rule.map(|v| v.to_string()),
    }
}
