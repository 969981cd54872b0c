use serde::Serialize;
use serde_json::{Map, Value};

use crate::libs::rules::FieldError;

#[derive(Serialize)]
pub struct ValidationErrors {
    pub message: String,
    pub errors: Vec<FieldError>,
}

#[derive(Serialize)]
pub struct SaveCompany {
    pub message: String,
    pub data: Map<String, Value>,
}
