//! Common constants of the invoice backend services.

pub struct ContentType;
pub struct DbEngine;

impl ContentType {
    pub const JSON: &'static str = "application/json";
    pub const MULTIPART: &'static str = "multipart/form-data";
}

impl DbEngine {
    pub const MONGODB: &'static str = "mongodb";
}
