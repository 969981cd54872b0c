pub mod coerce;
pub mod config;
pub mod documentai;
pub mod expense;
pub mod form;
pub mod jwt;
pub mod records;
pub mod rules;
