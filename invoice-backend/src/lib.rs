//! The invoicing and accounting backend.
//!
//! This crate provides:
//!
//! - User registration and bearer token (JWT) authentication.
//! - Tenant-scoped business records: customers, vendors, staff and chart of accounts.
//! - Expenses with tax totals and supplier/expense head lookups.
//! - Company information validated against the global document rules, and company contacts.
//! - Global dropdown values.
//! - Invoice extraction through Google Document AI.
//!
//! # Mount the backend in your axum App
//!
//! ```ignore
//! use axum::Router;
//! use invoice_backend::{libs, routes};
//!
//! let conf = libs::config::read_args(&args);
//! let state = routes::new_state(&conf).await?;
//! let app = Router::new().merge(routes::new_service(&state));
//! ```
//!
//! Please see `bin/invoice-backend.rs` to get the real world example.

pub mod libs;
pub mod models;
pub mod routes;
