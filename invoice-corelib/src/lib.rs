//! Common libraries of the invoice backend services.

pub mod constants;
pub mod err;
pub mod http;
pub mod logger;
pub mod role;
pub mod server_config;
pub mod strings;
pub mod version;
