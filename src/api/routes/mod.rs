//! API route declarations (e.g., /api/v1/*)

pub mod dsl_routes;
pub mod system_routes;
