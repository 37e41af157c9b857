pub mod dsl_service;
