//! Query-lifecycle pipeline: extraction, validation, routing, execution and prompts.

pub mod apm_schema;
pub mod body_resolver;
pub mod dsl_validator;
pub mod dto;
pub mod payload_extractor;
pub mod prompt_composer;
pub mod query_classifier;
pub mod query_executor;
pub mod service;
