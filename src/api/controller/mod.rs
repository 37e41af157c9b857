pub mod dsl;
pub mod system;
