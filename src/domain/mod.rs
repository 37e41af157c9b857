pub mod dsl;
pub mod system;
pub mod time;
