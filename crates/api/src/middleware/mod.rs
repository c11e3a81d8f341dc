pub mod actor;
pub mod error_handling;
