pub mod context;
pub mod core_extension;
pub mod date_extension;
pub mod example_extension;
pub mod extension;
pub mod json_extension;
pub mod registry;
